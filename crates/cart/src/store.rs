//! The cart store.
//!
//! [`CartStore`] owns the ordered list of cart lines. Each mutation updates the
//! list, publishes the new snapshot to subscribers, and waits for the snapshot
//! to be written to storage under a single key. On open, the saved list is
//! read back from that key.
//!
//! # Line lifecycle
//!
//! ```text
//! absent ──add──▶ present(1) ──increment/add──▶ present(q+1)
//!                 present(q) ──decrement, q>1──▶ present(q-1)
//!                 present(1) ──decrement──────▶ absent
//! ```
//!
//! # Persistence failures
//!
//! A failed write does not fail the mutation. The in-memory cart stays
//! authoritative for the session and the saved copy may lag behind it until
//! the next successful write. The failure is logged and available from
//! [`CartStore::last_persist_error`].

use std::collections::HashSet;
use std::sync::Arc;

use go_marketplace_core::{CartItem, NewCartItem, ProductId};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::error::{CartError, Result};
use crate::persist::{PendingWrite, PersistQueue};
use crate::storage::KeyValueStore;

/// Storage key the cart is saved under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketPlace:cart";

/// Cart store options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartOptions {
    /// Key the serialized cart is stored under.
    pub storage_key: String,
    /// Write the cart even when `increment`/`decrement` did not find the
    /// product and nothing changed.
    pub persist_unchanged: bool,
}

impl Default for CartOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            persist_unchanged: true,
        }
    }
}

/// What [`CartStore::load`] found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hydration {
    /// A saved cart was restored.
    Restored {
        /// Number of lines restored.
        items: usize,
    },
    /// Nothing was saved under the key.
    Empty,
    /// Storage could not be read.
    Unreadable,
    /// The saved value was not a valid cart and was ignored.
    Corrupt,
}

/// Reasons a saved cart is rejected.
#[derive(Debug, Error)]
enum SavedCartError {
    #[error("invalid cart JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
}

/// Shopping cart state with a persisted mirror.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: watch::Sender<Vec<CartItem>>,
    storage: Arc<dyn KeyValueStore>,
    queue: PersistQueue,
    options: CartOptions,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("items", &*self.inner.state.borrow())
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart and restore any saved contents.
    ///
    /// Starts the persistence writer and runs [`load`](Self::load) before
    /// returning, so no mutation can race the initial hydration. A missing,
    /// unreadable, or invalid saved cart leaves the cart empty.
    pub async fn open(storage: Arc<dyn KeyValueStore>, options: CartOptions) -> Self {
        let queue = PersistQueue::spawn(Arc::clone(&storage), options.storage_key.clone());
        let (state, _) = watch::channel(Vec::new());

        let store = Self {
            inner: Arc::new(CartStoreInner {
                state,
                storage,
                queue,
                options,
            }),
        };
        store.load().await;
        store
    }

    /// Replace the cart with the saved copy from storage.
    ///
    /// Called once by [`open`](Self::open). If nothing usable is saved the
    /// current contents are kept. Saved carts with duplicate product IDs or a
    /// zero quantity are treated as invalid.
    #[instrument(skip(self), fields(key = %self.inner.options.storage_key))]
    pub async fn load(&self) -> Hydration {
        let raw = match self.inner.storage.get(&self.inner.options.storage_key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No saved cart");
                return Hydration::Empty;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read saved cart, starting empty");
                return Hydration::Unreadable;
            }
        };

        let items = match parse_saved_cart(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Ignoring invalid saved cart");
                return Hydration::Corrupt;
            }
        };

        let count = items.len();
        self.inner.state.send_replace(items);
        info!(items = count, "Restored saved cart");
        Hydration::Restored { items: count }
    }

    /// Add a product to the cart.
    ///
    /// If the product is already in the cart this is an
    /// [`increment`](Self::increment) and the descriptor's other fields are
    /// ignored. Otherwise a new line with quantity 1 is appended.
    #[instrument(skip(self, item), fields(id = %item.id))]
    pub async fn add_to_cart(&self, item: NewCartItem) {
        let pending = self.mutate(|items| {
            if let Some(existing) = items.iter_mut().find(|line| line.id == item.id) {
                existing.quantity = existing.quantity.increment();
                debug!(quantity = %existing.quantity, "Product already in cart, incremented");
            } else {
                debug!("Added product to cart");
                items.push(item.into());
            }
            true
        });
        self.settle(pending).await;
    }

    /// Add one unit of a product already in the cart.
    ///
    /// Unknown IDs leave the cart unchanged.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn increment(&self, id: &ProductId) {
        let pending = self.mutate(|items| {
            let Some(line) = items.iter_mut().find(|line| &line.id == id) else {
                debug!("Product not in cart");
                return false;
            };
            line.quantity = line.quantity.increment();
            debug!(quantity = %line.quantity, "Incremented");
            true
        });
        self.settle(pending).await;
    }

    /// Remove one unit of a product; the line is dropped when it reaches zero.
    ///
    /// Unknown IDs leave the cart unchanged.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn decrement(&self, id: &ProductId) {
        let pending = self.mutate(|items| {
            let Some(index) = items.iter().position(|line| &line.id == id) else {
                debug!("Product not in cart");
                return false;
            };
            let Some(line) = items.get_mut(index) else {
                return false;
            };
            match line.quantity.decrement() {
                Some(quantity) => {
                    line.quantity = quantity;
                    debug!(%quantity, "Decremented");
                }
                None => {
                    items.remove(index);
                    debug!("Removed from cart");
                }
            }
            true
        });
        self.settle(pending).await;
    }

    /// Write the current cart to storage and report the outcome.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the write fails.
    #[instrument(skip(self), fields(key = %self.inner.options.storage_key))]
    pub async fn persist_now(&self) -> Result<()> {
        let pending = self.inner.queue.enqueue(&self.inner.state.borrow());
        pending.wait().await.map_err(CartError::from)
    }

    /// Snapshot of the cart lines in display order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.inner.state.borrow().clone()
    }

    /// The line for `id`, if it is in the cart.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<CartItem> {
        self.inner
            .state
            .borrow()
            .iter()
            .find(|line| &line.id == id)
            .cloned()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.borrow().is_empty()
    }

    /// Total units across all lines, as shown on a cart badge.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.inner
            .state
            .borrow()
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver sees a new snapshot after every mutation that changed the
    /// cart and after a successful [`load`](Self::load).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.inner.state.subscribe()
    }

    /// Message of the most recent failed write, cleared by the next success.
    #[must_use]
    ///
    /// Outcomes are recorded in the order writes reach storage, so a failure
    /// is only cleared by a write queued after it.
    pub fn last_persist_error(&self) -> Option<String> {
        self.inner.queue.last_error()
    }

    /// Options this store was opened with.
    #[must_use]
    pub fn options(&self) -> &CartOptions {
        &self.inner.options
    }

    /// Apply `change` and queue the resulting snapshot for writing.
    ///
    /// `change` returns whether it modified the cart. Subscribers are only
    /// notified on modification. The snapshot is queued while the state is
    /// still locked so writes reach storage in mutation order.
    fn mutate<F>(&self, change: F) -> Option<PendingWrite>
    where
        F: FnOnce(&mut Vec<CartItem>) -> bool,
    {
        let persist_unchanged = self.inner.options.persist_unchanged;
        let mut pending = None;

        self.inner.state.send_if_modified(|items| {
            let changed = change(items);
            if changed || persist_unchanged {
                pending = Some(self.inner.queue.enqueue(items));
            }
            changed
        });

        pending
    }

    async fn settle(&self, pending: Option<PendingWrite>) {
        let Some(pending) = pending else {
            return;
        };

        // The writer logs and records failures; the mutation itself succeeds.
        if pending.wait().await.is_err() {
            debug!(key = %self.inner.options.storage_key, "Cart kept in memory only");
        }
    }
}

fn parse_saved_cart(raw: &str) -> std::result::Result<Vec<CartItem>, SavedCartError> {
    let items: Vec<CartItem> = serde_json::from_str(raw)?;

    let mut seen = HashSet::with_capacity(items.len());
    for line in &items {
        if !seen.insert(&line.id) {
            return Err(SavedCartError::DuplicateId(line.id.clone()));
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use go_marketplace_core::{Price, Quantity};

    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    /// Storage that can be read but rejects every write.
    struct ReadOnlyStore {
        saved: Option<String>,
    }

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> crate::storage::Result<Option<String>> {
            Ok(self.saved.clone())
        }

        async fn set(&self, _key: &str, _value: String) -> crate::storage::Result<()> {
            Err(StorageError::Backend("read-only".to_string()))
        }

        async fn remove(&self, _key: &str) -> crate::storage::Result<()> {
            Err(StorageError::Backend("read-only".to_string()))
        }
    }

    /// Memory storage that rejects the listed writes, counted from 1.
    struct FailingWrites {
        inner: MemoryStore,
        writes: AtomicUsize,
        fail: &'static [usize],
    }

    impl FailingWrites {
        fn new(fail: &'static [usize]) -> Self {
            Self {
                inner: MemoryStore::new(),
                writes: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl KeyValueStore for FailingWrites {
        async fn get(&self, key: &str) -> crate::storage::Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> crate::storage::Result<()> {
            let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.contains(&write) {
                return Err(StorageError::Backend(format!("write {write} rejected")));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> crate::storage::Result<()> {
            self.inner.remove(key).await
        }
    }

    /// Storage whose reads always fail.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> crate::storage::Result<Option<String>> {
            Err(StorageError::Backend("unavailable".to_string()))
        }

        async fn set(&self, _key: &str, _value: String) -> crate::storage::Result<()> {
            Ok(())
        }

        async fn remove(&self, _key: &str) -> crate::storage::Result<()> {
            Ok(())
        }
    }

    fn id(raw: &str) -> ProductId {
        ProductId::parse(raw).unwrap()
    }

    fn product(raw: &str) -> NewCartItem {
        NewCartItem::new(
            id(raw),
            format!("Product {raw}"),
            format!("https://cdn.example.com/{raw}.png"),
            Price::from_cents(1999),
        )
    }

    fn quantities(store: &CartStore) -> Vec<(String, u32)> {
        store
            .items()
            .into_iter()
            .map(|line| (line.id.into_inner(), line.quantity.get()))
            .collect()
    }

    async fn saved(storage: &MemoryStore) -> Option<Vec<CartItem>> {
        let raw = storage.get(DEFAULT_STORAGE_KEY).await.unwrap()?;
        Some(serde_json::from_str(&raw).unwrap())
    }

    async fn empty_store() -> (CartStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::open(storage.clone(), CartOptions::default()).await;
        (store, storage)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    #[tokio::test]
    async fn test_add_new_product_starts_at_one() {
        let (store, storage) = empty_store().await;

        store.add_to_cart(product("1")).await;

        assert_eq!(quantities(&store), vec![("1".to_string(), 1)]);
        assert_eq!(saved(&storage).await, Some(store.items()));
    }

    #[tokio::test]
    async fn test_add_existing_product_increments() {
        let (store, _) = empty_store().await;

        store.add_to_cart(product("1")).await;
        let mut renamed = product("1");
        renamed.title = "Different title".to_string();
        renamed.price = Price::from_cents(1);
        store.add_to_cart(renamed).await;

        let items = store.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity.get(), 2);
        assert_eq!(items[0].title, "Product 1");
        assert_eq!(items[0].price, Price::from_cents(1999));
    }

    #[tokio::test]
    async fn test_add_appends_in_insertion_order() {
        let (store, _) = empty_store().await;

        store.add_to_cart(product("b")).await;
        store.add_to_cart(product("a")).await;
        store.add_to_cart(product("c")).await;
        store.add_to_cart(product("a")).await;

        assert_eq!(
            quantities(&store),
            vec![
                ("b".to_string(), 1),
                ("a".to_string(), 2),
                ("c".to_string(), 1)
            ]
        );
    }

    #[tokio::test]
    async fn test_increment_keeps_position_and_neighbors() {
        let (store, storage) = empty_store().await;
        for raw in ["1", "2", "3"] {
            store.add_to_cart(product(raw)).await;
        }

        store.increment(&id("2")).await;

        assert_eq!(
            quantities(&store),
            vec![
                ("1".to_string(), 1),
                ("2".to_string(), 2),
                ("3".to_string(), 1)
            ]
        );
        assert_eq!(saved(&storage).await, Some(store.items()));
    }

    #[tokio::test]
    async fn test_decrement_above_one_keeps_line() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("1")).await;
        store.add_to_cart(product("2")).await;
        store.increment(&id("1")).await;
        store.increment(&id("1")).await;

        store.decrement(&id("1")).await;

        assert_eq!(
            quantities(&store),
            vec![("1".to_string(), 2), ("2".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_decrement_at_one_removes_line() {
        let (store, storage) = empty_store().await;
        store.add_to_cart(product("1")).await;
        store.add_to_cart(product("2")).await;
        store.add_to_cart(product("3")).await;

        store.decrement(&id("2")).await;

        assert_eq!(
            quantities(&store),
            vec![("1".to_string(), 1), ("3".to_string(), 1)]
        );
        assert!(store.get(&id("2")).is_none());
        assert_eq!(saved(&storage).await, Some(store.items()));
    }

    #[tokio::test]
    async fn test_unknown_id_leaves_cart_unchanged() {
        let (store, _) = empty_store().await;
        store.add_to_cart(product("1")).await;
        let before = store.items();

        store.increment(&id("missing")).await;
        store.decrement(&id("missing")).await;

        assert_eq!(store.items(), before);
    }

    #[tokio::test]
    async fn test_unknown_id_still_persists_by_default() {
        let storage = Arc::new(MemoryStore::new());
        let store = CartStore::open(storage.clone(), CartOptions::default()).await;
        assert_eq!(saved(&storage).await, None);

        store.increment(&id("missing")).await;

        assert_eq!(saved(&storage).await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_unknown_id_skips_write_when_disabled() {
        let storage = Arc::new(MemoryStore::new());
        let options = CartOptions {
            persist_unchanged: false,
            ..CartOptions::default()
        };
        let store = CartStore::open(storage.clone(), options).await;

        store.decrement(&id("missing")).await;

        assert_eq!(saved(&storage).await, None);
    }

    #[tokio::test]
    async fn test_quantities_never_reach_zero() {
        let (store, _) = empty_store().await;
        let ops = ["1", "2", "1", "3", "2", "1"];

        for (step, raw) in ops.iter().enumerate() {
            if step % 2 == 0 {
                store.add_to_cart(product(raw)).await;
            } else {
                store.decrement(&id(raw)).await;
            }
            store.decrement(&id("3")).await;

            let items = store.items();
            assert!(items.iter().all(|line| line.quantity.get() >= 1));
            let unique: HashSet<_> = items.iter().map(|line| &line.id).collect();
            assert_eq!(unique.len(), items.len());
        }
    }

    #[tokio::test]
    async fn test_accessors() {
        let (store, _) = empty_store().await;
        assert!(store.is_empty());
        assert_eq!(store.total_quantity(), 0);

        store.add_to_cart(product("1")).await;
        store.add_to_cart(product("1")).await;
        store.add_to_cart(product("2")).await;

        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
        assert_eq!(store.total_quantity(), 3);
        assert_eq!(
            store.get(&id("1")).map(|line| line.quantity),
            Quantity::new(2).ok()
        );
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    #[tokio::test]
    async fn test_open_restores_saved_cart() {
        let (store, storage) = empty_store().await;
        store.add_to_cart(product("1")).await;
        store.add_to_cart(product("2")).await;
        store.increment(&id("2")).await;

        let reopened = CartStore::open(storage, CartOptions::default()).await;

        assert_eq!(reopened.items(), store.items());
    }

    #[tokio::test]
    async fn test_load_reports_outcome() {
        let json = r#"[{"id":"1","title":"Chair","image_url":"https://x/1.png","price":19.99,"quantity":3}]"#;
        let storage = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, json));
        let store = CartStore::open(storage, CartOptions::default()).await;

        assert_eq!(store.load().await, Hydration::Restored { items: 1 });
        assert_eq!(quantities(&store), vec![("1".to_string(), 3)]);
    }

    #[tokio::test]
    async fn test_extreme_prices_survive_reopen() {
        let (store, storage) = empty_store().await;
        let mut precise = product("precise");
        precise.price = Price::new("0.12345678901234567891".parse().unwrap());
        let mut priciest = product("priciest");
        priciest.price = Price::new("79228162514264337593543950335".parse().unwrap());

        store.add_to_cart(product("cheap")).await;
        store.add_to_cart(precise).await;
        store.add_to_cart(priciest).await;

        let reopened = CartStore::open(storage, CartOptions::default()).await;

        assert_eq!(reopened.load().await, Hydration::Restored { items: 3 });
        assert_eq!(reopened.items(), store.items());
    }

    #[tokio::test]
    async fn test_missing_saved_cart_is_empty() {
        let (store, _) = empty_store().await;
        assert_eq!(store.load().await, Hydration::Empty);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_saved_carts_start_empty() {
        let cases = [
            "not json",
            r#"{"id":"1"}"#,
            r#"[{"id":"1","title":"A","image_url":"","price":1,"quantity":0}]"#,
            r#"[{"id":"","title":"A","image_url":"","price":1,"quantity":1}]"#,
            r#"[{"id":"1","title":"A","image_url":"","price":1,"quantity":1},
                {"id":"1","title":"B","image_url":"","price":2,"quantity":2}]"#,
        ];

        for raw in cases {
            let storage = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, raw));
            let store = CartStore::open(storage, CartOptions::default()).await;
            assert!(store.is_empty(), "expected empty cart for {raw}");
            assert_eq!(store.load().await, Hydration::Corrupt);
        }
    }

    #[tokio::test]
    async fn test_unreadable_storage_starts_empty() {
        let store = CartStore::open(Arc::new(BrokenStore), CartOptions::default()).await;
        assert!(store.is_empty());
        assert_eq!(store.load().await, Hydration::Unreadable);
    }

    #[tokio::test]
    async fn test_custom_storage_key() {
        let storage = Arc::new(MemoryStore::new());
        let options = CartOptions {
            storage_key: "@Other:cart".to_string(),
            ..CartOptions::default()
        };
        let store = CartStore::open(storage.clone(), options).await;

        store.add_to_cart(product("1")).await;

        assert!(storage.get("@Other:cart").await.unwrap().is_some());
        assert_eq!(saved(&storage).await, None);
    }

    // =========================================================================
    // Persistence failures
    // =========================================================================

    #[tokio::test]
    async fn test_write_failure_keeps_memory_state() {
        let storage = Arc::new(ReadOnlyStore { saved: None });
        let store = CartStore::open(storage, CartOptions::default()).await;

        store.add_to_cart(product("1")).await;
        store.add_to_cart(product("1")).await;

        assert_eq!(quantities(&store), vec![("1".to_string(), 2)]);
        assert_eq!(
            store.last_persist_error().as_deref(),
            Some("Storage backend error: read-only")
        );
    }

    #[tokio::test]
    async fn test_persist_now_surfaces_errors() {
        let storage = Arc::new(ReadOnlyStore { saved: None });
        let store = CartStore::open(storage, CartOptions::default()).await;

        let err = store.persist_now().await.unwrap_err();
        assert!(matches!(err, CartError::Storage(StorageError::Backend(_))));
    }

    #[tokio::test]
    async fn test_successful_write_clears_last_error() {
        let storage = Arc::new(FailingWrites::new(&[1]));
        let store = CartStore::open(storage.clone(), CartOptions::default()).await;

        store.add_to_cart(product("1")).await;
        assert_eq!(
            store.last_persist_error().as_deref(),
            Some("Storage backend error: write 1 rejected")
        );

        store.add_to_cart(product("2")).await;

        assert_eq!(store.last_persist_error(), None);
        let raw = storage.get(DEFAULT_STORAGE_KEY).await.unwrap().unwrap();
        let saved: Vec<CartItem> = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved, store.items());
    }

    #[tokio::test]
    async fn test_overlapping_mutations_keep_latest_failure() {
        let storage = Arc::new(FailingWrites::new(&[2]));
        let store = CartStore::open(storage, CartOptions::default()).await;

        // Both snapshots are queued before either write runs; the second fails.
        tokio::join!(
            store.add_to_cart(product("1")),
            store.add_to_cart(product("2"))
        );

        assert_eq!(
            store.last_persist_error().as_deref(),
            Some("Storage backend error: write 2 rejected")
        );
    }

    #[tokio::test]
    async fn test_persist_now_clears_last_error() {
        let storage = Arc::new(FailingWrites::new(&[1]));
        let store = CartStore::open(storage, CartOptions::default()).await;

        store.add_to_cart(product("1")).await;
        assert!(store.last_persist_error().is_some());

        store.persist_now().await.unwrap();
        assert_eq!(store.last_persist_error(), None);
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    #[tokio::test]
    async fn test_subscribers_see_each_change() {
        let (store, _) = empty_store().await;
        let mut rx = store.subscribe();

        store.add_to_cart(product("1")).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.increment(&id("1")).await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update()[0].quantity.get(), 2);
    }

    #[tokio::test]
    async fn test_unchanged_cart_does_not_notify() {
        let (store, _) = empty_store().await;
        let mut rx = store.subscribe();

        store.increment(&id("missing")).await;

        assert!(!rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_mutations_persist_final_state() {
        let (store, storage) = empty_store().await;

        let handles: Vec<_> = (0..20)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.add_to_cart(product(&(n % 4).to_string())).await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.total_quantity(), 20);
        assert_eq!(saved(&storage).await, Some(store.items()));
    }
}
