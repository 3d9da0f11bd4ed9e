//! Single-writer persistence queue.
//!
//! Every cart mutation enqueues a serialized snapshot while the cart state is
//! still locked, so the queue holds snapshots in mutation order. One writer
//! task drains the queue and applies them to storage one at a time. Storage
//! therefore always ends up holding the snapshot of the latest mutation, even
//! when callers overlap.
//!
//! The writer also records each outcome as it happens, so the last failure
//! seen by storage is only cleared by a later write, never by a caller that
//! finished waiting late.

use std::sync::{Arc, Mutex, PoisonError};

use go_marketplace_core::CartItem;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::storage::{KeyValueStore, StorageError};

struct WriteRequest {
    payload: String,
    done: oneshot::Sender<Result<(), StorageError>>,
}

/// Most recent write failure, in storage order.
type LastError = Arc<Mutex<Option<String>>>;

/// Handle to the writer task. The task exits when the last handle is dropped.
pub(crate) struct PersistQueue {
    tx: mpsc::UnboundedSender<WriteRequest>,
    last_error: LastError,
}

impl PersistQueue {
    /// Spawn the writer task for `key`.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn spawn(storage: Arc<dyn KeyValueStore>, key: String) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<WriteRequest>();
        let last_error = LastError::default();
        let outcomes = Arc::clone(&last_error);

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let bytes = request.payload.len();
                let result = storage.set(&key, request.payload).await;
                match &result {
                    Ok(()) => debug!(key = %key, bytes, "Persisted cart snapshot"),
                    Err(e) => error!(error = %e, key = %key, "Failed to persist cart"),
                }
                record(&outcomes, result.as_ref().err().map(ToString::to_string));
                // The caller may have stopped waiting; the write still counts.
                let _ = request.done.send(result);
            }
            debug!(key = %key, "Cart persistence queue closed");
        });

        Self { tx, last_error }
    }

    /// Message of the most recent failed write, cleared by the next success.
    pub(crate) fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Serialize `items` and queue them for writing.
    pub(crate) fn enqueue(&self, items: &[CartItem]) -> PendingWrite {
        let (done, rx) = oneshot::channel();

        match serde_json::to_string(items) {
            Ok(payload) => {
                if self.tx.send(WriteRequest { payload, done }).is_err() {
                    warn!("Cart persistence queue is closed, dropping snapshot");
                }
            }
            Err(e) => {
                let err = StorageError::from(e);
                record(&self.last_error, Some(err.to_string()));
                let _ = done.send(Err(err));
            }
        }

        PendingWrite(rx)
    }
}

fn record(last_error: &LastError, failure: Option<String>) {
    *last_error.lock().unwrap_or_else(PoisonError::into_inner) = failure;
}

/// A queued write whose outcome can be awaited.
pub(crate) struct PendingWrite(oneshot::Receiver<Result<(), StorageError>>);

impl PendingWrite {
    /// Wait for the writer task to apply this snapshot.
    pub(crate) async fn wait(self) -> Result<(), StorageError> {
        self.0.await.unwrap_or(Err(StorageError::Closed))
    }
}
