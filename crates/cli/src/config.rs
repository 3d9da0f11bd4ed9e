//! CLI configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `GO_MARKETPLACE_STORAGE_DIR` - Directory holding the storage file (default: `.gomarketplace`)
//! - `GO_MARKETPLACE_CART_KEY` - Storage key for the cart (default: `@GoMarketPlace:cart`)
//! - `GO_MARKETPLACE_PERSIST_UNCHANGED` - Save even when a command changed nothing (default: `true`)

use std::path::PathBuf;

use go_marketplace_cart::{CartOptions, DEFAULT_STORAGE_KEY};
use thiserror::Error;

const DEFAULT_STORAGE_DIR: &str = ".gomarketplace";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Directory for the file-backed key-value store
    pub storage_dir: PathBuf,
    /// Cart store options
    pub cart: CartOptions,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let storage_dir = PathBuf::from(get_env_or_default(
            "GO_MARKETPLACE_STORAGE_DIR",
            DEFAULT_STORAGE_DIR,
        ));
        let storage_key = get_env_or_default("GO_MARKETPLACE_CART_KEY", DEFAULT_STORAGE_KEY);
        if storage_key.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "GO_MARKETPLACE_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }
        let persist_unchanged = get_optional_env("GO_MARKETPLACE_PERSIST_UNCHANGED")
            .map(|value| parse_bool("GO_MARKETPLACE_PERSIST_UNCHANGED", &value))
            .transpose()?
            .unwrap_or(true);

        Ok(Self {
            storage_dir,
            cart: CartOptions {
                storage_key,
                persist_unchanged,
            },
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag value.
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false, got '{other}'"),
        )),
    }
}
