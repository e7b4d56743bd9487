//! Application configuration loaded from environment variables.
use super::error::StoreError;
use super::store::SledListingStore;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_DB_PATH: &str = "refood.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Reads from environment variables:
/// - `REFOOD_DB_PATH` — sled database directory (default: `"refood.db"`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
///
/// Unset or blank variables fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; unset or empty variables take the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            db_path: var("REFOOD_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            log_level: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }

    /// Opens (creating if needed) the durable listing store at `db_path`.
    pub fn open_store(&self) -> Result<SledListingStore, StoreError> {
        let db = sled::open(&self.db_path)?;
        SledListingStore::new(Arc::new(db))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
