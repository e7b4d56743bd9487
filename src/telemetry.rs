//! Tracing subscriber setup
use super::config::{Config, DEFAULT_LOG_LEVEL};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Installs a fmt subscriber filtered by `config.log_level`. An unparsable filter
/// falls back to `info`. Fails if a global subscriber is already set.
pub fn init(config: &Config) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
