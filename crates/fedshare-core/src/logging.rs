//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over [`LoggingConfig::level`] when set.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Builds the filter from `RUST_LOG`, falling back to the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(directives.as_deref(), config)
}

/// Parses `directives`; a missing, blank or invalid value yields `config.level`
fn filter_from(directives: Option<&str>, config: &LoggingConfig) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(&config.level))
}

/// Installs the global fmt subscriber
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true);

    if config.json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    }
}
