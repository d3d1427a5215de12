//! Tracing subscriber setup for hosts that embed the cache

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install a global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. Fails if a global subscriber is
/// already set.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.pretty().try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}
