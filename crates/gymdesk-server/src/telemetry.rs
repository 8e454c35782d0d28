//! Logging setup.

use gymdesk_config::ObservabilityConfig;
use gymdesk_core::{GymdeskError, GymdeskResult};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the log filter: `RUST_LOG` wins, otherwise the configured level
/// applies to every target.
pub fn log_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_level.to_lowercase()))
}

/// Installs the global tracing subscriber, as JSON lines or human-readable
/// output depending on `log_format`.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig) -> GymdeskResult<()> {
    let filter = log_filter(config);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    result.map_err(|e| GymdeskError::Internal(format!("Failed to initialize logging: {e}")))
}
