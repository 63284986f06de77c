pub mod config;
pub mod error;

pub use config::{ChatConfig, Config, ServerConfig, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, ErrorBody, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging for the backend process.
///
/// Honors `RUST_LOG`; defaults to `info`.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("FarmDash core initialized");
    Ok(())
}
