use anyhow::Result;
use farmdash_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    farmdash_core::init()?;

    let (config, validation) = Config::load_validated()?;
    tracing::info!(
        warnings = validation.warnings.len(),
        "Configuration loaded for {}:{}",
        config.server.host,
        config.server.port
    );

    farmdash_server::serve(config).await
}
