mod api;
mod cli;
mod config;
mod deck;
mod duration;
mod error;
mod logging;
mod plugin;
mod tracker;

use color_eyre::eyre::Result;
use cli::Cli;
use config::PluginConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Stream Deck passes -port/-pluginUUID/-registerEvent/-info
    let cli = Cli::parse_args();

    let (mut config, config_warning) = PluginConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    let _log_guard = logging::init_logging(&config)?;
    tracing::info!(
        "timebook-deck {} starting (api: {})",
        env!("CARGO_PKG_VERSION"),
        config.api.url
    );
    if let Some(warning) = config_warning {
        tracing::warn!("{}", warning);
    }

    if let Some(info) = &cli.info {
        tracing::debug!("Host info: {}", info);
    }

    plugin::serve(&cli, &config).await?;

    Ok(())
}
