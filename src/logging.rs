use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::PluginConfig;
use crate::error::{DeckError, Result};

const LOG_FILE_PREFIX: &str = "timebook-deck.log";
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Initialize file logging.
///
/// The host discards stdout, so everything goes to a daily-rolling file in
/// the configured log directory. `RUST_LOG` wins over the configured level.
/// Keep the returned guard alive until exit or buffered lines are lost.
pub fn init_logging(config: &PluginConfig) -> Result<WorkerGuard> {
    let dir = config.log_dir();
    std::fs::create_dir_all(&dir)?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(&config.logging.level)));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init()
        .map_err(|e| DeckError::Config(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Logging to {}", dir.display());
    Ok(guard)
}

/// Filter directive for this crate; unknown levels fall back to info.
fn directive(level: &str) -> String {
    let level = level.trim().to_ascii_lowercase();
    let level = if LEVELS.contains(&level.as_str()) {
        level
    } else {
        "info".to_string()
    };
    format!("timebook_deck={}", level)
}
