use std::path::PathBuf;

use clap::Parser;

/// Flags the Stream Deck application passes with a single dash.
const HOST_FLAGS: [&str; 4] = ["-port", "-pluginUUID", "-registerEvent", "-info"];

/// Timebook Deck: start and stop Timebook tracking from Stream Deck keys
#[derive(Parser, Debug, Clone)]
#[command(name = "timebook-deck")]
#[command(author = "progwise")]
#[command(version)]
#[command(about = "Stream Deck plugin for Timebook time tracking", long_about = None)]
pub struct Cli {
    /// Port of the Stream Deck WebSocket server
    #[arg(long = "port")]
    pub port: u16,

    /// Unique identifier the host assigned to this plugin instance
    #[arg(long = "pluginUUID")]
    pub plugin_uuid: String,

    /// Event name used to register with the host
    #[arg(long = "registerEvent")]
    pub register_event: String,

    /// Host and device information (JSON)
    #[arg(long = "info")]
    pub info: Option<String>,

    /// Path to the plugin config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Timebook GraphQL endpoint. Overrides the config file.
    #[arg(long, env = "TIMEBOOK_API_URL")]
    pub api_url: Option<String>,

    /// Timebook API key. Global settings from the host take precedence once received.
    #[arg(long, env = "TIMEBOOK_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse_from(normalize_host_args(std::env::args()))
    }
}

/// Rewrites `-port 28196` style host arguments to the `--port` form clap expects.
pub fn normalize_host_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            if HOST_FLAGS.contains(&arg.as_str()) {
                format!("-{arg}")
            } else {
                arg
            }
        })
        .collect()
}
