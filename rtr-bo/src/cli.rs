//! Command-line arguments
//!
//! Command-line values (or their environment fallbacks) win over the TOML
//! file, which wins over compiled defaults.

use clap::Parser;
use rtr_common::config::TomlConfig;
use std::path::PathBuf;

/// Command-line arguments for rtr-bo
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rtr-bo")]
#[command(about = "Release-to-royalty back office service")]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "RTR_PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "RTR_DATABASE")]
    pub database: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, env = "RTR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Default log level (RUST_LOG still takes precedence)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    pub write_config: bool,
}

impl Args {
    /// Overlay command-line values onto a loaded configuration
    pub fn apply_to(&self, config: &mut TomlConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.bind_host = host.clone();
        }
        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
