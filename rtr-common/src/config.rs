//! Configuration loading
//!
//! Bootstrap configuration comes from a TOML file. Every field has a built-in
//! default, so a missing file is a warning, not a failure:
//! 1. Command-line arguments / environment (applied by the binary)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)
//!
//! The `[qc]` and `[royalty]` tables are handed to the QC Engine and the Royalty
//! Calculation Engine at construction time instead of living in constants.

use crate::money::Percentage;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Interface the HTTP server binds to
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub qc: QcConfig,

    #[serde(default)]
    pub royalty: RoyaltyConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// QC rule penalties and pass threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QcConfig {
    /// Minimum score (0-100) for a `passed` result
    pub pass_threshold: u32,
    pub missing_title_penalty: u32,
    pub no_tracks_penalty: u32,
    /// Applied once per track without an ISRC
    pub missing_isrc_penalty: u32,
    /// Applied once per track with a non-positive duration
    pub invalid_duration_penalty: u32,
    /// Applied once per track titled "explicit" without the explicit flag
    pub explicit_mismatch_penalty: u32,
}

/// Royalty calculation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoyaltyConfig {
    /// Distributor cut applied to new statements (0-100)
    pub distributor_cut_percent: f64,

    /// Artists processed concurrently during statement generation
    pub max_parallel_artists: usize,

    /// Payout method used when a request does not name one
    pub default_payout_method: String,
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("rtr").join("rtr.db"))
        .unwrap_or_else(|| PathBuf::from("./rtr_data/rtr.db"))
}

fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5810
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bind_host: default_bind_host(),
            port: default_port(),
            logging: LoggingConfig::default(),
            qc: QcConfig::default(),
            royalty: RoyaltyConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 80,
            missing_title_penalty: 25,
            no_tracks_penalty: 30,
            missing_isrc_penalty: 15,
            invalid_duration_penalty: 15,
            explicit_mismatch_penalty: 5,
        }
    }
}

impl Default for RoyaltyConfig {
    fn default() -> Self {
        Self {
            distributor_cut_percent: 20.0,
            max_parallel_artists: 4,
            default_payout_method: "bank_transfer".to_string(),
        }
    }
}

impl RoyaltyConfig {
    pub fn distributor_cut(&self) -> Percentage {
        Percentage::from_f64(self.distributor_cut_percent)
    }
}

impl TomlConfig {
    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.qc.pass_threshold > 100 {
            return Err(Error::Config(format!(
                "qc.pass_threshold must be within 0..=100, got {}",
                self.qc.pass_threshold
            )));
        }
        let penalties = [
            ("missing_title_penalty", self.qc.missing_title_penalty),
            ("no_tracks_penalty", self.qc.no_tracks_penalty),
            ("missing_isrc_penalty", self.qc.missing_isrc_penalty),
            ("invalid_duration_penalty", self.qc.invalid_duration_penalty),
            ("explicit_mismatch_penalty", self.qc.explicit_mismatch_penalty),
        ];
        for (name, value) in penalties {
            if value > 100 {
                return Err(Error::Config(format!(
                    "qc.{} must be within 0..=100, got {}",
                    name, value
                )));
            }
        }
        if !self.royalty.distributor_cut_percent.is_finite()
            || !self.royalty.distributor_cut().is_within_bounds()
        {
            return Err(Error::Config(format!(
                "royalty.distributor_cut_percent must be within 0..=100, got {}",
                self.royalty.distributor_cut_percent
            )));
        }
        if self.royalty.max_parallel_artists == 0 {
            return Err(Error::Config(
                "royalty.max_parallel_artists must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default configuration file location (`<config_dir>/rtr/rtr-bo.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rtr").join("rtr-bo.toml"))
}

/// Load configuration
///
/// An explicitly requested file must exist. When no path is given the default
/// location is tried, and its absence falls back to built-in defaults.
pub fn load_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                warn!("No config file found, using built-in defaults");
                let config = TomlConfig::default();
                config.validate()?;
                return Ok(config);
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    config.validate()?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write configuration to a TOML file, creating parent directories
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize config failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}
