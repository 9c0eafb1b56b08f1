//! Application configuration
//!
//! Built-in defaults, then an optional file, then `MOTODIAG__*` environment
//! variables (e.g. `MOTODIAG__SERVER__BIND_ADDR=0.0.0.0:9000`).

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "MOTODIAG_CONFIG";
/// Config file used when `MOTODIAG_CONFIG` is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Allow cross-origin requests from the dashboard
    pub cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Root of `<brand>/<mode>_<motorcycle_id>.json` artifacts
    pub root_dir: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangesConfig {
    /// Reference range file; without one every channel reports unknown
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub default_minutes: u32,
    pub default_mode: String,
    pub min_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `diagnosis=debug,info`
    pub level: String,
    /// Emit JSON lines instead of plain text
    pub json: bool,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub models: ModelsConfig,
    pub ranges: RangesConfig,
    pub analysis: AnalysisConfig,
    pub logging: LoggingConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            cors: true,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("models"),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            default_minutes: diagnosis::DEFAULT_MINUTES,
            default_mode: diagnosis::DEFAULT_MODE.to_string(),
            min_rows: diagnosis::DEFAULT_MIN_ROWS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration; a missing file is not an error
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("MOTODIAG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Path from `MOTODIAG_CONFIG`, falling back to `config/default.toml`
    pub fn path_from_env() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}
