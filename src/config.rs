//! Configuration loading
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Config file: `CONTINUABLE_CONFIG_PATH`, or `continuable.toml` in the
//!    working directory if it exists
//! 3. Environment variables: `CONTINUABLE_LOG_LEVEL`,
//!    `CONTINUABLE_ENGINE__COLLECT_THRESHOLD`
//!
//! A `.env` file is loaded into the environment first.

use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::engine::Settings;

const DEFAULT_CONFIG_FILE: &str = "continuable.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default tracing filter when `RUST_LOG` is not set
    pub log_level: String,

    /// Engine settings handed to every new driver
    pub engine: Settings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            engine: Settings::default(),
        }
    }
}

impl Config {
    /// Load configuration. `path` replaces the default config file lookup.
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var("CONTINUABLE_CONFIG_PATH").ok());

        let file = match &path {
            Some(path) => File::with_name(path).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("CONTINUABLE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| match &path {
                Some(path) => format!("Failed to read config file {}", path),
                None => "Failed to read configuration".to_string(),
            })?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }
}
