//! Layered configuration
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. TOML file: explicit path, `TEXTREE_CONFIG_PATH`, or `./textree.toml`
//! 3. `TEXTREE_*` environment variables (`__` separates sections), with
//!    `.env` loaded first
//! 4. Builder overrides (CLI flags)
//!
//! `engine.deferred_alias` left unset by every source is the directive
//! prefix doubled.

use std::path::PathBuf;

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::engine::EngineOptions;

pub const ENV_PREFIX: &str = "TEXTREE";
pub const CONFIG_PATH_ENV: &str = "TEXTREE_CONFIG_PATH";
pub const DEFAULT_CONFIG_FILE: &str = "textree.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineOptions,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load from the default sources without overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let engine = &self.engine;
        if engine.directive_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "engine.directive_prefix must not be empty".to_string(),
            ));
        }
        if !engine.deferred_alias.starts_with(&engine.directive_prefix)
            || engine.deferred_alias == engine.directive_prefix
        {
            return Err(ConfigError::Invalid(format!(
                "engine.deferred_alias '{}' must extend the directive prefix '{}'",
                engine.deferred_alias, engine.directive_prefix
            )));
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigError::Invalid(format!(
                "logging.level '{}': {}",
                self.logging.level, e
            )));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Builder for [`Config`]
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    log_level: Option<String>,
    directive_prefix: Option<String>,
}

impl ConfigBuilder {
    /// Config file path (overrides default search)
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn log_level(mut self, level: Option<String>) -> Self {
        self.log_level = level;
        self
    }

    pub fn directive_prefix(mut self, prefix: Option<String>) -> Self {
        self.directive_prefix = prefix;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        // A missing .env is not an error
        let _ = dotenvy::dotenv();

        // No default for engine.deferred_alias: it follows the prefix unless set
        let mut builder = config::Config::builder()
            .set_default(
                "engine.directive_prefix",
                EngineOptions::default().directive_prefix,
            )?
            .set_default("logging.level", LoggingConfig::default().level)?;

        let path = self
            .config_path
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from));
        builder = match path {
            Some(path) => builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            ),
            None => builder
                .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        if let Some(level) = self.log_level {
            builder = builder.set_override("logging.level", level)?;
        }
        if let Some(prefix) = self.directive_prefix {
            builder = builder.set_override("engine.directive_prefix", prefix)?;
        }

        let layered = builder.build()?;
        let alias_set = layered.get_string("engine.deferred_alias").is_ok();
        let mut config: Config = layered.try_deserialize()?;
        if !alias_set {
            config.engine.deferred_alias = config.engine.directive_prefix.repeat(2);
        }
        config.validate()?;
        Ok(config)
    }
}
