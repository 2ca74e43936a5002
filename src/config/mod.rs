//! Configuration module for ghx
//!
//! Settings are layered: built-in defaults, then the TOML file in the user's
//! config directory, then `GHX_*` environment variables. Credentials are not
//! stored here; see [`crate::session`].

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::bulk::DEFAULT_MAX_TARGETS;

/// Default REST API root for github.com
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Keys accepted by `ghx config get/set`
pub const KEYS: &[&str] = &[
    "api_url",
    "default_repo",
    "format",
    "max_targets",
    "timeout_secs",
    "quiet",
];

/// Output format for command results
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned, colored columns
    #[default]
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// Pretty-printed JSON
    Json,
    /// One item per line, no decoration
    Plain,
}

impl OutputFormat {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Plain => "plain",
        }
    }
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct GhxConfig {
    /// REST API root; change for GitHub Enterprise Server
    pub api_url: String,

    /// Repository used when `--repo` is not given and no git remote matches
    pub default_repo: Option<String>,

    /// Default output format
    pub format: OutputFormat,

    /// Upper bound on the number of issues a single range may expand to
    pub max_targets: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Suppress informational output by default
    pub quiet: bool,
}

impl Default for GhxConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            default_repo: None,
            format: OutputFormat::Table,
            max_targets: DEFAULT_MAX_TARGETS,
            timeout_secs: 30,
            quiet: false,
        }
    }
}

impl GhxConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("ghx").join("config.toml"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file is not an error; defaults and environment overrides
    /// still apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an environment value cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit file path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an environment value cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("GHX").try_parsing(true))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit file path
    ///
    /// # Errors
    ///
    /// See [`GhxConfig::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_targets == 0 {
            return Err(ConfigError::Message("max_targets must be at least 1".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Message("timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Read a setting by key, formatted for display
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "api_url" => self.api_url.clone(),
            "default_repo" => self.default_repo.clone().unwrap_or_default(),
            "format" => self.format.as_str().to_string(),
            "max_targets" => self.max_targets.to_string(),
            "timeout_secs" => self.timeout_secs.to_string(),
            "quiet" => self.quiet.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Update a setting from its string form
    ///
    /// An empty value for `default_repo` unsets it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown keys and unparsable values.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |expected: &str| {
            ConfigError::Message(format!(
                "Invalid value for {key}: '{value}'. Expected {expected}"
            ))
        };
        match key {
            "api_url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(invalid("an http(s) URL"));
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "default_repo" => {
                self.default_repo = if value.is_empty() {
                    None
                } else {
                    crate::scope::Scope::parse(value)
                        .map_err(|e| ConfigError::Message(e.to_string()))?;
                    Some(value.to_string())
                };
            }
            "format" => {
                self.format = OutputFormat::from_str(value, true)
                    .map_err(|_| invalid("one of table, csv, json, plain"))?;
            }
            "max_targets" => {
                self.max_targets = value
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("a positive integer"))?;
            }
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("a positive integer"))?;
            }
            "quiet" => {
                self.quiet = value.parse().map_err(|_| invalid("'true' or 'false'"))?;
            }
            _ => {
                return Err(ConfigError::Message(format!(
                    "Unknown configuration key: '{key}'. Available keys: {}",
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}
