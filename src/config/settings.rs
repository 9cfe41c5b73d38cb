//! TOML-based configuration.
//!
//! Example configuration:
//! ```toml
//! [weight]
//! weight_check_threshold = 100000
//! evaluation_sketch_size = 16384
//! ```

use crate::model::DEFAULT_SKETCH_SIZE;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "DRUID_QUERY_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Weight check configuration.
    pub weight: WeightSettings,
}

/// Weight check configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeightSettings {
    /// Queries weighing more than this are measured before they run.
    pub weight_check_threshold: i64,

    /// Sketch size used by weight-evaluation queries.
    pub evaluation_sketch_size: u32,
}

impl Default for WeightSettings {
    fn default() -> Self {
        Self {
            weight_check_threshold: 100_000,
            evaluation_sketch_size: DEFAULT_SKETCH_SIZE,
        }
    }
}

impl WeightSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        if self.weight_check_threshold < 0 {
            return Err(SettingsError::InvalidConfig(format!(
                "weight_check_threshold must not be negative, got {}",
                self.weight_check_threshold
            )));
        }
        if self.evaluation_sketch_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "evaluation_sketch_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.weight.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `DRUID_QUERY_CONFIG`
    /// 2. `./druid-query.toml`
    /// 3. `~/.config/druid-query/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(
            env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
            Path::new("."),
            dirs::config_dir(),
        )
    }

    /// Lookup behind [`Settings::load`], with the locations passed in.
    fn load_from(
        explicit: Option<PathBuf>,
        working_dir: &Path,
        config_dir: Option<PathBuf>,
    ) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::from_file(&path);
        }

        let local_config = working_dir.join("druid-query.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = config_dir {
            let user_config = config_dir.join("druid-query").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }
}
