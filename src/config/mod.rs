//! Configuration module.
//!
//! Handles the TOML settings file that tunes weight-based admission control.

mod settings;

pub use settings::{Settings, SettingsError, WeightSettings, CONFIG_ENV_VAR};
