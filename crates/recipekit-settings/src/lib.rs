//! # RecipeKit Settings
//!
//! Configuration loading, saving and validation for the template designer
//! and the page renderer. Supports JSON and TOML files stored in the
//! platform-specific configuration directory.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, AssetSettings, Config, ExportSettings, GridSettings, PageSettings,
    StorageSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
