//! Configuration for RecipeKit
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Page settings (output page size)
//! - Grid settings (snap spacing, guide visibility)
//! - Asset settings (bitmap root, placeholder, organization logo)
//! - Storage settings (template directory, recipe file)
//! - Export settings (page background)

use crate::error::{ConfigError, ConfigResult, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output page dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Page width in points (one point renders as one pixel)
    pub width: u32,
    /// Page height in points
    pub height: u32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            width: 792,
            height: 612,
        }
    }
}

/// Alignment grid settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Grid spacing in points
    pub size: f64,
    /// Snap shapes to the grid when placing and at drag end
    pub snap_enabled: bool,
    /// Show grid guide lines in the editor view
    pub show_guides: bool,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            size: 20.0,
            snap_enabled: true,
            show_guides: true,
        }
    }
}

/// Bitmap asset settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory that relative image paths resolve against
    pub root: PathBuf,
    /// Image shown when a recipe photo or logo cannot be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder_image: Option<String>,
    /// Organization logo used as the page watermark
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_image: Option<String>,
    /// Opacity applied to the watermark
    pub watermark_opacity: f64,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            placeholder_image: None,
            logo_image: None,
            watermark_opacity: 0.1,
        }
    }
}

/// Template and recipe storage locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one JSON file per saved template
    pub template_dir: PathBuf,
    /// JSON file of recipe records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipes_file: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            recipes_file: None,
        }
    }
}

/// Export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Page background as a hex color
    pub background: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_string(),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub page: PageSettings,
    pub grid: GridSettings,
    pub assets: AssetSettings,
    pub storage: StorageSettings,
    pub export: ExportSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Load config from `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::info!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.page.width == 0 || self.page.height == 0 {
            return Err(ConfigError::ValueOutOfRange {
                key: "page".to_string(),
                value: format!("{}x{}", self.page.width, self.page.height),
            });
        }

        if !(self.grid.size.is_finite() && self.grid.size > 0.0) {
            return Err(ConfigError::ValueOutOfRange {
                key: "grid.size".to_string(),
                value: self.grid.size.to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.assets.watermark_opacity) {
            return Err(ConfigError::ValueOutOfRange {
                key: "assets.watermark_opacity".to_string(),
                value: self.assets.watermark_opacity.to_string(),
            });
        }

        if !is_hex_color(&self.export.background) {
            return Err(ConfigError::InvalidColor {
                key: "export.background".to_string(),
                value: self.export.background.clone(),
            });
        }

        Ok(())
    }

    /// Resolve an asset path against the configured asset root
    pub fn asset_path(&self, relative: &str) -> PathBuf {
        self.assets.root.join(relative)
    }
}

/// Default location of the configuration file
pub fn default_config_path() -> ConfigResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("recipekit").join("config.toml"))
        .ok_or_else(|| ConfigError::UnsupportedPlatform(std::env::consts::OS.to_string()))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
