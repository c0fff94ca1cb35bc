//! Weave configuration file handling

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use weave_theme::Mirrors;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level Weave configuration (weave.toml)
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WeaveConfig {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub mirrors: MirrorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Host application integration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostConfig {
    /// Process inbound host messages from startup
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Forward local preference changes to the host
    #[serde(default)]
    pub forward: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            forward: false,
        }
    }
}

/// Where the preference pair is mirrored
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MirrorConfig {
    #[serde(default = "default_surface")]
    pub surface: String,
    #[serde(default = "default_theme_dropdowns")]
    pub theme_dropdowns: Vec<String>,
    #[serde(default = "default_density_dropdowns")]
    pub density_dropdowns: Vec<String>,
    /// Radio selectors `weave-theme` / `weave-density`
    #[serde(default = "default_true")]
    pub radios: bool,
    /// Title mirror `demo-title`
    #[serde(default = "default_true")]
    pub title: bool,
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
}

fn default_true() -> bool {
    true
}

fn default_surface() -> String {
    "surface".to_string()
}

fn default_theme_dropdowns() -> Vec<String> {
    vec!["theme-dropdown".to_string(), "demo-theme-dropdown".to_string()]
}

fn default_density_dropdowns() -> Vec<String> {
    vec![
        "density-dropdown".to_string(),
        "demo-density-dropdown".to_string(),
    ]
}

fn default_title_prefix() -> String {
    "Weave UI".to_string()
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            surface: default_surface(),
            theme_dropdowns: default_theme_dropdowns(),
            density_dropdowns: default_density_dropdowns(),
            radios: true,
            title: true,
            title_prefix: default_title_prefix(),
        }
    }
}

impl MirrorConfig {
    /// Mirror targets described by this section
    pub fn to_mirrors(&self) -> Mirrors {
        let defaults = Mirrors::default();
        Mirrors {
            surface: Some(self.surface.as_str().into()),
            theme_selector: if self.radios { defaults.theme_selector } else { None },
            density_selector: if self.radios { defaults.density_selector } else { None },
            theme_dropdowns: self.theme_dropdowns.iter().map(|id| id.as_str().into()).collect(),
            density_dropdowns: self
                .density_dropdowns
                .iter()
                .map(|id| id.as_str().into())
                .collect(),
            title: if self.title { defaults.title } else { None },
            title_prefix: self.title_prefix.clone(),
        }
    }
}

/// Durable preference storage
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("weave-preferences.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

impl WeaveConfig {
    /// Load configuration from a file, or from `weave.toml` inside a directory
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let config_path = if path.is_dir() {
            path.join("weave.toml")
        } else {
            path.to_path_buf()
        };

        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
