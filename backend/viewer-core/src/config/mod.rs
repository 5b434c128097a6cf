use crate::activation::LaunchMode;
use crate::connectivity::{DEFAULT_PROBE_TIMEOUT, DEFAULT_PROBE_URL};
use crate::error::config::ConfigError;
use crate::export::{ArtifactLayout, DEFAULT_EXTENSION, DEFAULT_FILE_STEM, default_base_dir};
use crate::port::PortWindow;
use crate::{DEFAULT_BASE_PORT, DEFAULT_PORT_WINDOW};

use common::ErrorLocation;

use std::fs::{create_dir_all, read_to_string, rename, write};
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CONFIG_FILE_NAME: &str = "viewer.json";
const CONFIG_DIR_NAME: &str = "snapshot-viewer";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_port")]
    pub base_port: u16,
    #[serde(default = "default_port_window")]
    pub port_window: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_port: default_base_port(),
            port_window: default_port_window(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Overrides `resources/` next to the executable.
    pub base_dir: Option<PathBuf>,
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            file_stem: default_file_stem(),
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// `None` picks the platform default.
    pub mode: Option<LaunchMode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            probe_url: default_probe_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub launch: LaunchConfig,

    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    #[serde(default)]
    pub identity: Option<Uuid>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            export: ExportConfig::default(),
            launch: LaunchConfig::default(),
            connectivity: ConnectivityConfig::default(),
            identity: None,
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_base_port() -> u16 {
    DEFAULT_BASE_PORT
}
fn default_port_window() -> u16 {
    DEFAULT_PORT_WINDOW
}
fn default_file_stem() -> String {
    DEFAULT_FILE_STEM.to_string()
}
fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}
fn default_enabled() -> bool {
    true
}
fn default_probe_url() -> String {
    DEFAULT_PROBE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT.as_secs()
}

/// `<platform config dir>/snapshot-viewer`.
#[track_caller]
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryUnavailable {
            reason: String::from("No platform configuration directory"),
            location: ErrorLocation::from(Location::caller()),
        })
}

// ============================================
// IMPLEMENTATION
// ============================================

impl ViewerConfig {
    /// Load config from `{config_dir}/viewer.json`.
    ///
    /// # Returns
    ///
    /// Returns defaults if the file is missing.
    /// Returns `Err(ConfigError)` if the file exists but is unreadable or invalid.
    #[track_caller]
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {e}");
            ConfigError::ReadError {
                path: config_path.clone(),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            }
        })?;

        let config: ViewerConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {e}");
            ConfigError::ParseError {
                path: config_path.clone(),
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to `{config_dir}/viewer.json` via temp file + rename.
    #[track_caller]
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{CONFIG_FILE_NAME}.tmp"));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            reason: e.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            path: config_path.clone(),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for the first invalid value.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::ValidationError {
            reason,
            location: ErrorLocation::from(Location::caller()),
        };

        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(invalid(format!(
                "Invalid version: {} (expected 1-{CONFIG_VERSION})",
                self.version
            )));
        }

        if self.server.base_port == 0 {
            return Err(invalid(String::from("base_port must be non-zero")));
        }

        if self.server.port_window == 0 {
            return Err(invalid(String::from("port_window must be non-zero")));
        }

        for (field, value) in [
            ("file_stem", &self.export.file_stem),
            ("extension", &self.export.extension),
        ] {
            if value.is_empty() {
                return Err(invalid(format!("{field} cannot be empty")));
            }
            if value.contains(['/', '\\', '\0']) || value.starts_with('.') {
                return Err(invalid(format!("Invalid {field}: {value}")));
            }
        }

        let probe_url = &self.connectivity.probe_url;
        if !probe_url.starts_with("http://") && !probe_url.starts_with("https://") {
            return Err(invalid(format!("Invalid probe URL format: {probe_url}")));
        }

        if self.connectivity.timeout_secs == 0 {
            return Err(invalid(String::from("timeout_secs must be non-zero")));
        }

        Ok(())
    }

    pub fn port_window(&self) -> PortWindow {
        PortWindow::new(self.server.base_port, self.server.port_window)
    }

    pub fn artifact_layout(&self) -> ArtifactLayout {
        let base_dir = self
            .export
            .base_dir
            .clone()
            .unwrap_or_else(default_base_dir);
        ArtifactLayout::new(base_dir, &self.export.file_stem, &self.export.extension)
    }

    pub fn launch_mode(&self) -> LaunchMode {
        self.launch.mode.unwrap_or_default()
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.connectivity.timeout_secs)
    }
}
