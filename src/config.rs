use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::renderer::{FontFaceConfig, Renderer};
use crate::state::{HydrationPolicy, SurfaceDefaults};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "SKETCHPAD_CONFIG";
/// Config file used when the environment variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "sketchpad.json";

/// Errors that can occur while reading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration file {path:?} is corrupted: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Canvas geometry and stroke metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Initial surface width in pixels
    pub width: u32,
    /// Initial surface height in pixels
    pub height: u32,
    pub line_width: f32,
    /// Distance of the underline below the text baseline
    pub underline_offset: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            line_width: Renderer::DEFAULT_LINE_WIDTH,
            underline_offset: Renderer::DEFAULT_UNDERLINE_OFFSET,
        }
    }
}

/// Debounced auto-save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    pub enabled: bool,
    /// Quiet period after the last change before saving
    pub quiet_period_ms: u64,
}

impl AutoSaveConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            quiet_period_ms: 5000,
        }
    }
}

/// Where drawings and downloads are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub drawings_dir: PathBuf,
    pub downloads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            drawings_dir: PathBuf::from("drawings"),
            downloads_dir: PathBuf::from("downloads"),
        }
    }
}

/// Application configuration persisted to disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub canvas: CanvasConfig,
    pub defaults: SurfaceDefaults,
    pub autosave: AutoSaveConfig,
    pub storage: StorageConfig,
    /// Font files overriding the built-in faces
    pub fonts: Vec<FontFaceConfig>,
    pub hydration: HydrationPolicy,
}

/// Result of loading config from disk
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: SketchConfig,
    pub path: PathBuf,
    /// Why the defaults were used instead of the file, if they were
    pub reset_reason: Option<String>,
}

impl SketchConfig {
    /// Parse the config at `path`. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_owned(),
                source,
            })
    }

    /// The path named by [`CONFIG_ENV`], else [`DEFAULT_CONFIG_FILE`].
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load from `path`, falling back to defaults (with a reason) on any error.
    pub fn load_or_default(path: &Path) -> LoadedConfig {
        let (config, reset_reason) = match Self::load(path) {
            Ok(Some(config)) => {
                log::info!("loaded config from {path:?}");
                (config, None)
            }
            Ok(None) => {
                log::info!("no config file at {path:?}, using defaults");
                (Self::default(), None)
            }
            Err(err) => {
                log::warn!("{err}");
                (Self::default(), Some(err.to_string()))
            }
        };
        LoadedConfig {
            config,
            path: path.to_owned(),
            reset_reason,
        }
    }
}
