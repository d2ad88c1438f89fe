use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::action_table::ProtectiveActionConfig;
use crate::detection::domain::region_extractor::CountStrategy;
use crate::shared::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),
    #[error("value for {key} has the wrong type: {source}")]
    WrongType {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not determine configuration directory")]
    NoConfigDir,
}

/// Session configuration, persisted as a flat JSON document.
///
/// Missing keys take the built-in defaults and unknown keys are ignored, so
/// files written by older or newer versions still load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub detection_threshold: f64,
    /// Seconds more than one face must persist before privacy engages.
    pub privacy_delay: f64,
    pub camera_index: u32,
    pub camera_width: u32,
    pub camera_height: u32,
    pub camera_fps: u32,
    /// Capture device URL overriding the one derived from `camera_index`.
    pub camera_device: Option<String>,
    /// Seconds between detection ticks.
    pub detection_interval: f64,
    pub enable_face_preview: bool,
    pub preview_path: Option<PathBuf>,
    pub enable_sound_alert: bool,
    pub enable_desktop_notification: bool,
    pub model_path: PathBuf,
    pub count_strategy: CountStrategy,
    pub min_component_pixels: usize,
    pub grid_cell_size: usize,
    #[serde(flatten)]
    pub actions: ProtectiveActionConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            privacy_delay: DEFAULT_PRIVACY_DELAY_SECS,
            camera_index: DEFAULT_CAMERA_INDEX,
            camera_width: DEFAULT_CAMERA_WIDTH,
            camera_height: DEFAULT_CAMERA_HEIGHT,
            camera_fps: DEFAULT_CAMERA_FPS,
            camera_device: None,
            detection_interval: DEFAULT_DETECTION_INTERVAL_SECS,
            enable_face_preview: false,
            preview_path: None,
            enable_sound_alert: false,
            enable_desktop_notification: true,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            count_strategy: CountStrategy::Clustering,
            min_component_pixels: DEFAULT_MIN_COMPONENT_PIXELS,
            grid_cell_size: DEFAULT_GRID_CELL_SIZE,
            actions: ProtectiveActionConfig::default(),
        }
    }
}

/// A loaded configuration and the file it came from, if any.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: GuardConfig,
    pub source: Option<PathBuf>,
}

impl GuardConfig {
    /// Loads from the first existing candidate path.
    ///
    /// An explicit path is the only candidate when given. A file that exists
    /// but cannot be parsed is reported and replaced by defaults.
    pub fn load(explicit: Option<&Path>) -> LoadedConfig {
        let candidates = match explicit {
            Some(p) => vec![p.to_path_buf()],
            None => search_paths(),
        };

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => {
                    log::info!("User configuration loaded from {}", path.display());
                    return LoadedConfig {
                        config,
                        source: Some(path),
                    };
                }
                Err(e) => {
                    log::warn!("Failed to load user configuration, using defaults: {e}");
                    return LoadedConfig {
                        config: Self::default(),
                        source: Some(path),
                    };
                }
            }
        }

        LoadedConfig {
            config: Self::default(),
            source: None,
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(ConfigError::Invalid {
                key: "detection_threshold",
                reason: format!("must be between 0.0 and 1.0, got {}", self.detection_threshold),
            });
        }
        check_seconds("privacy_delay", self.privacy_delay, true)?;
        check_seconds("detection_interval", self.detection_interval, false)?;
        if self.grid_cell_size == 0 {
            return Err(ConfigError::Invalid {
                key: "grid_cell_size",
                reason: "must be > 0".into(),
            });
        }
        if self.camera_width == 0 || self.camera_height == 0 || self.camera_fps == 0 {
            return Err(ConfigError::Invalid {
                key: "camera_width",
                reason: format!(
                    "camera mode must be non-zero, got {}x{}@{}",
                    self.camera_width, self.camera_height, self.camera_fps
                ),
            });
        }
        check_seconds("launch_timeout", self.actions.launch_timeout, false)
    }

    /// Sets one top-level key from its textual form.
    ///
    /// `raw` is parsed as JSON first and falls back to a plain string, so
    /// `0.5`, `true` and `Calculator` all work. The result is validated.
    pub fn set_key(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let mut doc = serde_json::to_value(&*self).map_err(|e| ConfigError::WrongType {
            key: key.to_string(),
            source: e,
        })?;
        let object = doc
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        if !object.contains_key(key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let value = serde_json::from_str(raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.to_string()));
        object.insert(key.to_string(), value);

        let updated: GuardConfig =
            serde_json::from_value(doc).map_err(|e| ConfigError::WrongType {
                key: key.to_string(),
                source: e,
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn privacy_delay(&self) -> Duration {
        seconds(self.privacy_delay)
    }

    pub fn detection_interval(&self) -> Duration {
        seconds(self.detection_interval)
    }

    pub fn preview_path(&self) -> PathBuf {
        self.preview_path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(PREVIEW_FILE_NAME))
    }
}

fn check_seconds(key: &'static str, value: f64, allow_zero: bool) -> Result<(), ConfigError> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if lower_ok && value <= MAX_CONFIG_SECS {
        return Ok(());
    }
    let lower = if allow_zero { ">= 0" } else { "> 0" };
    Err(ConfigError::Invalid {
        key,
        reason: format!("must be {lower} and at most {MAX_CONFIG_SECS}s, got {value}"),
    })
}

/// Converts configured seconds to a `Duration`, clamped to `[0, MAX_CONFIG_SECS]`.
///
/// NaN maps to zero. Never panics, even for values `validate` would reject.
pub fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.clamp(0.0, MAX_CONFIG_SECS)).unwrap_or_default()
}

/// Where `load(None)` looks, in order.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
    if let Ok(p) = user_config_path() {
        paths.push(p);
    }
    paths
}

/// Per-user configuration file, used when nothing else is specified.
pub fn user_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}
