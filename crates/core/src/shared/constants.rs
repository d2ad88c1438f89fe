pub const DEFAULT_MODEL_PATH: &str = "model.onnx/model.onnx";

pub const CONFIG_FILE_NAME: &str = "privacy_guard_config.json";

/// Directory name used under the platform config/cache roots.
pub const APP_DIR_NAME: &str = "PrivacyGuard";

pub const DEFAULT_DETECTION_THRESHOLD: f64 = 0.7;
pub const DEFAULT_PRIVACY_DELAY_SECS: f64 = 2.0;
pub const DEFAULT_DETECTION_INTERVAL_SECS: f64 = 0.1;

pub const DEFAULT_CAMERA_INDEX: u32 = 0;
pub const DEFAULT_CAMERA_WIDTH: u32 = 640;
pub const DEFAULT_CAMERA_HEIGHT: u32 = 480;
pub const DEFAULT_CAMERA_FPS: u32 = 30;

/// Connected regions with fewer surviving heatmap cells are treated as noise.
pub const DEFAULT_MIN_COMPONENT_PIXELS: usize = 5;

/// Edge length, in heatmap cells, of one grid-scan cell.
pub const DEFAULT_GRID_CELL_SIZE: usize = 8;

/// Upper bound on how long a launcher command may run before it counts as failed.
pub const DEFAULT_LAUNCH_TIMEOUT_SECS: f64 = 10.0;

pub const PREVIEW_FILE_NAME: &str = "privacy_guard_preview.png";

/// Longest delay, interval or launch timeout a configuration may ask for.
pub const MAX_CONFIG_SECS: f64 = 86_400.0;
