use thiserror::Error;

use crate::config::guard_config::{ConfigError, GuardConfig};
use crate::detection::domain::face_counter::FaceCounter;
use crate::detection::domain::heatmap_detector::DetectionError;
use crate::detection::infrastructure::extractor_factory::create_extractor;
use crate::detection::infrastructure::model_resolver::{self, ModelResolveError};
use crate::detection::infrastructure::onnx_heatmap_detector::OnnxHeatmapDetector;
use crate::monitor::guard_session::GuardSession;
use crate::occupancy::domain::occupancy_state_machine::OccupancyStateMachine;
use crate::presentation::domain::preview_surface::PreviewSurface;
use crate::presentation::infrastructure::snapshot_preview::SnapshotPreview;
use crate::presentation::infrastructure::system_notifier::SystemNotifier;
use crate::protection::infrastructure::action_factory::create_action;
use crate::protection::infrastructure::system_process_launcher::SystemProcessLauncher;
use crate::shared::capture_metadata::CaptureMetadata;
use crate::shared::platform::Platform;
use crate::video::domain::frame_source::{CaptureError, CaptureRequest, FrameSource};
use crate::video::infrastructure::ffmpeg_camera_source::FfmpegCameraSource;

/// Failures that stop a session before the first tick.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ModelMissing(#[from] ModelResolveError),
    #[error(transparent)]
    ModelLoad(#[from] DetectionError),
    #[error(transparent)]
    Camera(#[from] CaptureError),
}

pub fn capture_request(config: &GuardConfig) -> CaptureRequest {
    CaptureRequest {
        index: config.camera_index,
        width: config.camera_width,
        height: config.camera_height,
        fps: config.camera_fps,
        device: config.camera_device.clone(),
    }
}

/// Opens the camera with the configured request.
pub fn open_camera(config: &GuardConfig) -> Result<(FfmpegCameraSource, CaptureMetadata), CaptureError> {
    let mut source = FfmpegCameraSource::new();
    let metadata = source.open(&capture_request(config))?;
    log::info!(
        "Camera {} opened at {} @ {:.0} fps",
        metadata.device,
        metadata.resolution(),
        metadata.fps
    );
    Ok((source, metadata))
}

/// Wires a session from configuration.
///
/// The model is loaded before the camera is opened, so a missing model never
/// leaves the camera light on.
pub fn build_session(config: &GuardConfig) -> Result<(GuardSession, CaptureMetadata), StartupError> {
    config.validate()?;
    let platform = Platform::current();

    let model_path = model_resolver::resolve(&config.model_path)?;
    let detector = OnnxHeatmapDetector::new(&model_path)?;

    let extractor = create_extractor(
        config.count_strategy,
        config.min_component_pixels,
        config.grid_cell_size,
    );
    let counter = FaceCounter::new(Box::new(detector), extractor, config.detection_threshold);

    let (source, metadata) = open_camera(config)?;

    let action = create_action(&config.actions, platform);
    let notifier = SystemNotifier::new(
        platform,
        Box::new(SystemProcessLauncher::new()),
        config.enable_desktop_notification,
        config.enable_sound_alert,
    );
    let preview: Option<Box<dyn PreviewSurface>> = if config.enable_face_preview {
        Some(Box::new(SnapshotPreview::new(config.preview_path())))
    } else {
        None
    };

    let session = GuardSession::new(
        Box::new(source),
        counter,
        OccupancyStateMachine::new(config.privacy_delay()),
        action,
        Box::new(notifier),
        preview,
    );
    Ok((session, metadata))
}
