use thiserror::Error;

use crate::shared::capture_metadata::CaptureMetadata;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera {device} could not be opened: {reason}")]
    Open { device: String, reason: String },
    #[error("no capture backend available on this platform: {0}")]
    Backend(String),
    #[error("camera_device must be set to capture on {0}")]
    DeviceRequired(String),
    #[error("frame could not be decoded: {0}")]
    Decode(String),
    #[error("camera is not open")]
    NotOpen,
}

/// What the session asks the camera for.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureRequest {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Explicit device URL; overrides `index` when set.
    pub device: Option<String>,
}

/// A live source of camera frames.
///
/// `read` returning `Ok(None)` means no frame was available this time; the
/// caller skips the tick rather than stopping.
pub trait FrameSource: Send {
    fn open(&mut self, request: &CaptureRequest) -> Result<CaptureMetadata, CaptureError>;

    fn read(&mut self) -> Result<Option<Frame>, CaptureError>;

    /// Releases the device. Safe to call more than once.
    fn release(&mut self);
}
