use thiserror::Error;

use crate::detection::domain::heatmap::Heatmap;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("failed to load model {path}: {reason}")]
    ModelLoad { path: String, reason: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
}

/// Domain interface for the face-localisation model.
///
/// Implementations own their preprocessing; callers hand over the raw frame
/// and get back a map at the model's native (lower) resolution.
pub trait HeatmapDetector: Send {
    fn infer(&mut self, frame: &Frame) -> Result<Heatmap, DetectionError>;
}
