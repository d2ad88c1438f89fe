use thiserror::Error;

use crate::occupancy::domain::occupancy_state::OccupancyState;
use crate::shared::detection::FrameResult;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("failed to render preview: {0}")]
    Render(String),
    #[error("failed to write preview: {0}")]
    Io(#[from] std::io::Error),
}

/// Shows the operator what the detector sees.
///
/// A failing surface is disabled by the caller for the rest of the session.
pub trait PreviewSurface: Send {
    fn show(
        &mut self,
        frame: &Frame,
        result: &FrameResult,
        state: OccupancyState,
    ) -> Result<(), PreviewError>;

    fn close(&mut self);
}
