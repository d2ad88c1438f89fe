/// What the capture device actually delivers once opened.
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Device URL handed to the capture backend (e.g. `/dev/video0`).
    pub device: String,
}

impl CaptureMetadata {
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}
