use ndarray::Array2;

/// A captured camera frame: contiguous RGB bytes in row-major order.
///
/// `sequence` counts frames delivered by the source since it was opened.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    sequence: u64,
}

const CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            sequence,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Single-channel luma plane using BT.601 weights.
    pub fn luma(&self) -> Array2<u8> {
        let w = self.width as usize;
        let h = self.height as usize;
        Array2::from_shape_fn((h, w), |(y, x)| {
            let i = (y * w + x) * CHANNELS;
            let r = self.data[i] as f32;
            let g = self.data[i + 1] as f32;
            let b = self.data[i + 2] as f32;
            (0.299 * r + 0.587 * g + 0.114 * b).round().min(255.0) as u8
        })
    }
}
