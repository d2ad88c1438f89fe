use std::path::Path;

use ndarray::{Array2, Array4, ArrayViewD};

use crate::detection::domain::heatmap::Heatmap;
use crate::detection::domain::heatmap_detector::{DetectionError, HeatmapDetector};
use crate::shared::frame::Frame;

use super::execution_provider::preferred_execution_providers;

/// Fallback input resolution when the model's shape is dynamic.
const DEFAULT_INPUT_WIDTH: u32 = 640;
const DEFAULT_INPUT_HEIGHT: u32 = 480;

/// Face-centre heatmap detector using ONNX Runtime via `ort`.
///
/// The model takes a single-channel `u8` image (`[1, 1, H, W]`) and emits a
/// confidence heatmap as its first output at a fixed lower resolution.
pub struct OnnxHeatmapDetector {
    session: ort::session::Session,
    input_width: u32,
    input_height: u32,
}

impl OnnxHeatmapDetector {
    /// Load the model. Any failure here is fatal for the session.
    pub fn new(model_path: &Path) -> Result<Self, DetectionError> {
        let load_err = |e: &dyn std::fmt::Display| DetectionError::ModelLoad {
            path: model_path.display().to_string(),
            reason: e.to_string(),
        };

        let session = ort::session::Session::builder()
            .map_err(|e| load_err(&e))?
            .with_execution_providers(preferred_execution_providers())
            .map_err(|e| load_err(&e))?
            .commit_from_file(model_path)
            .map_err(|e| load_err(&e))?;

        // NCHW: [1, 1, H, W]
        let (input_height, input_width) = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 && shape[3] > 0 {
                        Some((shape[2] as u32, shape[3] as u32))
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or((DEFAULT_INPUT_HEIGHT, DEFAULT_INPUT_WIDTH));

        log::info!(
            "Model loaded from {} (input {}x{})",
            model_path.display(),
            input_width,
            input_height
        );

        Ok(Self {
            session,
            input_width,
            input_height,
        })
    }
}

impl HeatmapDetector for OnnxHeatmapDetector {
    fn infer(&mut self, frame: &Frame) -> Result<Heatmap, DetectionError> {
        let input = preprocess(frame, self.input_width, self.input_height);
        let input_value = ort::value::Tensor::from_array(input)
            .map_err(|e| DetectionError::Inference(e.to_string()))?;
        let outputs = self
            .session
            .run(ort::inputs![input_value])
            .map_err(|e| DetectionError::Inference(e.to_string()))?;
        if outputs.len() == 0 {
            return Err(DetectionError::UnexpectedOutput(
                "model produced no outputs".into(),
            ));
        }

        // outputs[0] = heatmap [1, 1, h, w]; box and landmark maps are unused.
        if let Ok(raw) = outputs[0].try_extract_array::<u8>() {
            return Ok(Heatmap::from_u8(&last_plane(raw)?));
        }
        let raw = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| DetectionError::UnexpectedOutput(e.to_string()))?;
        Ok(Heatmap::new(last_plane(raw)?))
    }
}

/// Luma plane, nearest-neighbour resized to `width x height`, as `[1, 1, H, W]`.
fn preprocess(frame: &Frame, width: u32, height: u32) -> Array4<u8> {
    let luma = frame.luma();
    let (src_h, src_w) = luma.dim();
    let (h, w) = (height as usize, width as usize);

    let mut tensor = Array4::<u8>::zeros((1, 1, h, w));
    if src_h == 0 || src_w == 0 {
        return tensor;
    }
    for y in 0..h {
        let sy = (((y as f64 + 0.5) * src_h as f64 / h as f64) as usize).min(src_h - 1);
        for x in 0..w {
            let sx = (((x as f64 + 0.5) * src_w as f64 / w as f64) as usize).min(src_w - 1);
            tensor[[0, 0, y, x]] = luma[[sy, sx]];
        }
    }
    tensor
}

/// First `h x w` plane of an N-d output whose last two axes are spatial.
fn last_plane<T: Copy>(raw: ArrayViewD<'_, T>) -> Result<Array2<T>, DetectionError> {
    let shape = raw.shape().to_vec();
    if shape.len() < 2 {
        return Err(DetectionError::UnexpectedOutput(format!(
            "heatmap shape {shape:?}"
        )));
    }
    let h = shape[shape.len() - 2];
    let w = shape[shape.len() - 1];
    let data: Vec<T> = raw.iter().take(h * w).copied().collect();
    Array2::from_shape_vec((h, w), data)
        .map_err(|e| DetectionError::UnexpectedOutput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array3, IxDyn};

    #[test]
    fn test_preprocess_shape() {
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 0);
        let tensor = preprocess(&frame, 80, 60);
        assert_eq!(tensor.shape(), &[1, 1, 60, 80]);
    }

    #[test]
    fn test_preprocess_keeps_uniform_grey() {
        let frame = Frame::new(vec![200u8; 32 * 32 * 3], 32, 32, 0);
        let tensor = preprocess(&frame, 16, 16);
        assert!(tensor.iter().all(|&v| v == 200));
    }

    #[test]
    fn test_preprocess_samples_left_and_right_halves() {
        // Left half black, right half white.
        let (w, h) = (4u32, 2u32);
        let mut data = vec![0u8; (w * h * 3) as usize];
        for y in 0..h as usize {
            for x in 2..4usize {
                let i = (y * w as usize + x) * 3;
                data[i..i + 3].copy_from_slice(&[255, 255, 255]);
            }
        }
        let frame = Frame::new(data, w, h, 0);
        let tensor = preprocess(&frame, 2, 1);
        assert_eq!(tensor[[0, 0, 0, 0]], 0);
        assert_eq!(tensor[[0, 0, 0, 1]], 255);
    }

    #[test]
    fn test_last_plane_from_nchw() {
        let raw = Array4::<u8>::from_shape_fn((1, 1, 3, 4), |(_, _, y, x)| (y * 4 + x) as u8);
        let plane = last_plane(raw.view().into_dyn()).unwrap();
        assert_eq!(plane.dim(), (3, 4));
        assert_eq!(plane[[2, 3]], 11);
    }

    #[test]
    fn test_last_plane_from_chw() {
        let raw = Array3::<f32>::from_elem((1, 2, 2), 0.5);
        let plane = last_plane(raw.view().into_dyn()).unwrap();
        assert_eq!(plane.dim(), (2, 2));
    }

    #[test]
    fn test_last_plane_rejects_vectors() {
        let raw = ndarray::ArrayD::<u8>::zeros(IxDyn(&[5]));
        assert!(last_plane(raw.view()).is_err());
    }
}
