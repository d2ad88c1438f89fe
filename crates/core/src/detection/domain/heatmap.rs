use ndarray::Array2;

/// Low-resolution face-centre confidence map, every cell in `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Heatmap {
    values: Array2<f32>,
}

impl Heatmap {
    /// Wraps an already-normalised map, clamping stray values into `[0, 1]`.
    pub fn new(values: Array2<f32>) -> Self {
        Self {
            values: values.mapv(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }),
        }
    }

    /// Normalises a raw `u8` map by `1/255`.
    pub fn from_u8(raw: &Array2<u8>) -> Self {
        Self {
            values: raw.mapv(|v| v as f32 / 255.0),
        }
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[[row, col]]
    }

    /// Cells strictly above `threshold`.
    pub fn binarize(&self, threshold: f64) -> Array2<bool> {
        self.values.mapv(|v| v as f64 > threshold)
    }

    /// Mean over the inclusive cell rectangle `[r0..=r1] x [c0..=c1]`.
    pub fn mean_in(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> f64 {
        let window = self.values.slice(ndarray::s![r0..=r1, c0..=c1]);
        window.mean().map(|m| m as f64).unwrap_or(0.0)
    }

    /// Maximum over the half-open cell rectangle, clipped to the map.
    pub fn max_in(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> f64 {
        let r1 = r1.min(self.rows());
        let c1 = c1.min(self.cols());
        if r0 >= r1 || c0 >= c1 {
            return 0.0;
        }
        self.values
            .slice(ndarray::s![r0..r1, c0..c1])
            .iter()
            .fold(0.0f32, |acc, &v| acc.max(v)) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_from_u8_normalises() {
        let raw = array![[0u8, 255], [51, 102]];
        let map = Heatmap::from_u8(&raw);
        assert_relative_eq!(map.get(0, 0), 0.0);
        assert_relative_eq!(map.get(0, 1), 1.0);
        assert_relative_eq!(map.get(1, 0), 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_new_clamps_out_of_range_values() {
        let map = Heatmap::new(array![[-0.5f32, 1.5], [f32::NAN, 0.5]]);
        assert_relative_eq!(map.get(0, 0), 0.0);
        assert_relative_eq!(map.get(0, 1), 1.0);
        assert_relative_eq!(map.get(1, 0), 0.0);
        assert_relative_eq!(map.get(1, 1), 0.5);
    }

    #[test]
    fn test_binarize_is_strict() {
        let map = Heatmap::new(array![[0.7f32, 0.71]]);
        let bin = map.binarize(0.7);
        assert!(!bin[[0, 0]]);
        assert!(bin[[0, 1]]);
    }

    #[test]
    fn test_mean_in_inclusive_window() {
        let map = Heatmap::new(array![[0.2f32, 0.4, 0.9], [0.6, 0.8, 0.9]]);
        assert_relative_eq!(map.mean_in(0, 1, 0, 1), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_max_in_clips_to_bounds() {
        let map = Heatmap::new(array![[0.2f32, 0.4], [0.6, 0.3]]);
        assert_relative_eq!(map.max_in(0, 8, 0, 8), 0.6, epsilon = 1e-6);
        assert_relative_eq!(map.max_in(2, 8, 0, 8), 0.0);
    }
}
