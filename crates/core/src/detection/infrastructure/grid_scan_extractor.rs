use crate::detection::domain::heatmap::Heatmap;
use crate::detection::domain::region_extractor::{project, CountStrategy, RegionExtractor};
use crate::shared::detection::{BoundingBox, Detection};

/// Coarse fixed-grid scan over the heatmap.
///
/// The map is tiled into non-overlapping `cell_size` x `cell_size` cells. A
/// cell whose maximum exceeds the threshold yields one detection covering the
/// cell's projected rectangle, with that maximum as its confidence. A face
/// straddling a cell border counts once per cell it touches.
pub struct GridScanExtractor {
    cell_size: usize,
}

impl GridScanExtractor {
    pub fn new(cell_size: usize) -> Self {
        Self {
            cell_size: cell_size.max(1),
        }
    }
}

impl RegionExtractor for GridScanExtractor {
    fn extract(
        &self,
        heatmap: &Heatmap,
        threshold: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Detection> {
        let rows = heatmap.rows();
        let cols = heatmap.cols();
        let step = self.cell_size;
        let mut detections = Vec::new();

        for r in (0..rows).step_by(step) {
            for c in (0..cols).step_by(step) {
                let peak = heatmap.max_in(r, r + step, c, c + step);
                if peak <= threshold {
                    continue;
                }
                let bounding_box = BoundingBox {
                    x1: project(c, cols, frame_width),
                    y1: project(r, rows, frame_height),
                    x2: project(c + step, cols, frame_width).min(frame_width),
                    y2: project(r + step, rows, frame_height).min(frame_height),
                };
                detections.push(Detection {
                    bounding_box,
                    confidence: peak,
                });
            }
        }
        detections
    }

    fn strategy(&self) -> CountStrategy {
        CountStrategy::GridScan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;
    use rstest::rstest;

    fn map_with(points: &[(usize, usize, f32)]) -> Heatmap {
        let mut m = Array2::zeros((60, 80));
        for &(r, c, v) in points {
            m[[r, c]] = v;
        }
        Heatmap::new(m)
    }

    #[test]
    fn test_single_peak_fires_one_cell() {
        let ex = GridScanExtractor::new(8);
        let dets = ex.extract(&map_with(&[(3, 3, 0.9)]), 0.7, 640, 480);
        assert_eq!(dets.len(), 1);
        assert_eq!(
            dets[0].bounding_box,
            BoundingBox {
                x1: 0,
                y1: 0,
                x2: 64,
                y2: 64
            }
        );
        assert_relative_eq!(dets[0].confidence, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn test_peaks_in_same_cell_count_once() {
        let ex = GridScanExtractor::new(8);
        let dets = ex.extract(&map_with(&[(1, 1, 0.9), (6, 6, 0.8)]), 0.7, 640, 480);
        assert_eq!(dets.len(), 1);
    }

    #[test]
    fn test_straddling_peak_counts_per_cell() {
        let ex = GridScanExtractor::new(8);
        let dets = ex.extract(&map_with(&[(7, 7, 0.9), (8, 8, 0.9)]), 0.7, 640, 480);
        assert_eq!(dets.len(), 2);
    }

    #[test]
    fn test_partial_edge_cell_is_clamped() {
        // 60 rows / 8 leaves a 4-row cell at the bottom.
        let ex = GridScanExtractor::new(8);
        let dets = ex.extract(&map_with(&[(58, 0, 0.9)]), 0.7, 640, 480);
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].bounding_box.y1, 448);
        assert_eq!(dets[0].bounding_box.y2, 480);
    }

    #[test]
    fn test_value_equal_to_threshold_does_not_fire() {
        let ex = GridScanExtractor::new(8);
        let dets = ex.extract(&map_with(&[(3, 3, 0.5)]), 0.5, 640, 480);
        assert!(dets.is_empty());
    }

    #[rstest]
    #[case(0.9)]
    #[case(0.6)]
    #[case(0.3)]
    #[case(0.0)]
    fn test_count_non_decreasing_as_threshold_drops(#[case] threshold: f64) {
        let heatmap = map_with(&[(0, 0, 0.95), (20, 30, 0.65), (40, 60, 0.45), (59, 79, 0.2)]);
        let ex = GridScanExtractor::new(8);
        let at = ex.extract(&heatmap, threshold, 640, 480).len();
        let lower = ex.extract(&heatmap, (threshold - 0.1).max(0.0), 640, 480).len();
        assert!(lower >= at);
    }

    #[test]
    fn test_zero_cell_size_treated_as_one() {
        let ex = GridScanExtractor::new(0);
        let dets = ex.extract(&map_with(&[(0, 0, 0.9), (0, 1, 0.9)]), 0.5, 640, 480);
        assert_eq!(dets.len(), 2);
    }
}
