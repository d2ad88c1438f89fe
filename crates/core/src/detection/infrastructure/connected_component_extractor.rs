use std::collections::VecDeque;

use ndarray::Array2;

use crate::detection::domain::heatmap::Heatmap;
use crate::detection::domain::region_extractor::{project, CountStrategy, RegionExtractor};
use crate::shared::detection::{BoundingBox, Detection};

/// Groups 4-connected above-threshold cells into one detection each.
///
/// Components smaller than `min_pixels` cells are dropped as noise. The box is
/// the tight cell rectangle projected into frame pixels, and the confidence is
/// the mean heatmap value inside that rectangle.
pub struct ConnectedComponentExtractor {
    min_pixels: usize,
}

struct Component {
    size: usize,
    min_row: usize,
    max_row: usize,
    min_col: usize,
    max_col: usize,
}

impl ConnectedComponentExtractor {
    pub fn new(min_pixels: usize) -> Self {
        Self { min_pixels }
    }
}

impl RegionExtractor for ConnectedComponentExtractor {
    fn extract(
        &self,
        heatmap: &Heatmap,
        threshold: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Detection> {
        let mask = heatmap.binarize(threshold);
        label_components(&mask)
            .into_iter()
            .filter(|c| c.size >= self.min_pixels)
            .map(|c| to_detection(&c, heatmap, frame_width, frame_height))
            .collect()
    }

    fn strategy(&self) -> CountStrategy {
        CountStrategy::Clustering
    }
}

/// Flood-fills the mask in raster order so component order is stable.
fn label_components(mask: &Array2<bool>) -> Vec<Component> {
    let (rows, cols) = mask.dim();
    let mut visited = Array2::from_elem((rows, cols), false);
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for r in 0..rows {
        for c in 0..cols {
            if !mask[[r, c]] || visited[[r, c]] {
                continue;
            }
            visited[[r, c]] = true;
            queue.push_back((r, c));
            let mut comp = Component {
                size: 0,
                min_row: r,
                max_row: r,
                min_col: c,
                max_col: c,
            };

            while let Some((y, x)) = queue.pop_front() {
                comp.size += 1;
                comp.min_row = comp.min_row.min(y);
                comp.max_row = comp.max_row.max(y);
                comp.min_col = comp.min_col.min(x);
                comp.max_col = comp.max_col.max(x);

                let neighbours = [
                    (y.wrapping_sub(1), x),
                    (y + 1, x),
                    (y, x.wrapping_sub(1)),
                    (y, x + 1),
                ];
                for (ny, nx) in neighbours {
                    if ny < rows && nx < cols && mask[[ny, nx]] && !visited[[ny, nx]] {
                        visited[[ny, nx]] = true;
                        queue.push_back((ny, nx));
                    }
                }
            }
            components.push(comp);
        }
    }
    components
}

fn to_detection(c: &Component, heatmap: &Heatmap, fw: u32, fh: u32) -> Detection {
    let rows = heatmap.rows();
    let cols = heatmap.cols();

    let x1 = project(c.min_col, cols, fw).min(fw.saturating_sub(1));
    let y1 = project(c.min_row, rows, fh).min(fh.saturating_sub(1));
    let x2 = project(c.max_col + 1, cols, fw).min(fw).max(x1 + 1);
    let y2 = project(c.max_row + 1, rows, fh).min(fh).max(y1 + 1);

    Detection {
        bounding_box: BoundingBox { x1, y1, x2, y2 },
        confidence: heatmap.mean_in(c.min_row, c.max_row, c.min_col, c.max_col),
    }
}
