use std::fmt;

use serde::{Deserialize, Serialize};

use crate::detection::domain::heatmap::Heatmap;
use crate::shared::detection::Detection;

/// Which heatmap post-processing turns surviving cells into detections.
///
/// Chosen explicitly in configuration; the two strategies can disagree near
/// the threshold, so the active one is always logged at startup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStrategy {
    #[default]
    Clustering,
    GridScan,
}

impl fmt::Display for CountStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountStrategy::Clustering => write!(f, "clustering"),
            CountStrategy::GridScan => write!(f, "grid_scan"),
        }
    }
}

/// Converts a normalised heatmap into face detections.
///
/// Output boxes are projected into the source frame's pixel space
/// (`frame_width` x `frame_height`). Must be deterministic for a given
/// heatmap and threshold.
pub trait RegionExtractor: Send {
    fn extract(
        &self,
        heatmap: &Heatmap,
        threshold: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Vec<Detection>;

    fn strategy(&self) -> CountStrategy;
}

/// Projects a heatmap cell coordinate onto the source image axis.
pub(crate) fn project(cell: usize, cells: usize, pixels: u32) -> u32 {
    if cells == 0 {
        return 0;
    }
    ((cell as u64 * pixels as u64) / cells as u64) as u32
}
