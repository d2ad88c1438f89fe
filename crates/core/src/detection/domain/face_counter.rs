use crate::detection::domain::heatmap_detector::HeatmapDetector;
use crate::detection::domain::region_extractor::{CountStrategy, RegionExtractor};
use crate::shared::detection::FrameResult;
use crate::shared::frame::Frame;

/// Counts faces in a frame: detector inference followed by region extraction.
///
/// Never fails. An inference error is logged and counted, and the frame is
/// reported as empty so a bad frame cannot stop the monitoring loop.
pub struct FaceCounter {
    detector: Box<dyn HeatmapDetector>,
    extractor: Box<dyn RegionExtractor>,
    threshold: f64,
    inference_failures: u64,
}

impl FaceCounter {
    pub fn new(
        detector: Box<dyn HeatmapDetector>,
        extractor: Box<dyn RegionExtractor>,
        threshold: f64,
    ) -> Self {
        Self {
            detector,
            extractor,
            threshold: threshold.clamp(0.0, 1.0),
            inference_failures: 0,
        }
    }

    pub fn count(&mut self, frame: &Frame) -> FrameResult {
        let heatmap = match self.detector.infer(frame) {
            Ok(h) => h,
            Err(e) => {
                self.inference_failures += 1;
                log::error!("Face detection failed on frame {}: {e}", frame.sequence());
                return FrameResult::empty();
            }
        };

        let detections =
            self.extractor
                .extract(&heatmap, self.threshold, frame.width(), frame.height());
        FrameResult::from_detections(detections)
    }

    pub fn strategy(&self) -> CountStrategy {
        self.extractor.strategy()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn inference_failures(&self) -> u64 {
        self.inference_failures
    }
}
