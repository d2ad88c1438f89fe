/// Axis-aligned box in source-image pixel coordinates.
///
/// `x2`/`y2` are exclusive, so `width() == x2 - x1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> u32 {
        self.y2.saturating_sub(self.y1)
    }
}

/// Confidence band used when drawing a detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

/// One candidate face found in a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    /// Heatmap confidence in `[0, 1]`.
    pub confidence: f64,
}

impl Detection {
    pub fn band(&self) -> ConfidenceBand {
        if self.confidence > 0.8 {
            ConfidenceBand::High
        } else if self.confidence > 0.6 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }
}

/// Outcome of counting faces in a single frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameResult {
    pub face_count: usize,
    pub detections: Vec<Detection>,
}

impl FrameResult {
    pub fn from_detections(detections: Vec<Detection>) -> Self {
        Self {
            face_count: detections.len(),
            detections,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn detection(confidence: f64) -> Detection {
        Detection {
            bounding_box: BoundingBox {
                x1: 10,
                y1: 20,
                x2: 50,
                y2: 80,
            },
            confidence,
        }
    }

    #[test]
    fn test_box_dimensions() {
        let d = detection(0.9);
        assert_eq!(d.bounding_box.width(), 40);
        assert_eq!(d.bounding_box.height(), 60);
    }

    #[test]
    fn test_inverted_box_has_zero_size() {
        let b = BoundingBox {
            x1: 10,
            y1: 10,
            x2: 5,
            y2: 5,
        };
        assert_eq!(b.width(), 0);
        assert_eq!(b.height(), 0);
    }

    #[rstest]
    #[case::high(0.95, ConfidenceBand::High)]
    #[case::boundary_high(0.8, ConfidenceBand::Medium)]
    #[case::medium(0.7, ConfidenceBand::Medium)]
    #[case::boundary_medium(0.6, ConfidenceBand::Low)]
    #[case::low(0.1, ConfidenceBand::Low)]
    fn test_confidence_band(#[case] confidence: f64, #[case] expected: ConfidenceBand) {
        assert_eq!(detection(confidence).band(), expected);
    }

    #[test]
    fn test_from_detections_counts() {
        let result = FrameResult::from_detections(vec![detection(0.9), detection(0.7)]);
        assert_eq!(result.face_count, 2);
        assert_eq!(result.detections.len(), 2);
    }

    #[test]
    fn test_empty_result() {
        let result = FrameResult::empty();
        assert_eq!(result.face_count, 0);
        assert!(result.detections.is_empty());
    }
}
