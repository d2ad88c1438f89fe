use std::fs;
use std::path::PathBuf;

use image::{ImageFormat, Rgb, RgbImage};

use crate::occupancy::domain::occupancy_state::OccupancyState;
use crate::presentation::domain::preview_surface::{PreviewError, PreviewSurface};
use crate::shared::detection::{BoundingBox, ConfidenceBand, FrameResult};
use crate::shared::frame::Frame;

const BOX_THICKNESS: u32 = 2;
const STATUS_BAR_HEIGHT: u32 = 16;
const MARKER_SIZE: u32 = 10;
const MARKER_GAP: u32 = 4;
/// Each label glyph is 3x5 cells drawn as `LABEL_SCALE` pixel squares.
const LABEL_SCALE: u32 = 2;
const GLYPH_ADVANCE: u32 = 4 * LABEL_SCALE;

/// Preview written as a PNG snapshot that is replaced on every tick.
///
/// Detections are outlined in their confidence band colour (green above 0.8,
/// yellow above 0.6, blue below). A status bar across the top is red in
/// privacy mode, amber while pending and green when secure. It carries one
/// white marker per face on the left and the state label with the face count
/// on the right, e.g. `PRIVACY MODE 3`.
pub struct SnapshotPreview {
    path: PathBuf,
    written: bool,
}

impl SnapshotPreview {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: false,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PreviewSurface for SnapshotPreview {
    fn show(
        &mut self,
        frame: &Frame,
        result: &FrameResult,
        state: OccupancyState,
    ) -> Result<(), PreviewError> {
        let image = render(frame, result, state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.temp_path();
        image
            .save_with_format(&tmp, ImageFormat::Png)
            .map_err(|e| PreviewError::Render(e.to_string()))?;
        fs::rename(&tmp, &self.path)?;

        if !self.written {
            log::info!("Preview snapshots at {}", self.path.display());
            self.written = true;
        }
        Ok(())
    }

    fn close(&mut self) {
        log::debug!("Preview closed; last snapshot left at {}", self.path.display());
    }
}

pub fn band_colour(band: ConfidenceBand) -> Rgb<u8> {
    match band {
        ConfidenceBand::High => Rgb([0, 255, 0]),
        ConfidenceBand::Medium => Rgb([255, 255, 0]),
        ConfidenceBand::Low => Rgb([0, 0, 255]),
    }
}

pub fn state_colour(state: OccupancyState) -> Rgb<u8> {
    match state {
        OccupancyState::Privacy => Rgb([220, 40, 40]),
        OccupancyState::Pending => Rgb([255, 176, 0]),
        OccupancyState::Secure => Rgb([40, 180, 60]),
    }
}

/// Draws detections and the status bar over a copy of the frame.
pub fn render(
    frame: &Frame,
    result: &FrameResult,
    state: OccupancyState,
) -> Result<RgbImage, PreviewError> {
    let mut image = RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
        .ok_or_else(|| PreviewError::Render("frame data does not match its size".to_string()))?;

    for detection in &result.detections {
        outline(&mut image, &detection.bounding_box, band_colour(detection.band()));
    }
    status_bar(&mut image, state, result.face_count);
    Ok(image)
}

fn fill(image: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, colour: Rgb<u8>) {
    let x1 = x1.min(image.width());
    let y1 = y1.min(image.height());
    for y in y0..y1 {
        for x in x0..x1 {
            image.put_pixel(x, y, colour);
        }
    }
}

fn outline(image: &mut RgbImage, b: &BoundingBox, colour: Rgb<u8>) {
    let t = BOX_THICKNESS.min(b.width()).min(b.height());
    fill(image, b.x1, b.y1, b.x2, b.y1 + t, colour);
    fill(image, b.x1, b.y2.saturating_sub(t), b.x2, b.y2, colour);
    fill(image, b.x1, b.y1, b.x1 + t, b.y2, colour);
    fill(image, b.x2.saturating_sub(t), b.y1, b.x2, b.y2, colour);
}

pub fn status_label(state: OccupancyState, face_count: usize) -> String {
    format!("{} {face_count}", state.to_string().to_uppercase())
}

fn status_bar(image: &mut RgbImage, state: OccupancyState, face_count: usize) {
    let width = image.width();
    let bar = STATUS_BAR_HEIGHT.min(image.height());
    fill(image, 0, 0, width, bar, state_colour(state));
    let white = Rgb([255, 255, 255]);

    let label = status_label(state, face_count);
    let label_width = label_width(&label);
    let text_height = 5 * LABEL_SCALE;
    let label_left = match width.checked_sub(label_width + MARKER_GAP) {
        Some(left) if bar >= text_height => {
            draw_label(image, &label, left, (bar - text_height) / 2, white);
            left
        }
        _ => width,
    };

    let top = bar.saturating_sub(MARKER_SIZE) / 2;
    for i in 0..face_count as u32 {
        let x = MARKER_GAP + i * (MARKER_SIZE + MARKER_GAP);
        if x + MARKER_SIZE > label_left {
            break;
        }
        fill(image, x, top, x + MARKER_SIZE, top + MARKER_SIZE.min(bar), white);
    }
}

fn label_width(label: &str) -> u32 {
    (label.chars().count() as u32 * GLYPH_ADVANCE).saturating_sub(LABEL_SCALE)
}

fn draw_label(image: &mut RgbImage, label: &str, left: u32, top: u32, colour: Rgb<u8>) {
    for (i, c) in label.chars().enumerate() {
        let gx = left + i as u32 * GLYPH_ADVANCE;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..3u32 {
                if bits & (0b100 >> col) != 0 {
                    let x = gx + col * LABEL_SCALE;
                    let y = top + row as u32 * LABEL_SCALE;
                    fill(image, x, y, x + LABEL_SCALE, y + LABEL_SCALE, colour);
                }
            }
        }
    }
}

/// 3x5 bitmaps for the characters status labels use; anything else is blank.
fn glyph(c: char) -> [u8; 5] {
    match c {
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' | '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b110, 0b001, 0b010, 0b100, 0b111],
        '3' => [0b110, 0b001, 0b010, 0b001, 0b110],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b110, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b110],
        _ => [0; 5],
    }
}
