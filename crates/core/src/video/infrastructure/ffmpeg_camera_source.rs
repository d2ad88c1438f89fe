use ffmpeg_next::format::context::Input;
use ffmpeg_next::software::scaling;

use crate::shared::capture_metadata::CaptureMetadata;
use crate::shared::frame::Frame;
use crate::shared::platform::Platform;
use crate::video::domain::frame_source::{CaptureError, CaptureRequest, FrameSource};

/// Captures camera frames through libavdevice.
///
/// Each decoded frame is converted to RGB24 and wrapped in a [`Frame`].
pub struct FfmpegCameraSource {
    platform: Platform,
    session: Option<CaptureSession>,
}

struct CaptureSession {
    input: Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
    sequence: u64,
}

// Safety: FfmpegCameraSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegCameraSource {}

/// The libavdevice input format and URL for a capture request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceSpec {
    pub format: &'static str,
    pub url: String,
}

impl DeviceSpec {
    pub fn for_request(request: &CaptureRequest, platform: Platform) -> Result<Self, CaptureError> {
        let format = match platform {
            Platform::Linux => "v4l2",
            Platform::Macos => "avfoundation",
            Platform::Windows => "dshow",
        };
        let url = match (&request.device, platform) {
            (Some(device), _) if !device.trim().is_empty() => device.trim().to_string(),
            (_, Platform::Linux) => format!("/dev/video{}", request.index),
            (_, Platform::Macos) => request.index.to_string(),
            (_, Platform::Windows) => {
                return Err(CaptureError::DeviceRequired(platform.to_string()));
            }
        };
        Ok(Self { format, url })
    }
}

impl FfmpegCameraSource {
    pub fn new() -> Self {
        Self::for_platform(Platform::current())
    }

    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            session: None,
        }
    }

    fn find_format(name: &str) -> Result<ffmpeg_next::format::Format, CaptureError> {
        ffmpeg_next::device::input::video()
            .find(|f| f.name() == name)
            .ok_or_else(|| CaptureError::Backend(format!("ffmpeg was built without {name}")))
    }
}

impl Default for FfmpegCameraSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegCameraSource {
    fn open(&mut self, request: &CaptureRequest) -> Result<CaptureMetadata, CaptureError> {
        self.release();

        let spec = DeviceSpec::for_request(request, self.platform)?;
        let open_err = |reason: String| CaptureError::Open {
            device: spec.url.clone(),
            reason,
        };

        ffmpeg_next::init().map_err(|e| CaptureError::Backend(e.to_string()))?;
        ffmpeg_next::device::register_all();
        let format = Self::find_format(spec.format)?;

        let mut options = ffmpeg_next::Dictionary::new();
        options.set("video_size", &format!("{}x{}", request.width, request.height));
        options.set("framerate", &request.fps.to_string());

        log::debug!("Opening {} via {}", spec.url, spec.format);
        let input = ffmpeg_next::format::open_with(&spec.url, &format, options)
            .map_err(|e| open_err(e.to_string()))?
            .input();

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| open_err("no video stream".to_string()))?;
        let stream_index = stream.index();
        let rate = stream.rate();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| open_err(e.to_string()))?;
        let decoder = codec_ctx
            .decoder()
            .video()
            .map_err(|e| open_err(e.to_string()))?;

        let width = decoder.width();
        let height = decoder.height();
        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .map_err(|e| open_err(e.to_string()))?;

        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            request.fps as f64
        };

        let metadata = CaptureMetadata {
            width,
            height,
            fps,
            device: spec.url.clone(),
        };
        if width != request.width || height != request.height {
            log::warn!(
                "Camera delivers {} instead of the requested {}x{}",
                metadata.resolution(),
                request.width,
                request.height
            );
        }

        self.session = Some(CaptureSession {
            input,
            decoder,
            scaler,
            stream_index,
            width,
            height,
            sequence: 0,
        });
        Ok(metadata)
    }

    fn read(&mut self) -> Result<Option<Frame>, CaptureError> {
        let session = self.session.as_mut().ok_or(CaptureError::NotOpen)?;
        session.next_frame()
    }

    fn release(&mut self) {
        if self.session.take().is_some() {
            log::debug!("Camera released");
        }
    }
}

impl CaptureSession {
    fn next_frame(&mut self) -> Result<Option<Frame>, CaptureError> {
        if let Some(frame) = self.try_receive()? {
            return Ok(Some(frame));
        }

        loop {
            let Some((stream, packet)) = self.input.packets().next() else {
                return Ok(None);
            };
            if stream.index() != self.stream_index {
                continue;
            }
            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }
            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }
        }
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, CaptureError> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return Ok(None);
        }

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        self.scaler
            .run(&decoded, &mut rgb)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;

        let pixels = packed_rgb(rgb.data(0), rgb.stride(0), self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, self.sequence);
        self.sequence += 1;
        Ok(Some(frame))
    }
}

/// Strips per-row padding from an RGB24 plane.
fn packed_rgb(data: &[u8], stride: usize, width: u32, height: u32) -> Vec<u8> {
    let row_len = width as usize * 3;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}
