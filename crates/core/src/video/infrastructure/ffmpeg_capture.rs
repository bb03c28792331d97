use std::path::PathBuf;

use ffmpeg_next::format::context::Context;
use ffmpeg_next::util::frame::video::Video;

use crate::shared::frame::Frame;
use crate::video::domain::frame_source::{CaptureError, FrameSource};

#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_DRIVER: &str = "avfoundation";
#[cfg(target_os = "windows")]
pub const DEFAULT_CAMERA_DRIVER: &str = "dshow";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAMERA_DRIVER: &str = "video4linux2";

/// Where frames come from.
#[derive(Clone, Debug, PartialEq)]
pub enum CaptureInput {
    /// A capture device through an ffmpeg input-device driver.
    ///
    /// `device` is whatever the driver expects (`/dev/video0`, `0`,
    /// `video=USB Camera`); on Linux a bare index is expanded to
    /// `/dev/video<index>`.
    Camera {
        device: String,
        driver: Option<String>,
    },
    /// A recorded video, decoded as if it were a live feed.
    File(PathBuf),
}

impl CaptureInput {
    pub fn describe(&self) -> String {
        match self {
            CaptureInput::Camera { device, .. } => format!("camera {}", camera_path(device)),
            CaptureInput::File(path) => format!("video {}", path.display()),
        }
    }
}

/// Pulls frames from a camera or file via ffmpeg-next.
///
/// Every frame is rescaled to the configured size and converted to RGB24,
/// so the controller always sees the dimensions it was configured with.
pub struct FfmpegCapture {
    decoding: Option<Decoding>,
    description: String,
    width: u32,
    height: u32,
    frame_index: usize,
}

struct Decoding {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    flushing: bool,
}

impl FfmpegCapture {
    pub fn open(input: &CaptureInput, width: u32, height: u32) -> Result<Self, CaptureError> {
        let description = input.describe();
        let fail = |e: ffmpeg_next::Error| CaptureError::Open {
            device: description.clone(),
            source: Box::new(e),
        };

        ffmpeg_next::init().map_err(fail)?;
        let ictx = match input {
            CaptureInput::File(path) => ffmpeg_next::format::input(path),
            CaptureInput::Camera { device, driver } => {
                open_camera(device, driver.as_deref(), width, height)
            }
        }
        .map_err(fail)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(ffmpeg_next::Error::StreamNotFound)
            .map_err(fail)?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(fail)?;
        let decoder = codec_ctx.decoder().video().map_err(fail)?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(fail)?;

        log::info!(
            "Opened {description} ({}x{} native, delivering {width}x{height})",
            decoder.width(),
            decoder.height()
        );

        Ok(Self {
            decoding: Some(Decoding {
                ictx,
                decoder,
                scaler,
                stream_index,
                flushing: false,
            }),
            description,
            width,
            height,
            frame_index: 0,
        })
    }
}

impl FrameSource for FfmpegCapture {
    fn read(&mut self) -> Result<Frame, CaptureError> {
        let dec = self.decoding.as_mut().ok_or(CaptureError::Closed)?;
        let mut decoded = Video::empty();
        loop {
            if dec.decoder.receive_frame(&mut decoded).is_ok() {
                let mut rgb = Video::empty();
                dec.scaler
                    .run(&decoded, &mut rgb)
                    .map_err(|e| CaptureError::Read(Box::new(e)))?;
                let pixels = packed_rgb(&rgb, self.width, self.height);
                let frame = Frame::new(pixels, self.width, self.height, self.frame_index);
                self.frame_index += 1;
                return Ok(frame);
            }

            if dec.flushing {
                return Err(CaptureError::EndOfStream);
            }

            match dec.ictx.packets().next() {
                Some((stream, packet)) => {
                    if stream.index() != dec.stream_index {
                        continue;
                    }
                    if let Err(e) = dec.decoder.send_packet(&packet) {
                        log::debug!("Dropping undecodable packet: {e}");
                    }
                }
                None => {
                    let _ = dec.decoder.send_eof();
                    dec.flushing = true;
                }
            }
        }
    }

    fn close(&mut self) {
        if self.decoding.take().is_some() {
            log::info!("Released {}", self.description);
        }
    }
}

impl Drop for FfmpegCapture {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_camera(
    device: &str,
    driver: Option<&str>,
    width: u32,
    height: u32,
) -> Result<ffmpeg_next::format::context::Input, ffmpeg_next::Error> {
    ffmpeg_next::device::register_all();
    let driver = driver.unwrap_or(DEFAULT_CAMERA_DRIVER);
    let format = ffmpeg_next::device::input::video()
        .find(|f| f.name().split(',').any(|name| name == driver))
        .ok_or(ffmpeg_next::Error::DemuxerNotFound)?;

    let mut options = ffmpeg_next::Dictionary::new();
    options.set("video_size", &format!("{width}x{height}"));

    let path = camera_path(device);
    match ffmpeg_next::format::open_with(
        &path,
        &ffmpeg_next::format::format::Format::Input(format),
        options,
    )? {
        Context::Input(ictx) => Ok(ictx),
        Context::Output(_) => Err(ffmpeg_next::Error::InvalidData),
    }
}

/// Expands a bare camera index to the platform's device path.
pub fn camera_path(device: &str) -> String {
    if cfg!(target_os = "linux") && !device.is_empty() && device.bytes().all(|b| b.is_ascii_digit())
    {
        format!("/dev/video{device}")
    } else {
        device.to_string()
    }
}

/// Copies an RGB24 ffmpeg frame into tightly packed rows.
fn packed_rgb(rgb: &Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let data = rgb.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}
