use std::io::BufRead;
use std::path::PathBuf;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::Parser;

use pantrack_core::actuator::domain::actuator_link::ActuatorLink;
use pantrack_core::actuator::infrastructure::serial_link::SerialLink;
use pantrack_core::actuator::infrastructure::writer_link::WriterLink;
use pantrack_core::detection::domain::face_detector::FaceDetector;
use pantrack_core::detection::infrastructure::min_size_detector::MinSizeDetector;
use pantrack_core::detection::infrastructure::model_resolver;
use pantrack_core::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use pantrack_core::pipeline::debug_overlay::DebugOverlay;
use pantrack_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use pantrack_core::pipeline::track_faces_use_case::{RunSummary, TrackFacesUseCase};
use pantrack_core::shared::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_DEADBAND, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH,
    DEFAULT_LINK_SETTLE_MS, DEFAULT_LOSS_TIMEOUT_MS, DEFAULT_MAX_CMD, DEFAULT_MIN_FACE_SIZE,
    DEFAULT_SCALE, DEFAULT_WRITE_TIMEOUT_MS, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use pantrack_core::tracking::domain::clock::SystemClock;
use pantrack_core::tracking::domain::tracking_config::{RoundingMode, TrackingConfig};
use pantrack_core::tracking::domain::tracking_controller::TrackingController;
use pantrack_core::video::infrastructure::ffmpeg_capture::{CaptureInput, FfmpegCapture};
use pantrack_core::video::infrastructure::image_file_writer::ImageFileWriter;

/// Point a serial pan mechanism at the largest face in view.
///
/// Type `q` (or ESC) and press Enter to stop; the actuator always receives
/// STOP on the way out.
#[derive(Parser)]
#[command(name = "pantrack")]
struct Cli {
    /// Camera device: index or driver-specific name.
    #[arg(long, default_value = "0")]
    camera: String,

    /// ffmpeg input device driver (defaults to the platform's camera driver).
    #[arg(long)]
    camera_driver: Option<String>,

    /// Track faces in a recorded video instead of a camera.
    #[arg(long, conflicts_with_all = ["camera", "camera_driver"])]
    video: Option<PathBuf>,

    /// Serial port of the actuator (e.g. /dev/ttyACM0, COM3).
    #[arg(long, required_unless_present = "dry_run")]
    port: Option<String>,

    /// Serial baud rate.
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Serial write timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_WRITE_TIMEOUT_MS)]
    write_timeout_ms: u64,

    /// Delay after opening the port before sending, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_LINK_SETTLE_MS)]
    settle_ms: u64,

    /// Capture width in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
    width: u32,

    /// Capture height in pixels.
    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT)]
    height: u32,

    /// Pixels either side of center treated as centered.
    #[arg(long, default_value_t = DEFAULT_DEADBAND, allow_hyphen_values = true)]
    deadband: i32,

    /// Largest steering step per frame.
    #[arg(long, default_value_t = DEFAULT_MAX_CMD, allow_hyphen_values = true)]
    max_cmd: i32,

    /// Pixel error to step conversion factor.
    #[arg(long, default_value_t = DEFAULT_SCALE, allow_hyphen_values = true)]
    scale: f64,

    /// Step rounding: nearest or truncate.
    #[arg(long, default_value = "nearest")]
    rounding: String,

    /// Milliseconds without a face before the actuator is re-centered.
    #[arg(long, default_value_t = DEFAULT_LOSS_TIMEOUT_MS)]
    loss_timeout_ms: u64,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.5")]
    confidence: f64,

    /// Ignore faces narrower or shorter than this many pixels (0 = off).
    #[arg(long, default_value_t = DEFAULT_MIN_FACE_SIZE)]
    min_face_size: i32,

    /// Face model file (downloaded to the cache if omitted).
    #[arg(long)]
    model: Option<PathBuf>,

    /// Save annotated frames to this directory.
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// Save every Nth frame when --overlay-dir is set.
    #[arg(long, default_value = "15")]
    overlay_every: usize,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Print commands to stdout instead of opening a serial port.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = tracking_config(&cli)?;
    config.validate()?;

    let detector = build_detector(&cli)?;
    let link = open_link(&cli)?;
    let source = Box::new(FfmpegCapture::open(
        &capture_input(&cli),
        cli.width,
        cli.height,
    )?);

    let cancelled = Arc::new(AtomicBool::new(false));
    spawn_abort_watcher(cancelled.clone());

    let controller = TrackingController::new(&config, Box::new(SystemClock));
    let mut use_case = TrackFacesUseCase::new(source, detector, link, controller, cancelled)
        .with_logger(Box::new(StdoutPipelineLogger::default()));
    if let Some(dir) = cli.overlay_dir {
        log::info!("Saving every {} frame(s) to {}", cli.overlay_every, dir.display());
        use_case = use_case.with_overlay(DebugOverlay::new(
            Box::new(ImageFileWriter::new()),
            dir,
            cli.overlay_every,
        ));
    }
    if let Some(max) = cli.max_frames {
        use_case = use_case.with_max_frames(max);
    }

    log::info!("Tracking; type q and press Enter to stop");
    let summary = use_case.execute()?;
    report(&summary);
    Ok(())
}

fn tracking_config(cli: &Cli) -> Result<TrackingConfig, Box<dyn std::error::Error>> {
    Ok(TrackingConfig {
        deadband: cli.deadband,
        max_cmd: cli.max_cmd,
        scale: cli.scale,
        rounding: parse_rounding(&cli.rounding)?,
        loss_timeout: Duration::from_millis(cli.loss_timeout_ms),
    })
}

fn build_detector(cli: &Cli) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let explicit = cli.model.as_deref();
    if explicit.is_none() {
        log::info!("Resolving model: {YOLO_MODEL_NAME}");
    }
    let model_path = model_resolver::resolve(
        YOLO_MODEL_NAME,
        YOLO_MODEL_URL,
        explicit,
        Some(Box::new(download_progress)),
    )?;
    if explicit.is_none() {
        eprintln!();
    }

    let base: Box<dyn FaceDetector> = Box::new(OnnxYoloDetector::new(&model_path, cli.confidence)?);
    if cli.min_face_size > 0 {
        Ok(Box::new(MinSizeDetector::new(base, cli.min_face_size)))
    } else {
        Ok(base)
    }
}

fn open_link(cli: &Cli) -> Result<Box<dyn ActuatorLink>, Box<dyn std::error::Error>> {
    if cli.dry_run {
        log::info!("Dry run: commands go to stdout");
        return Ok(Box::new(WriterLink::new(std::io::stdout())));
    }
    let port = cli.port.as_deref().ok_or("--port is required")?;
    Ok(Box::new(SerialLink::open(
        port,
        cli.baud,
        Duration::from_millis(cli.write_timeout_ms),
        Duration::from_millis(cli.settle_ms),
    )?))
}

fn capture_input(cli: &Cli) -> CaptureInput {
    match &cli.video {
        Some(path) => CaptureInput::File(path.clone()),
        None => CaptureInput::Camera {
            device: cli.camera.clone(),
            driver: cli.camera_driver.clone(),
        },
    }
}

/// Raises `cancelled` when the user types `q` or ESC followed by Enter.
/// A closed stdin (e.g. running under a service manager) is not an abort.
fn spawn_abort_watcher(cancelled: Arc<AtomicBool>) {
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { return };
            let key = line.trim();
            if key.eq_ignore_ascii_case("q") || key.starts_with('\u{1b}') {
                cancelled.store(true, Ordering::Relaxed);
                return;
            }
        }
    });
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(video) = &cli.video {
        if !video.exists() {
            return Err(format!("Video file not found: {}", video.display()).into());
        }
    }
    if cli.width == 0 || cli.height == 0 {
        return Err(format!(
            "Frame size must be positive, got {}x{}",
            cli.width, cli.height
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.min_face_size < 0 {
        return Err(format!(
            "Minimum face size must not be negative, got {}",
            cli.min_face_size
        )
        .into());
    }
    if cli.overlay_every == 0 {
        return Err("Overlay interval must be at least 1".into());
    }
    if cli.baud == 0 {
        return Err("Baud rate must be positive".into());
    }
    Ok(())
}

fn parse_rounding(mode: &str) -> Result<RoundingMode, Box<dyn std::error::Error>> {
    match mode {
        "nearest" => Ok(RoundingMode::Nearest),
        "truncate" => Ok(RoundingMode::Truncate),
        other => Err(format!("Rounding must be 'nearest' or 'truncate', got '{other}'").into()),
    }
}

fn report(summary: &RunSummary) {
    log::info!(
        "Stopped after {} frames ({:?}): {} steering, {} centering, {} failed writes, STOP {}",
        summary.frames,
        summary.termination,
        summary.steer_sent,
        summary.center_sent,
        summary.failed_writes,
        if summary.stop_sent { "sent" } else { "not sent" },
    );
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
