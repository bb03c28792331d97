pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const DEFAULT_FRAME_WIDTH: u32 = 320;
pub const DEFAULT_FRAME_HEIGHT: u32 = 240;

/// Pixels either side of center that count as "centered enough".
pub const DEFAULT_DEADBAND: i32 = 12;
/// Largest steering step sent in a single tick.
pub const DEFAULT_MAX_CMD: i32 = 20;
/// Pixel error to actuator units.
pub const DEFAULT_SCALE: f64 = 0.08;
/// Range the scale has been tuned within on real hardware.
pub const RECOMMENDED_SCALE_RANGE: (f64, f64) = (0.05, 0.15);
pub const DEFAULT_LOSS_TIMEOUT_MS: u64 = 1500;

pub const DEFAULT_BAUD_RATE: u32 = 115_200;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 20;
/// Boards with auto-reset on open need time before they accept input.
pub const DEFAULT_LINK_SETTLE_MS: u64 = 2000;

/// Faces smaller than this (either side, px) are ignored.
pub const DEFAULT_MIN_FACE_SIZE: i32 = 40;
