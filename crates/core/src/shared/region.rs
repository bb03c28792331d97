/// An axis-aligned face box in frame pixel coordinates.
///
/// Detector confidence is not carried: anything a detector returns has
/// already passed its own threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box area, widened so oversized detector output cannot overflow.
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Horizontal center, rounded toward the left edge.
    pub fn center_x(&self) -> i32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height / 2
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Builds a region from floating-point corners, clamped to the frame.
    ///
    /// Returns `None` when nothing of the box remains inside the frame.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64, fw: u32, fh: u32) -> Option<Self> {
        let left = x1.max(0.0).round() as i32;
        let top = y1.max(0.0).round() as i32;
        let right = x2.min(fw as f64).round() as i32;
        let bottom = y2.min(fh as f64).round() as i32;
        if right <= left || bottom <= top {
            return None;
        }
        Some(Self::new(left, top, right - left, bottom - top))
    }
}
