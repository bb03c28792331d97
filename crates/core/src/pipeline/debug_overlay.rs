use std::path::PathBuf;

use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::video::domain::image_writer::ImageWriter;

const GUIDE_COLOR: [u8; 3] = [255, 255, 255];
const TARGET_COLOR: [u8; 3] = [0, 255, 0];
const TARGET_THICKNESS: i32 = 2;

/// Saves annotated snapshots of what the controller saw.
///
/// Every `every`-th frame gets the vertical center guide and a box around
/// the selected target, then is written as `frame_<index>.png` into `dir`.
pub struct DebugOverlay {
    writer: Box<dyn ImageWriter>,
    dir: PathBuf,
    every: usize,
}

impl DebugOverlay {
    pub fn new(writer: Box<dyn ImageWriter>, dir: PathBuf, every: usize) -> Self {
        Self {
            writer,
            dir,
            every: every.max(1),
        }
    }

    /// Annotates and saves `frame` if it falls on the snapshot interval.
    ///
    /// Write failures are logged; a broken overlay never stops tracking.
    pub fn render(&mut self, frame: &mut Frame, target: Option<&Region>) {
        if frame.index() % self.every != 0 {
            return;
        }
        annotate(frame, target);
        let path = self.dir.join(format!("frame_{:06}.png", frame.index()));
        if let Err(e) = self.writer.write(&path, frame) {
            log::warn!("Could not save overlay {}: {e}", path.display());
        }
    }
}

/// Draws the center guide and, if present, the target box.
pub fn annotate(frame: &mut Frame, target: Option<&Region>) {
    let cx = frame.center_x();
    for y in 0..frame.height() as i32 {
        frame.put_pixel(cx, y, GUIDE_COLOR);
    }
    if let Some(r) = target {
        draw_rect(frame, r, TARGET_COLOR, TARGET_THICKNESS);
    }
}

fn draw_rect(frame: &mut Frame, r: &Region, color: [u8; 3], thickness: i32) {
    for t in 0..thickness {
        let (left, top) = (r.x + t, r.y + t);
        let (right, bottom) = (r.right() - 1 - t, r.bottom() - 1 - t);
        if right < left || bottom < top {
            break;
        }
        for x in left..=right {
            frame.put_pixel(x, top, color);
            frame.put_pixel(x, bottom, color);
        }
        for y in top..=bottom {
            frame.put_pixel(left, y, color);
            frame.put_pixel(right, y, color);
        }
    }
}
