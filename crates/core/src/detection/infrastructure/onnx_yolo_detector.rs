//! YOLO face detector on ONNX Runtime via `ort`.
//!
//! Letterboxes the frame to the model's square input, keeps boxes above the
//! confidence threshold, runs greedy NMS and maps boxes back to frame
//! pixels. Landmarks from pose-style models are ignored.
use std::cmp::Ordering;
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Input resolution used when the model's input shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 640;

pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// YOLO pad color (114 gray), normalized.
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .with_execution_providers(execution_providers())?
            .commit_from_file(model_path)?;

        // NCHW: [1, 3, H, W]; square models, so H is enough.
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| match input.dtype() {
                ort::value::ValueType::Tensor { shape, .. } if shape.len() >= 4 && shape[2] > 0 => {
                    Some(shape[2] as u32)
                }
                _ => None,
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!(
            "Loaded face model {} (input {input_size}px, confidence {confidence})",
            model_path.display()
        );

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let letterboxed = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(letterboxed.tensor.clone())?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("face model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("unexpected face model output shape: {shape:?}").into());
        }
        // Ultralytics exports [1, features, boxes]; others emit [1, boxes, features].
        let transposed = shape[1] < shape[2];
        let (num_boxes, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if num_feats < 5 {
            return Err(format!("face model output has {num_feats} features, need 5").into());
        }
        let data = tensor
            .as_slice()
            .ok_or("face model output is not contiguous")?;

        let feature = |b: usize, f: usize| -> f64 {
            if transposed {
                data[f * num_boxes + b] as f64
            } else {
                data[b * num_feats + f] as f64
            }
        };

        let mut candidates = Vec::new();
        for b in 0..num_boxes {
            let score = feature(b, 4);
            if score < self.confidence {
                continue;
            }
            let (cx, cy, w, h) = (feature(b, 0), feature(b, 1), feature(b, 2), feature(b, 3));
            candidates.push(Candidate {
                corners: letterboxed.unmap([cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0]),
                score,
            });
        }

        Ok(nms(candidates, NMS_IOU_THRESH)
            .into_iter()
            .filter_map(|c| {
                let [x1, y1, x2, y2] = c.corners;
                Region::from_corners(x1, y1, x2, y2, frame.width(), frame.height())
            })
            .collect())
    }
}

fn execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

struct Letterboxed {
    tensor: ndarray::Array4<f32>,
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterboxed {
    /// Maps `[x1, y1, x2, y2]` from model input space back to frame pixels.
    fn unmap(&self, corners: [f64; 4]) -> [f64; 4] {
        let px = self.pad_x as f64;
        let py = self.pad_y as f64;
        [
            (corners[0] - px) / self.scale,
            (corners[1] - py) / self.scale,
            (corners[2] - px) / self.scale,
            (corners[3] - py) / self.scale,
        ]
    }
}

/// Aspect-preserving nearest-neighbor resize into a padded square tensor.
fn letterbox(frame: &Frame, target_size: u32) -> Letterboxed {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let side = target_size as usize;
    let mut tensor = ndarray::Array4::<f32>::from_elem((1, 3, side, side), PAD_VALUE);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    for y in 0..new_h as usize {
        let sy = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let sx = ((x as f64 / scale) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, pad_y as usize + y, pad_x as usize + x]] =
                    src[[sy, sx, c]] as f32 / 255.0;
            }
        }
    }

    Letterboxed {
        tensor,
        scale,
        pad_x,
        pad_y,
    }
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct Candidate {
    corners: [f64; 4],
    score: f64,
}

/// Greedy NMS, highest score first.
fn nms(mut candidates: Vec<Candidate>, iou_thresh: f64) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut kept: Vec<Candidate> = Vec::new();
    for c in candidates {
        if kept.iter().all(|k| iou(&k.corners, &c.corners) <= iou_thresh) {
            kept.push(c);
        }
    }
    kept
}

fn iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let w = (a[2].min(b[2]) - a[0].max(b[0])).max(0.0);
    let h = (a[3].min(b[3]) - a[1].max(b[1])).max(0.0);
    let inter = w * h;
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn candidate(corners: [f64; 4], score: f64) -> Candidate {
        Candidate { corners, score }
    }

    #[test]
    fn test_letterbox_camera_frame() {
        // 320x240 into 640: scale 2, 640x480 image, 80px bars top and bottom.
        let lb = letterbox(&Frame::blank(320, 240, 0), 640);
        assert_eq!(lb.tensor.shape(), &[1, 3, 640, 640]);
        assert_relative_eq!(lb.scale, 2.0);
        assert_eq!((lb.pad_x, lb.pad_y), (0, 80));
    }

    #[test]
    fn test_letterbox_fills_bars_with_pad_value() {
        let mut frame = Frame::blank(320, 240, 0);
        frame.put_pixel(0, 0, [255, 255, 255]);
        let lb = letterbox(&frame, 640);

        assert_relative_eq!(lb.tensor[[0, 0, 0, 0]], PAD_VALUE);
        // First image row starts right after the top bar.
        assert_relative_eq!(lb.tensor[[0, 0, 80, 0]], 1.0);
        assert_relative_eq!(lb.tensor[[0, 1, 80, 2]], 0.0);
    }

    #[test]
    fn test_unmap_inverts_letterbox() {
        let lb = letterbox(&Frame::blank(320, 240, 0), 640);
        // Frame box (140, 90)-(180, 130) sits at (280, 260)-(360, 340) in model space.
        let corners = lb.unmap([280.0, 260.0, 360.0, 340.0]);
        assert_relative_eq!(corners[0], 140.0);
        assert_relative_eq!(corners[1], 90.0);
        assert_relative_eq!(corners[2], 180.0);
        assert_relative_eq!(corners[3], 130.0);
    }

    #[test]
    fn test_nms_keeps_best_of_overlapping_pair() {
        let kept = nms(
            vec![
                candidate([2.0, 2.0, 102.0, 102.0], 0.6),
                candidate([0.0, 0.0, 100.0, 100.0], 0.9),
            ],
            0.45,
        );
        assert_eq!(kept.len(), 1);
        assert_relative_eq!(kept[0].score, 0.9);
    }

    #[test]
    fn test_nms_keeps_separate_faces() {
        let kept = nms(
            vec![
                candidate([0.0, 0.0, 50.0, 50.0], 0.9),
                candidate([200.0, 0.0, 250.0, 50.0], 0.7),
            ],
            0.45,
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_empty() {
        assert!(nms(Vec::new(), 0.45).is_empty());
    }

    #[test]
    fn test_iou_values() {
        let a = [0.0, 0.0, 100.0, 100.0];
        assert_relative_eq!(iou(&a, &a), 1.0);
        assert_relative_eq!(iou(&a, &[50.0, 0.0, 150.0, 100.0]), 5000.0 / 15000.0);
        assert_relative_eq!(iou(&a, &[100.0, 0.0, 200.0, 100.0]), 0.0);
    }
}
