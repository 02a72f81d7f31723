//! Synthetic swings for unit tests.

use std::collections::BTreeMap;
use std::f64::consts::FRAC_PI_2;

use crate::frame::{self, Detection, Observation, PoseFrame};
use crate::landmark::{Landmark, Position};

/// A noise-free parametric swing.
///
/// The trailing wrist climbs from y=0.75 to 0.25 at `top` (ease-out), drops
/// back to 0.75 at `impact` with increasing speed, then rises slowly to 0.45
/// by the last frame. The minimum is unique at `top` and the largest
/// single-step drop is the one landing on `impact`.
#[derive(Debug, Clone)]
pub struct SwingShape {
    pub frames: usize,
    pub top: usize,
    pub impact: usize,
    pub fps: f64,
    /// Hip midpoint x offset on odd frames; every step moves the hips this far.
    pub hip_sway: f64,
    pub visibility: f64,
}

impl Default for SwingShape {
    fn default() -> Self {
        Self {
            frames: 40,
            top: 24,
            impact: 32,
            fps: 30.0,
            hip_sway: 0.0,
            visibility: 1.0,
        }
    }
}

pub fn wrist_y(shape: &SwingShape, i: usize) -> f64 {
    if i <= shape.top {
        if shape.top == 0 {
            return 0.25;
        }
        let s = (FRAC_PI_2 * i as f64 / shape.top as f64).sin();
        0.75 - 0.5 * s * s
    } else if i <= shape.impact {
        let u = (i - shape.top) as f64 / (shape.impact - shape.top) as f64;
        0.25 + 0.5 * u * u
    } else {
        let tail = (shape.frames - 1 - shape.impact) as f64;
        0.75 - 0.3 * (i - shape.impact) as f64 / tail
    }
}

pub fn swing_detection(shape: &SwingShape, i: usize) -> Detection {
    let v = shape.visibility;
    let at = |x: f64, y: f64| Position::new(x, y, 0.0, v);
    let y = wrist_y(shape, i);
    let wx = 0.5 + 0.15 * (0.75 - y);
    let sway = if i % 2 == 1 { shape.hip_sway } else { 0.0 };

    Detection::new()
        .with(Landmark::Nose, at(0.5, 0.2))
        .with(Landmark::LeftShoulder, at(0.55, 0.35))
        .with(Landmark::RightShoulder, at(0.45, 0.35))
        .with(Landmark::LeftElbow, at((0.55 + wx + 0.02) / 2.0 + 0.03, (0.35 + y + 0.01) / 2.0))
        .with(Landmark::RightElbow, at((0.45 + wx) / 2.0 + 0.03, (0.35 + y) / 2.0))
        .with(Landmark::LeftWrist, at(wx + 0.02, y + 0.01))
        .with(Landmark::RightWrist, at(wx, y))
        .with(Landmark::LeftHip, at(0.54 + sway, 0.6))
        .with(Landmark::RightHip, at(0.46 + sway, 0.6))
        .with(Landmark::LeftKnee, at(0.54, 0.75))
        .with(Landmark::RightKnee, at(0.46, 0.75))
        .with(Landmark::LeftAnkle, at(0.55, 0.9))
        .with(Landmark::RightAnkle, at(0.45, 0.9))
}

pub fn swing_detections(shape: &SwingShape) -> Vec<Option<Detection>> {
    (0..shape.frames)
        .map(|i| Some(swing_detection(shape, i)))
        .collect()
}

pub fn swing_observations(shape: &SwingShape) -> Vec<Observation> {
    frame::observations_from_detections(swing_detections(shape), shape.fps)
}

pub fn swing_frames(shape: &SwingShape) -> Vec<PoseFrame> {
    (0..shape.frames)
        .filter_map(|i| {
            frame::build_frame(&swing_detection(shape, i), i as u32, i as f64 / shape.fps)
        })
        .collect()
}

/// A frame holding exactly the given landmarks, timestamped at 30 fps.
pub fn frame_with(i: usize, points: &[(Landmark, Position)]) -> PoseFrame {
    let landmarks: BTreeMap<Landmark, Position> = points.iter().copied().collect();
    PoseFrame {
        frame_index: i as u32,
        timestamp: i as f64 / 30.0,
        angles: frame::compute_angles(&landmarks),
        landmarks,
    }
}
