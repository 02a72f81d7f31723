//! Landmark frame model and the pose source boundary.
//!
//! A [`PoseFrame`] is built once per frame in which the pose source found a
//! body. Frames without a detection are dropped, never stored as
//! placeholders, so the surviving sequence is dense and each entry carries
//! its original `frame_index`.

use std::collections::BTreeMap;
use std::fmt;

use tracing::warn;

use crate::config::DEFAULT_FPS;
use crate::geometry::{self, Point};
use crate::landmark::{Landmark, Position};

/// Distance above the shoulder midpoint of the synthetic vertical reference
/// used for spine tilt. Only the direction matters, so it works for both
/// normalized and pixel coordinates.
pub const SPINE_REFERENCE_OFFSET: f64 = 0.1;

// ---------------------------------------------------------------------------
// Angle names
// ---------------------------------------------------------------------------

/// Joint angles computed on every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum AngleName {
    /// Left shoulder–elbow–wrist, at the elbow.
    LeftArm,
    /// Right shoulder–elbow–wrist, at the elbow.
    RightArm,
    /// Hip midpoint–shoulder midpoint–vertical reference, at the shoulders.
    /// 180° is an upright torso.
    SpineTilt,
    /// Left hip–knee–ankle, at the knee.
    LeftKnee,
    /// Right hip–knee–ankle, at the knee.
    RightKnee,
}

impl AngleName {
    pub const ALL: [AngleName; 5] = [
        Self::LeftArm,
        Self::RightArm,
        Self::SpineTilt,
        Self::LeftKnee,
        Self::RightKnee,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::LeftArm => "left_arm",
            Self::RightArm => "right_arm",
            Self::SpineTilt => "spine_tilt",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
        }
    }

    /// Human-readable label for overlays ("Left Arm").
    pub fn label(self) -> &'static str {
        match self {
            Self::LeftArm => "Left Arm",
            Self::RightArm => "Right Arm",
            Self::SpineTilt => "Spine Tilt",
            Self::LeftKnee => "Left Knee",
            Self::RightKnee => "Right Knee",
        }
    }
}

impl fmt::Display for AngleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Raw output of the pose source for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    landmarks: BTreeMap<Landmark, Position>,
}

impl Detection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the detector's indexed output. Entry `i` is landmark `i`;
    /// entries past the vocabulary are ignored.
    pub fn from_indexed(points: &[Position]) -> Self {
        points
            .iter()
            .enumerate()
            .filter_map(|(i, p)| Landmark::from_index(i).map(|lm| (lm, *p)))
            .collect()
    }

    /// Add or replace one landmark (builder style).
    pub fn with(mut self, landmark: Landmark, position: Position) -> Self {
        self.insert(landmark, position);
        self
    }

    pub fn insert(&mut self, landmark: Landmark, position: Position) {
        self.landmarks.insert(landmark, position);
    }

    pub fn get(&self, landmark: Landmark) -> Option<&Position> {
        self.landmarks.get(&landmark)
    }

    pub fn len(&self) -> usize {
        self.landmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landmarks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Landmark, &Position)> {
        self.landmarks.iter().map(|(lm, p)| (*lm, p))
    }
}

impl FromIterator<(Landmark, Position)> for Detection {
    fn from_iter<I: IntoIterator<Item = (Landmark, Position)>>(iter: I) -> Self {
        Self {
            landmarks: iter.into_iter().collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// PoseFrame
// ---------------------------------------------------------------------------

/// One detected frame: the golf landmark subset plus derived joint angles.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoseFrame {
    /// Index of the frame in the source video (gaps mark dropped frames).
    pub frame_index: u32,
    /// Seconds from the start of the video.
    pub timestamp: f64,
    pub landmarks: BTreeMap<Landmark, Position>,
    /// Degrees. An angle is absent if any of its landmarks was not detected.
    pub angles: BTreeMap<AngleName, f64>,
}

impl PoseFrame {
    pub fn landmark(&self, landmark: Landmark) -> Option<&Position> {
        self.landmarks.get(&landmark)
    }

    pub fn point(&self, landmark: Landmark) -> Option<Point> {
        self.landmark(landmark).map(Point::from)
    }

    pub fn angle(&self, name: AngleName) -> Option<f64> {
        self.angles.get(&name).copied()
    }

    /// Midpoint of two landmarks, if both were detected.
    pub fn midpoint(&self, a: Landmark, b: Landmark) -> Option<Point> {
        Some(geometry::midpoint(self.point(a)?, self.point(b)?))
    }

    /// Number of retained landmarks above the visibility threshold.
    pub fn visible_count(&self, threshold: f64) -> usize {
        self.landmarks
            .values()
            .filter(|p| p.is_visible(threshold))
            .count()
    }
}

/// Normalize one detection into a [`PoseFrame`].
///
/// Returns `None` when the detection carries none of the golf landmarks;
/// such a frame is dropped like a frame without detection.
pub fn build_frame(detection: &Detection, frame_index: u32, timestamp: f64) -> Option<PoseFrame> {
    let landmarks: BTreeMap<Landmark, Position> = detection
        .iter()
        .filter(|(lm, _)| lm.is_golf_relevant())
        .map(|(lm, p)| (lm, *p))
        .collect();
    if landmarks.is_empty() {
        return None;
    }
    let angles = compute_angles(&landmarks);
    Some(PoseFrame {
        frame_index,
        timestamp,
        landmarks,
        angles,
    })
}

/// Compute every angle whose landmarks are all present.
pub fn compute_angles(landmarks: &BTreeMap<Landmark, Position>) -> BTreeMap<AngleName, f64> {
    let pt = |lm: Landmark| landmarks.get(&lm).map(Point::from);
    let joint = |a: Landmark, b: Landmark, c: Landmark| {
        Some(geometry::angle_at(pt(a)?, pt(b)?, pt(c)?))
    };

    let mut angles = BTreeMap::new();
    let mut put = |name: AngleName, value: Option<f64>| {
        if let Some(v) = value {
            angles.insert(name, v);
        }
    };

    put(
        AngleName::LeftArm,
        joint(Landmark::LeftShoulder, Landmark::LeftElbow, Landmark::LeftWrist),
    );
    put(
        AngleName::RightArm,
        joint(Landmark::RightShoulder, Landmark::RightElbow, Landmark::RightWrist),
    );
    put(AngleName::SpineTilt, spine_tilt(&pt));
    put(
        AngleName::LeftKnee,
        joint(Landmark::LeftHip, Landmark::LeftKnee, Landmark::LeftAnkle),
    );
    put(
        AngleName::RightKnee,
        joint(Landmark::RightHip, Landmark::RightKnee, Landmark::RightAnkle),
    );
    angles
}

/// Spine tilt against a derived reference point directly above the shoulder
/// midpoint (not a detected joint).
fn spine_tilt(pt: &impl Fn(Landmark) -> Option<Point>) -> Option<f64> {
    let hips = geometry::midpoint(pt(Landmark::LeftHip)?, pt(Landmark::RightHip)?);
    let shoulders = geometry::midpoint(pt(Landmark::LeftShoulder)?, pt(Landmark::RightShoulder)?);
    let vertical_ref = Point::new(shoulders.x, shoulders.y - SPINE_REFERENCE_OFFSET);
    Some(geometry::angle_at(hips, shoulders, vertical_ref))
}

// ---------------------------------------------------------------------------
// Observations
// ---------------------------------------------------------------------------

/// One input frame: where it sits in the video and what the pose source saw.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub frame_index: u32,
    pub timestamp: f64,
    /// `None` when the pose source found no body in this frame.
    pub detection: Option<Detection>,
}

/// Frame rate to use for timestamps: `fps` if it is usable, else [`DEFAULT_FPS`].
pub fn effective_fps(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        warn!(fps, fallback = DEFAULT_FPS, "unusable frame rate, assuming default");
        DEFAULT_FPS
    }
}

/// Number detections in order and timestamp them at `fps`.
///
/// Frame indices are `u32`; detections past index `u32::MAX` are dropped.
pub fn observations_from_detections<I>(detections: I, fps: f64) -> Vec<Observation>
where
    I: IntoIterator<Item = Option<Detection>>,
{
    number_detections(detections, effective_fps(fps), 0)
}

fn number_detections<I>(detections: I, fps: f64, first: u32) -> Vec<Observation>
where
    I: IntoIterator<Item = Option<Detection>>,
{
    let observations: Vec<Observation> = (first..=u32::MAX)
        .zip(detections)
        .map(|(frame_index, detection)| Observation {
            frame_index,
            timestamp: f64::from(frame_index) / fps,
            detection,
        })
        .collect();
    if observations.last().is_some_and(|o| o.frame_index == u32::MAX) {
        warn!("frame index space exhausted, later detections dropped");
    }
    observations
}

// ---------------------------------------------------------------------------
// Pose source boundary
// ---------------------------------------------------------------------------

/// An external body-pose detector.
///
/// Implementations wrap a model handle. The extractor owns the source for
/// its whole lifetime and releases it on drop; nothing is global.
pub trait PoseSource {
    /// Whatever the detector consumes (decoded image, tensor, ...).
    type Image: ?Sized;

    /// Detect a body in one image, or `None` if there is none.
    fn detect(&mut self, image: &Self::Image) -> Option<Detection>;
}

/// Runs a [`PoseSource`] over consecutive video frames.
///
/// One call per frame, so a caller that needs cancellation can stop between
/// frames.
pub struct FrameExtractor<S> {
    source: S,
    fps: f64,
    next_index: u32,
}

impl<S: PoseSource> FrameExtractor<S> {
    pub fn new(source: S, fps: f64) -> Self {
        Self {
            source,
            fps: effective_fps(fps),
            next_index: 0,
        }
    }

    /// Detect on the next frame of the video.
    pub fn observe(&mut self, image: &S::Image) -> Observation {
        let frame_index = self.next_index;
        self.next_index += 1;
        Observation {
            frame_index,
            timestamp: f64::from(frame_index) / self.fps,
            detection: self.source.detect(image),
        }
    }

    /// Detect on every remaining frame.
    pub fn observe_all<'a, I>(&mut self, images: I) -> Vec<Observation>
    where
        I: IntoIterator<Item = &'a S::Image>,
        S::Image: 'a,
    {
        images.into_iter().map(|img| self.observe(img)).collect()
    }

    /// Frames observed so far.
    pub fn frames_seen(&self) -> u32 {
        self.next_index
    }

    /// Give the source back, e.g. to reuse it on another video.
    pub fn into_source(self) -> S {
        self.source
    }
}
