//! Annotation data for drawing a swing.
//!
//! Rendering is left to the caller; this module only says what to draw and
//! where, in pixel coordinates.

use std::fmt;

use crate::frame::{AngleName, PoseFrame};
use crate::geometry::{self, Point};
use crate::landmark::Landmark;
use crate::phase::Segmentation;

/// Skeleton bones drawn between golf landmarks.
pub const CONNECTIONS: [(Landmark, Landmark); 12] = [
    (Landmark::LeftShoulder, Landmark::RightShoulder),
    (Landmark::LeftShoulder, Landmark::LeftElbow),
    (Landmark::LeftElbow, Landmark::LeftWrist),
    (Landmark::RightShoulder, Landmark::RightElbow),
    (Landmark::RightElbow, Landmark::RightWrist),
    (Landmark::LeftShoulder, Landmark::LeftHip),
    (Landmark::RightShoulder, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::RightHip),
    (Landmark::LeftHip, Landmark::LeftKnee),
    (Landmark::LeftKnee, Landmark::LeftAnkle),
    (Landmark::RightHip, Landmark::RightKnee),
    (Landmark::RightKnee, Landmark::RightAnkle),
];

/// Joints highlighted on top of the skeleton.
pub const KEY_POINTS: [Landmark; 8] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftElbow,
    Landmark::RightElbow,
    Landmark::LeftWrist,
    Landmark::RightWrist,
    Landmark::LeftHip,
    Landmark::RightHip,
];

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segment {
    pub from: Landmark,
    pub to: Landmark,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeyPoint {
    pub landmark: Landmark,
    pub at: Point,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AngleLabel {
    pub angle: AngleName,
    pub degrees: f64,
    /// e.g. `"Left Arm: 165.2°"`.
    pub text: String,
    /// Joint the angle is measured at.
    pub anchor: Point,
}

/// Everything to draw on one frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FrameOverlay {
    pub frame_index: u32,
    pub segments: Vec<Segment>,
    pub key_points: Vec<KeyPoint>,
    pub labels: Vec<AngleLabel>,
}

/// Scale normalized landmark coordinates to a `width`×`height` image.
pub fn overlay(frame: &PoseFrame, width: u32, height: u32) -> FrameOverlay {
    let px = |lm: Landmark| {
        frame
            .point(lm)
            .map(|p| Point::new(p.x * f64::from(width), p.y * f64::from(height)))
    };

    let segments = CONNECTIONS
        .iter()
        .filter_map(|&(from, to)| {
            Some(Segment {
                from,
                to,
                start: px(from)?,
                end: px(to)?,
            })
        })
        .collect();

    let key_points = KEY_POINTS
        .iter()
        .filter_map(|&landmark| Some(KeyPoint { landmark, at: px(landmark)? }))
        .collect();

    let labels = frame
        .angles
        .iter()
        .filter_map(|(&angle, &degrees)| {
            let anchor = match angle {
                AngleName::LeftArm => px(Landmark::LeftElbow)?,
                AngleName::RightArm => px(Landmark::RightElbow)?,
                AngleName::SpineTilt => {
                    geometry::midpoint(px(Landmark::LeftShoulder)?, px(Landmark::RightShoulder)?)
                }
                AngleName::LeftKnee => px(Landmark::LeftKnee)?,
                AngleName::RightKnee => px(Landmark::RightKnee)?,
            };
            Some(AngleLabel {
                angle,
                degrees,
                text: format!("{}: {degrees:.1}°", angle.label()),
                anchor,
            })
        })
        .collect();

    FrameOverlay {
        frame_index: frame.frame_index,
        segments,
        key_points,
        labels,
    }
}

// ---------------------------------------------------------------------------
// Key frames
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum KeyFrameKind {
    Address,
    Top,
    Impact,
    Finish,
}

impl fmt::Display for KeyFrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Address => "address",
            Self::Top => "top",
            Self::Impact => "impact",
            Self::Finish => "finish",
        })
    }
}

/// A frame worth showing on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeyFrame {
    pub kind: KeyFrameKind,
    /// Index into the surviving frame sequence.
    pub sequence_index: usize,
    /// Index in the source video.
    pub frame_index: u32,
    pub timestamp: f64,
}

/// Address, top, impact and finish, in that order.
pub fn key_frames(segmentation: &Segmentation, frames: &[PoseFrame]) -> Vec<KeyFrame> {
    let Some(last) = frames.len().checked_sub(1) else {
        return Vec::new();
    };
    [
        (KeyFrameKind::Address, 0),
        (KeyFrameKind::Top, segmentation.top_index),
        (KeyFrameKind::Impact, segmentation.impact_index),
        (KeyFrameKind::Finish, last),
    ]
    .into_iter()
    .filter_map(|(kind, i)| {
        let f = frames.get(i)?;
        Some(KeyFrame {
            kind,
            sequence_index: i,
            frame_index: f.frame_index,
            timestamp: f.timestamp,
        })
    })
    .collect()
}
