//! Body landmark vocabulary.
//!
//! The pose source reports 33 points in a fixed index order. Indices and
//! names match the order the detector emits them in; only the golf-relevant
//! subset ([`GOLF_LANDMARKS`]) is retained on a [`PoseFrame`](crate::PoseFrame).

use std::fmt;
use std::str::FromStr;

/// A named anatomical point tracked by the pose source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum Landmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

/// Number of points in the detector vocabulary.
pub const LANDMARK_COUNT: usize = 33;

/// Landmarks retained on each frame: everything the golf angles, hip/shoulder
/// metrics, wrist trajectory and overlay need.
pub const GOLF_LANDMARKS: [Landmark; 12] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftElbow,
    Landmark::RightElbow,
    Landmark::LeftWrist,
    Landmark::RightWrist,
    Landmark::LeftHip,
    Landmark::RightHip,
    Landmark::LeftKnee,
    Landmark::RightKnee,
    Landmark::LeftAnkle,
    Landmark::RightAnkle,
];

impl Landmark {
    /// All landmarks in detector index order.
    pub const ALL: [Landmark; LANDMARK_COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Look up a landmark by its detector index. `None` past the vocabulary.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }

    /// Whether this landmark is kept on a [`PoseFrame`](crate::PoseFrame).
    pub fn is_golf_relevant(self) -> bool {
        GOLF_LANDMARKS.contains(&self)
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Landmark {
    type Err = UnknownLandmark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnknownLandmark(s.to_string()))
    }
}

/// Returned by [`Landmark::from_str`] for names outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown landmark name {0:?}")]
pub struct UnknownLandmark(pub String);

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// One observed landmark position.
///
/// `x`/`y` are normalized to the frame (0..1) or pixel-scaled; a single run
/// must use one convention throughout. `y` grows downward (screen space).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Relative depth as reported by the detector; unused by the 2-D metrics.
    pub z: f64,
    /// Detector confidence that the point is visible (0..1).
    pub visibility: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    /// A fully visible point on the image plane.
    pub fn visible(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 1.0)
    }

    pub fn is_visible(&self, threshold: f64) -> bool {
        self.visibility > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for lm in Landmark::ALL {
            assert_eq!(Landmark::from_index(lm.index()), Some(lm));
        }
        assert_eq!(Landmark::from_index(LANDMARK_COUNT), None);
    }

    #[test]
    fn names_parse_back() {
        for lm in Landmark::ALL {
            assert_eq!(lm.as_str().parse::<Landmark>().unwrap(), lm);
        }
        assert!("left_toe".parse::<Landmark>().is_err());
    }

    #[test]
    fn golf_subset() {
        assert!(Landmark::RightWrist.is_golf_relevant());
        assert!(Landmark::LeftAnkle.is_golf_relevant());
        assert!(!Landmark::Nose.is_golf_relevant());
        assert!(!Landmark::LeftHeel.is_golf_relevant());
    }

    #[test]
    fn visibility_threshold_is_strict() {
        let p = Position::new(0.5, 0.5, 0.0, 0.5);
        assert!(!p.is_visible(0.5));
        assert!(Position::visible(0.1, 0.2).is_visible(0.5));
    }
}
