//! Threshold-driven coaching feedback.
//!
//! Rules run in a fixed order and each adds at most one sentence:
//! club delivery (when the caller supplies it), tempo, body angles, lower
//! body stability, pose tracking quality. The list is then topped up from
//! [`GENERIC_ADVICE`] to [`MIN_RECOMMENDATIONS`] and cut to
//! [`MAX_RECOMMENDATIONS`].

use crate::config::AnalysisConfig;
use crate::frame::AngleName;
use crate::metrics::SequenceMetrics;

pub const MIN_RECOMMENDATIONS: usize = 3;
pub const MAX_RECOMMENDATIONS: usize = 6;

pub const PATH_LIMIT_DEG: f64 = 3.0;
pub const ATTACK_TOO_STEEP_DEG: f64 = -6.0;
pub const ATTACK_TOO_SHALLOW_DEG: f64 = -2.0;
pub const TEMPO_TOO_QUICK: f64 = 2.0;
pub const TEMPO_TOO_SLOW: f64 = 4.0;
pub const SPINE_RANGE_LIMIT: f64 = 20.0;
pub const ARM_RANGE_MISMATCH: f64 = 15.0;
pub const HIP_MOVEMENT_LIMIT: f64 = 0.1;

pub const PATH_OUTSIDE: &str = "Work on swing path - coming too much from outside";
pub const PATH_INSIDE: &str = "Swing path is too inside - work on takeaway";
pub const ATTACK_STEEP: &str = "Try to hit up on the ball more - too steep";
pub const ATTACK_SHALLOW: &str = "Steepen your attack angle slightly";
pub const TEMPO_QUICK: &str =
    "Your swing is too quick - try slowing down your backswing for better tempo";
pub const TEMPO_SLOW: &str =
    "Your backswing is too slow - try to create more rhythm between backswing and downswing";
pub const TEMPO_GOOD: &str = "Good swing tempo - maintain this rhythm";
pub const SPINE_ANGLE: &str =
    "Try to maintain spine angle throughout the swing - excessive movement can affect consistency";
pub const ARM_SYNC: &str =
    "Work on arm synchronization - both arms should move more similarly throughout the swing";
pub const LOWER_BODY: &str =
    "Focus on maintaining stable lower body - excessive hip movement can affect balance";
pub const TRACKING: &str =
    "Pose tracking was unreliable - record in good light with your whole body in frame";
pub const ALL_GOOD: &str =
    "Overall swing mechanics look good - continue practicing to maintain consistency";

/// Filler used to reach the minimum count, in this order.
pub const GENERIC_ADVICE: [&str; 4] = [
    "Consider working with a golf professional for advanced techniques",
    "Record from a side-on angle with the whole body in frame for the most accurate analysis",
    "Practice with alignment sticks to groove a consistent setup",
    "Film your swing regularly to track progress over time",
];

/// Club delivery numbers from an external source such as a launch monitor.
/// Pose data alone cannot produce them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClubMetrics {
    /// Positive is out-to-in.
    pub club_path_deg: Option<f64>,
    /// Negative is descending.
    pub attack_angle_deg: Option<f64>,
}

#[derive(Default)]
struct Feedback {
    lines: Vec<String>,
    issues: usize,
}

impl Feedback {
    fn issue(&mut self, line: &str) {
        self.issues += 1;
        self.note(line);
    }

    fn note(&mut self, line: &str) {
        if !self.lines.iter().any(|l| l == line) {
            self.lines.push(line.to_string());
        }
    }
}

/// Ordered, de-duplicated feedback; between 3 and 6 entries.
pub fn recommend(
    metrics: &SequenceMetrics,
    club: Option<&ClubMetrics>,
    config: &AnalysisConfig,
) -> Vec<String> {
    let mut fb = Feedback::default();

    if let Some(club) = club {
        match club.club_path_deg {
            Some(p) if p > PATH_LIMIT_DEG => fb.issue(PATH_OUTSIDE),
            Some(p) if p < -PATH_LIMIT_DEG => fb.issue(PATH_INSIDE),
            _ => {}
        }
        match club.attack_angle_deg {
            Some(a) if a < ATTACK_TOO_STEEP_DEG => fb.issue(ATTACK_STEEP),
            Some(a) if a > ATTACK_TOO_SHALLOW_DEG => fb.issue(ATTACK_SHALLOW),
            _ => {}
        }
    }

    match metrics.tempo_ratio {
        Some(t) if t < TEMPO_TOO_QUICK => fb.issue(TEMPO_QUICK),
        Some(t) if t > TEMPO_TOO_SLOW => fb.issue(TEMPO_SLOW),
        Some(_) => fb.note(TEMPO_GOOD),
        None => {}
    }

    let range = |name: AngleName| metrics.angles.get(&name).map(|s| s.range);
    if range(AngleName::SpineTilt).is_some_and(|r| r > SPINE_RANGE_LIMIT) {
        fb.issue(SPINE_ANGLE);
    }
    if let (Some(left), Some(right)) = (range(AngleName::LeftArm), range(AngleName::RightArm)) {
        if (left - right).abs() > ARM_RANGE_MISMATCH {
            fb.issue(ARM_SYNC);
        }
    }

    if metrics
        .hip_stability
        .is_some_and(|h| h.total_movement > HIP_MOVEMENT_LIMIT)
    {
        fb.issue(LOWER_BODY);
    }

    if metrics.pose_tracking_quality < config.tracking_advice_threshold {
        fb.issue(TRACKING);
    }

    if fb.issues == 0 {
        fb.note(ALL_GOOD);
    }
    for generic in GENERIC_ADVICE {
        if fb.lines.len() >= MIN_RECOMMENDATIONS {
            break;
        }
        fb.note(generic);
    }
    fb.lines.truncate(MAX_RECOMMENDATIONS);
    fb.lines
}
