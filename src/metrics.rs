//! Metric aggregation over the frame sequence and over each phase.
//!
//! Every metric that needs samples is an `Option`: an empty sample set is
//! reported as absent, never as zero.

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::frame::{AngleName, PoseFrame};
use crate::geometry::{self, Point};
use crate::landmark::{GOLF_LANDMARKS, Landmark};
use crate::phase::{Phase, PhaseName, Segmentation};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Summary of one angle over a scope. Degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AngleStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub range: f64,
    pub samples: usize,
}

impl AngleStats {
    /// `None` for an empty slice.
    pub fn from_samples(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            min,
            max,
            mean,
            std_dev: var.sqrt(),
            range: max - min,
            samples: values.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PhaseMetrics {
    pub phase: PhaseName,
    pub start_frame: usize,
    pub end_frame: usize,
    pub frame_count: usize,
    /// Seconds from the first to the last frame of the phase.
    pub duration: f64,
    pub angles: BTreeMap<AngleName, AngleStats>,
}

/// Frame-to-frame displacement of the hip midpoint, in landmark units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HipStability {
    pub avg_movement: f64,
    pub max_movement: f64,
    pub total_movement: f64,
}

/// Tracked wrist speed in landmark units per second.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WristSpeed {
    pub max: f64,
    pub avg: f64,
}

/// Whole-sequence metrics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SequenceMetrics {
    pub angles: BTreeMap<AngleName, AngleStats>,
    /// Backswing over downswing duration; absent unless the downswing took time.
    pub tempo_ratio: Option<f64>,
    pub backswing_duration: Option<f64>,
    pub downswing_duration: Option<f64>,
    /// Mean fraction of visible landmarks per frame (0..1).
    pub pose_tracking_quality: f64,
    pub hip_stability: Option<HipStability>,
    /// Degrees the shoulder line turned through.
    pub shoulder_rotation_range: Option<f64>,
    pub wrist_speed: Option<WristSpeed>,
    pub frames_analyzed: usize,
    /// Frames in which every golf landmark was detected.
    pub frames_with_full_pose: usize,
    /// Surviving frames over the video's frame count.
    pub detection_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Angle statistics
// ---------------------------------------------------------------------------

/// Statistics for every angle present in at least one frame.
pub fn angle_stats(frames: &[PoseFrame]) -> BTreeMap<AngleName, AngleStats> {
    let mut samples: BTreeMap<AngleName, Vec<f64>> = BTreeMap::new();
    for f in frames {
        for (&name, &value) in &f.angles {
            samples.entry(name).or_default().push(value);
        }
    }
    samples
        .into_iter()
        .filter_map(|(name, values)| Some((name, AngleStats::from_samples(&values)?)))
        .collect()
}

pub fn phase_metrics(frames: &[PoseFrame], phase: &Phase) -> PhaseMetrics {
    let scope = phase.frames(frames);
    let duration = match (scope.first(), scope.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0.0,
    };
    PhaseMetrics {
        phase: phase.name,
        start_frame: phase.start_frame,
        end_frame: phase.end_frame,
        frame_count: phase.len(),
        duration,
        angles: angle_stats(scope),
    }
}

/// Metrics for each phase of `segmentation`, keyed by phase name.
pub fn per_phase(
    frames: &[PoseFrame],
    segmentation: &Segmentation,
) -> BTreeMap<PhaseName, PhaseMetrics> {
    segmentation
        .phases
        .iter()
        .map(|p| (p.name, phase_metrics(frames, p)))
        .collect()
}

// ---------------------------------------------------------------------------
// Sequence metrics
// ---------------------------------------------------------------------------

/// `(tempo_ratio, backswing, downswing)` in seconds.
pub fn tempo(frames: &[PoseFrame], segmentation: &Segmentation) -> (Option<f64>, f64, f64) {
    let at = |i: usize| frames.get(i).map_or(0.0, |f| f.timestamp);
    let start = frames.first().map_or(0.0, |f| f.timestamp);
    let backswing = at(segmentation.top_index) - start;
    let downswing = at(segmentation.impact_index) - at(segmentation.top_index);
    let ratio = (downswing > 0.0).then(|| backswing / downswing);
    (ratio, backswing, downswing)
}

/// Mean over frames of the share of landmarks above `threshold` visibility.
/// Frames without landmarks do not count; with none at all the result is 0.
pub fn pose_tracking_quality(frames: &[PoseFrame], threshold: f64) -> f64 {
    let shares: Vec<f64> = frames
        .iter()
        .filter(|f| !f.landmarks.is_empty())
        .map(|f| f.visible_count(threshold) as f64 / f.landmarks.len() as f64)
        .collect();
    if shares.is_empty() {
        0.0
    } else {
        shares.iter().sum::<f64>() / shares.len() as f64
    }
}

/// Needs at least two frames with both hips.
pub fn hip_stability(frames: &[PoseFrame]) -> Option<HipStability> {
    let centers: Vec<Point> = frames
        .iter()
        .filter_map(|f| f.midpoint(Landmark::LeftHip, Landmark::RightHip))
        .collect();
    let moves: Vec<f64> = centers
        .windows(2)
        .map(|w| geometry::distance(w[0], w[1]))
        .collect();
    if moves.is_empty() {
        return None;
    }
    let total: f64 = moves.iter().sum();
    Some(HipStability {
        avg_movement: total / moves.len() as f64,
        max_movement: moves.iter().copied().fold(0.0, f64::max),
        total_movement: total,
    })
}

/// Range of the right→left shoulder line heading over frames where both
/// shoulders are visible.
pub fn shoulder_rotation_range(frames: &[PoseFrame], threshold: f64) -> Option<f64> {
    let visible = |f: &PoseFrame, lm: Landmark| {
        f.landmark(lm)
            .filter(|p| p.is_visible(threshold))
            .map(Point::from)
    };
    let headings: Vec<f64> = frames
        .iter()
        .filter_map(|f| {
            let right = visible(f, Landmark::RightShoulder)?;
            let left = visible(f, Landmark::LeftShoulder)?;
            Some(geometry::line_angle(right, left))
        })
        .collect();
    let unwrapped = geometry::unwrap_degrees(&headings);
    AngleStats::from_samples(&unwrapped).map(|s| s.range)
}

/// Speed of `wrist` between consecutive frames that both carry it.
pub fn wrist_speed(frames: &[PoseFrame], wrist: Landmark) -> Option<WristSpeed> {
    let track: Vec<(f64, Point)> = frames
        .iter()
        .filter_map(|f| Some((f.timestamp, f.point(wrist)?)))
        .collect();
    let speeds: Vec<f64> = track
        .windows(2)
        .filter_map(|w| {
            let dt = w[1].0 - w[0].0;
            (dt > 0.0).then(|| geometry::distance(w[0].1, w[1].1) / dt)
        })
        .collect();
    if speeds.is_empty() {
        return None;
    }
    Some(WristSpeed {
        max: speeds.iter().copied().fold(0.0, f64::max),
        avg: speeds.iter().sum::<f64>() / speeds.len() as f64,
    })
}

pub fn has_full_pose(frame: &PoseFrame) -> bool {
    GOLF_LANDMARKS.iter().all(|lm| frame.landmarks.contains_key(lm))
}

/// Aggregate the whole sequence.
///
/// Without a segmentation the tempo figures are absent. `total_frames` is
/// the video's frame count, used for the detection rate.
pub fn aggregate(
    frames: &[PoseFrame],
    segmentation: Option<&Segmentation>,
    total_frames: Option<usize>,
    config: &AnalysisConfig,
) -> SequenceMetrics {
    let (tempo_ratio, backswing_duration, downswing_duration) = match segmentation {
        Some(seg) => {
            let (ratio, back, down) = tempo(frames, seg);
            (ratio, Some(back), Some(down))
        }
        None => (None, None, None),
    };
    let wrist = segmentation
        .and_then(|s| s.tracked_wrist)
        .unwrap_or(config.handedness.trailing_wrist());

    SequenceMetrics {
        angles: angle_stats(frames),
        tempo_ratio,
        backswing_duration,
        downswing_duration,
        pose_tracking_quality: pose_tracking_quality(frames, config.visibility_threshold),
        hip_stability: hip_stability(frames),
        shoulder_rotation_range: shoulder_rotation_range(frames, config.visibility_threshold),
        wrist_speed: wrist_speed(frames, wrist),
        frames_analyzed: frames.len(),
        frames_with_full_pose: frames.iter().filter(|f| has_full_pose(f)).count(),
        detection_rate: total_frames
            .filter(|&t| t > 0)
            .map(|t| frames.len() as f64 / t as f64),
    }
}
