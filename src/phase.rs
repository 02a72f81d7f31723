//! Swing phase segmentation.
//!
//! Partitions the surviving frame sequence into contiguous named phases.
//! Two methods:
//!
//! 1. **Trajectory**: finds the top of the backswing (highest trailing-wrist
//!    point) and impact (fastest vertical wrist movement shortly after the
//!    top), then lays the phases around those two frames.
//! 2. **Proportional**: fixed fractional windows of the sequence, used when
//!    the wrist was seen in too few frames.
//!
//! Either way the phases cover `[0, N-1]` with no gaps or overlaps. A phase
//! whose window would be empty is left out.

use std::fmt;

use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::frame::PoseFrame;
use crate::landmark::Landmark;

// ---------------------------------------------------------------------------
// Phase names and layouts
// ---------------------------------------------------------------------------

/// A named stage of the swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PhaseName {
    Address,
    Takeaway,
    Backswing,
    Top,
    Downswing,
    Impact,
    FollowThrough,
}

impl PhaseName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Address => "address",
            Self::Takeaway => "takeaway",
            Self::Backswing => "backswing",
            Self::Top => "top",
            Self::Downswing => "downswing",
            Self::Impact => "impact",
            Self::FollowThrough => "follow_through",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Proportional start fractions for [`PhaseLayout::Standard`].
pub const STANDARD_FRACTIONS: [f64; 5] = [0.0, 0.15, 0.45, 0.55, 0.75];
/// Proportional start fractions for [`PhaseLayout::Detailed`].
pub const DETAILED_FRACTIONS: [f64; 7] = [0.0, 0.10, 0.20, 0.35, 0.45, 0.70, 0.80];

/// Which set of phase names to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PhaseLayout {
    /// Address, backswing, top, downswing (through impact), follow-through.
    #[default]
    Standard,
    /// Adds a takeaway before the backswing and a one-frame impact phase.
    Detailed,
}

impl PhaseLayout {
    pub fn names(self) -> &'static [PhaseName] {
        match self {
            Self::Standard => &[
                PhaseName::Address,
                PhaseName::Backswing,
                PhaseName::Top,
                PhaseName::Downswing,
                PhaseName::FollowThrough,
            ],
            Self::Detailed => &[
                PhaseName::Address,
                PhaseName::Takeaway,
                PhaseName::Backswing,
                PhaseName::Top,
                PhaseName::Downswing,
                PhaseName::Impact,
                PhaseName::FollowThrough,
            ],
        }
    }

    /// Start of each phase as a fraction of the sequence, parallel to [`names`](Self::names).
    pub fn fractions(self) -> &'static [f64] {
        match self {
            Self::Standard => &STANDARD_FRACTIONS,
            Self::Detailed => &DETAILED_FRACTIONS,
        }
    }

    /// Fraction at which the top phase starts; the pre-top phases share
    /// `[0, top)` in proportion to their own fractions.
    fn top_fraction(self) -> f64 {
        self.names()
            .iter()
            .zip(self.fractions())
            .find(|(name, _)| **name == PhaseName::Top)
            .map_or(1.0, |(_, f)| *f)
    }
}

// ---------------------------------------------------------------------------
// Segmentation output
// ---------------------------------------------------------------------------

/// A contiguous run of frames, bounds inclusive, indexing the surviving
/// frame sequence (not the original video).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Phase {
    pub name: PhaseName,
    pub start_frame: usize,
    pub end_frame: usize,
}

impl Phase {
    pub fn len(&self) -> usize {
        self.end_frame - self.start_frame + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start_frame..=self.end_frame).contains(&index)
    }

    /// The frames this phase covers.
    pub fn frames<'a>(&self, frames: &'a [PoseFrame]) -> &'a [PoseFrame] {
        &frames[self.start_frame..=self.end_frame]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SegmentationMethod {
    Trajectory,
    Proportional,
}

/// Phases plus the key frames they were laid out from.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Segmentation {
    pub phases: Vec<Phase>,
    pub method: SegmentationMethod,
    /// Sequence index of the top of the backswing.
    pub top_index: usize,
    /// Sequence index of impact (`>= top_index`).
    pub impact_index: usize,
    /// Wrist that supplied most trajectory samples, if any was seen.
    pub tracked_wrist: Option<Landmark>,
    /// Frames in which a wrist was available.
    pub wrist_samples: usize,
}

impl Segmentation {
    pub fn phase(&self, name: PhaseName) -> Option<&Phase> {
        self.phases.iter().find(|p| p.name == name)
    }
}

// ---------------------------------------------------------------------------
// Segmenter
// ---------------------------------------------------------------------------

/// One wrist observation on the trajectory.
#[derive(Debug, Clone, Copy)]
struct WristSample {
    /// Index into the surviving frame sequence.
    frame: usize,
    y: f64,
}

/// Segment `frames` into phases.
///
/// Fails only when fewer than `config.min_frames` frames survived.
pub fn segment(frames: &[PoseFrame], config: &AnalysisConfig) -> Result<Segmentation> {
    let n = frames.len();
    let need = config.min_frames.max(1);
    if n < need {
        return Err(AnalysisError::insufficient(n, need));
    }

    let (samples, tracked_wrist) = wrist_trajectory(frames, config);
    let seg = if samples.is_empty() || samples.len() < config.min_wrist_samples {
        warn!(
            wrist_samples = samples.len(),
            need = config.min_wrist_samples,
            "insufficient wrist tracking, using proportional phases"
        );
        proportional(n, config, tracked_wrist, samples.len())
    } else {
        trajectory(n, &samples, config, tracked_wrist)
    };

    debug!(
        frames = n,
        method = ?seg.method,
        top = seg.top_index,
        impact = seg.impact_index,
        phases = seg.phases.len(),
        "segmented swing"
    );
    Ok(seg)
}

/// Trailing wrist per frame, or the lead wrist where the trailing one is missing.
fn wrist_trajectory(
    frames: &[PoseFrame],
    config: &AnalysisConfig,
) -> (Vec<WristSample>, Option<Landmark>) {
    let trailing = config.handedness.trailing_wrist();
    let lead = config.handedness.lead_wrist();
    let mut trailing_used = 0usize;
    let mut lead_used = 0usize;

    let samples = frames
        .iter()
        .enumerate()
        .filter_map(|(i, f)| {
            if let Some(p) = f.landmark(trailing) {
                trailing_used += 1;
                Some(WristSample { frame: i, y: p.y })
            } else if let Some(p) = f.landmark(lead) {
                lead_used += 1;
                Some(WristSample { frame: i, y: p.y })
            } else {
                None
            }
        })
        .collect();

    let tracked = match (trailing_used, lead_used) {
        (0, 0) => None,
        (t, l) if t >= l => Some(trailing),
        _ => Some(lead),
    };
    (samples, tracked)
}

/// Top = highest wrist (smallest y). Impact = largest single-step vertical
/// move among the samples following the top.
fn locate_top_and_impact(n: usize, samples: &[WristSample], config: &AnalysisConfig) -> (usize, usize) {
    // Strict `<` keeps the first of equal minima.
    let mut top = 0;
    for (i, s) in samples.iter().enumerate() {
        if s.y < samples[top].y {
            top = i;
        }
    }

    let mut impact = n - 1;
    // Saturating: a huge margin or window from config means "no room" or "to the end".
    if top.saturating_add(config.impact_end_margin) < samples.len() {
        let end = samples
            .len()
            .min(top.saturating_add(1).saturating_add(config.impact_search_window));
        let mut best: Option<(usize, f64)> = None;
        for i in (top + 1)..end {
            let step = (samples[i].y - samples[i - 1].y).abs();
            if best.is_none_or(|(_, b)| step > b) {
                best = Some((i, step));
            }
        }
        if let Some((i, _)) = best {
            impact = samples[i].frame;
        }
    }
    (samples[top].frame, impact)
}

fn trajectory(
    n: usize,
    samples: &[WristSample],
    config: &AnalysisConfig,
    tracked_wrist: Option<Landmark>,
) -> Segmentation {
    let (top, impact) = locate_top_and_impact(n, samples, config);
    let half = (n as f64 * config.top_half_width).round() as usize;
    let layout = config.layout;

    let mut starts = Vec::with_capacity(layout.names().len());
    let top_fraction = layout.top_fraction();
    for (&name, &fraction) in layout.names().iter().zip(layout.fractions()) {
        let start = match name {
            PhaseName::Address | PhaseName::Takeaway | PhaseName::Backswing => {
                (top as f64 * fraction / top_fraction).round() as usize
            }
            PhaseName::Top => top.saturating_sub(half),
            // The impact frame always stays out of the top window.
            PhaseName::Downswing if impact > top => (top + half + 1).min(impact),
            PhaseName::Impact if impact > top => impact,
            PhaseName::FollowThrough => impact + 1,
            // Top on the last frame: nothing follows it.
            PhaseName::Downswing | PhaseName::Impact => n,
        };
        starts.push((name, start));
    }

    Segmentation {
        phases: partition(n, &starts),
        method: SegmentationMethod::Trajectory,
        top_index: top,
        impact_index: impact,
        tracked_wrist,
        wrist_samples: samples.len(),
    }
}

fn proportional(
    n: usize,
    config: &AnalysisConfig,
    tracked_wrist: Option<Landmark>,
    wrist_samples: usize,
) -> Segmentation {
    let layout = config.layout;
    let starts: Vec<(PhaseName, usize)> = layout
        .names()
        .iter()
        .zip(layout.fractions())
        .map(|(&name, &f)| (name, (n as f64 * f).round() as usize))
        .collect();
    let phases = partition(n, &starts);

    let find = |name: PhaseName| phases.iter().find(|p| p.name == name);
    let top_index = find(PhaseName::Top).map_or((n - 1) / 2, |p| (p.start_frame + p.end_frame) / 2);
    let impact_index = find(PhaseName::Impact)
        .map(|p| p.start_frame)
        .or_else(|| find(PhaseName::Downswing).map(|p| p.end_frame))
        .unwrap_or(n - 1)
        .max(top_index);

    Segmentation {
        phases,
        method: SegmentationMethod::Proportional,
        top_index,
        impact_index,
        tracked_wrist,
        wrist_samples,
    }
}

/// Turn ordered start indices into contiguous phases covering `[0, n-1]`.
///
/// Starts are clamped to `[previous start, n]`; the first phase always starts
/// at 0. A start equal to the next one yields an empty window, which is
/// dropped.
fn partition(n: usize, starts: &[(PhaseName, usize)]) -> Vec<Phase> {
    let mut clamped: Vec<(PhaseName, usize)> = Vec::with_capacity(starts.len());
    for (i, &(name, start)) in starts.iter().enumerate() {
        let s = if i == 0 {
            0
        } else {
            start.min(n).max(clamped[i - 1].1)
        };
        clamped.push((name, s));
    }

    let mut phases = Vec::with_capacity(clamped.len());
    for (i, &(name, start)) in clamped.iter().enumerate() {
        let end_exclusive = clamped.get(i + 1).map_or(n, |&(_, s)| s);
        if end_exclusive > start {
            phases.push(Phase {
                name,
                start_frame: start,
                end_frame: end_exclusive - 1,
            });
        }
    }
    phases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Handedness;
    use crate::landmark::Position;
    use crate::testutil::{self, SwingShape};

    fn assert_partition(phases: &[Phase], n: usize) {
        assert!(!phases.is_empty());
        assert_eq!(phases[0].start_frame, 0);
        assert_eq!(phases.last().unwrap().end_frame, n - 1);
        for w in phases.windows(2) {
            assert_eq!(w[1].start_frame, w[0].end_frame + 1, "gap or overlap: {phases:?}");
            assert!(w[0].name < w[1].name, "out of order: {phases:?}");
        }
        for p in phases {
            assert!(p.end_frame >= p.start_frame);
        }
        for i in 0..n {
            let owners = phases.iter().filter(|p| p.contains(i)).count();
            assert_eq!(owners, 1, "frame {i} in {owners} phases: {phases:?}");
        }
        assert_eq!(phases.iter().map(Phase::len).sum::<usize>(), n);
    }

    /// Frames whose only landmark is a right wrist at the given heights.
    fn wrist_frames(ys: &[f64]) -> Vec<PoseFrame> {
        ys.iter()
            .enumerate()
            .map(|(i, &y)| testutil::frame_with(i, &[(Landmark::RightWrist, Position::visible(0.5, y))]))
            .collect()
    }

    #[test]
    fn too_few_frames() {
        let frames = testutil::swing_frames(&SwingShape {
            frames: 9,
            top: 5,
            impact: 7,
            ..SwingShape::default()
        });
        let err = segment(&frames, &AnalysisConfig::default()).unwrap_err();
        assert_eq!(err, AnalysisError::InsufficientFrames { got: 9, need: 10 });
    }

    #[test]
    fn arc_top_and_impact() {
        let shape = SwingShape::default();
        let frames = testutil::swing_frames(&shape);
        let seg = segment(&frames, &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.method, SegmentationMethod::Trajectory);
        assert_eq!(seg.top_index, shape.top);
        assert_eq!(seg.impact_index, shape.impact);
        assert_eq!(seg.tracked_wrist, Some(Landmark::RightWrist));
        assert_partition(&seg.phases, shape.frames);

        // 40 frames: half-width 2, backswing from a third of the way to the top.
        let names: Vec<_> = seg.phases.iter().map(|p| p.name).collect();
        assert_eq!(names, PhaseLayout::Standard.names());
        assert_eq!(seg.phase(PhaseName::Backswing).unwrap().start_frame, 8);
        let top = seg.phase(PhaseName::Top).unwrap();
        assert_eq!((top.start_frame, top.end_frame), (22, 26));
        let down = seg.phase(PhaseName::Downswing).unwrap();
        assert_eq!((down.start_frame, down.end_frame), (27, 32));
        let follow = seg.phase(PhaseName::FollowThrough).unwrap();
        assert_eq!((follow.start_frame, follow.end_frame), (33, 39));
    }

    #[test]
    fn detailed_layout_splits_impact_out() {
        let shape = SwingShape::default();
        let frames = testutil::swing_frames(&shape);
        let config = AnalysisConfig {
            layout: PhaseLayout::Detailed,
            ..Default::default()
        };
        let seg = segment(&frames, &config).unwrap();
        assert_partition(&seg.phases, shape.frames);
        let impact = seg.phase(PhaseName::Impact).unwrap();
        assert_eq!((impact.start_frame, impact.end_frame), (32, 32));
        assert_eq!(seg.phase(PhaseName::Downswing).unwrap().end_frame, 31);
        assert!(seg.phase(PhaseName::Takeaway).is_some());
    }

    #[test]
    fn first_minimum_wins() {
        let mut ys = vec![0.8; 20];
        ys[6] = 0.2;
        ys[9] = 0.2;
        let seg = segment(&wrist_frames(&ys), &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.top_index, 6);
        // Biggest step after frame 6 is back down at frame 7.
        assert_eq!(seg.impact_index, 7);
    }

    #[test]
    fn impact_search_is_bounded() {
        // Top at 2; a huge drop at 30 lies outside the 15-sample window.
        let mut ys: Vec<f64> = (0..40).map(|i| 0.3 + 0.001 * i as f64).collect();
        ys[2] = 0.1;
        ys[10] = 0.9;
        ys[30] = 0.95;
        let seg = segment(&wrist_frames(&ys), &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.top_index, 2);
        assert_eq!(seg.impact_index, 10);
    }

    #[test]
    fn top_near_end_puts_impact_on_last_frame() {
        let mut ys = vec![0.7; 20];
        ys[16] = 0.1;
        let seg = segment(&wrist_frames(&ys), &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.top_index, 16);
        assert_eq!(seg.impact_index, 19);
        assert_partition(&seg.phases, 20);
        assert!(seg.phase(PhaseName::FollowThrough).is_none());
    }

    #[test]
    fn top_on_last_frame() {
        let mut ys = vec![0.7; 12];
        ys[11] = 0.1;
        let seg = segment(&wrist_frames(&ys), &AnalysisConfig::default()).unwrap();
        assert_eq!((seg.top_index, seg.impact_index), (11, 11));
        assert_partition(&seg.phases, 12);
        assert_eq!(seg.phases.last().unwrap().name, PhaseName::Top);
    }

    #[test]
    fn top_on_first_frame() {
        let mut ys = vec![0.7; 15];
        ys[0] = 0.1;
        let seg = segment(&wrist_frames(&ys), &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.top_index, 0);
        assert_partition(&seg.phases, 15);
        assert_eq!(seg.phases[0].name, PhaseName::Top);
    }

    #[test]
    fn indices_refer_to_surviving_sequence() {
        // No wrist in the first four frames: samples start at sequence index 4.
        let mut frames = wrist_frames(&[0.6, 0.5, 0.4, 0.3, 0.2, 0.7, 0.8, 0.8, 0.8, 0.8, 0.8, 0.8]);
        for f in frames.iter_mut().take(4) {
            f.landmarks.clear();
            f.landmarks.insert(Landmark::LeftHip, Position::visible(0.5, 0.6));
        }
        let seg = segment(&frames, &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.wrist_samples, 8);
        assert_eq!(seg.top_index, 4);
        assert_eq!(seg.impact_index, 5);
    }

    #[test]
    fn lead_wrist_fills_gaps() {
        let mut frames = wrist_frames(&[0.6; 12]);
        for (i, f) in frames.iter_mut().enumerate() {
            if i % 3 == 0 {
                f.landmarks.remove(&Landmark::RightWrist);
                f.landmarks.insert(Landmark::LeftWrist, Position::visible(0.5, 0.6));
            }
        }
        frames[3].landmarks.insert(Landmark::LeftWrist, Position::visible(0.5, 0.1));
        let seg = segment(&frames, &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.wrist_samples, 12);
        assert_eq!(seg.top_index, 3);
        assert_eq!(seg.tracked_wrist, Some(Landmark::RightWrist));
    }

    #[test]
    fn left_handed_prefers_left_wrist() {
        let shape = SwingShape::default();
        let mut frames = testutil::swing_frames(&shape);
        // Flatten the right wrist; only the left one carries the swing.
        for f in &mut frames {
            let left = *f.landmark(Landmark::LeftWrist).unwrap();
            f.landmarks.insert(Landmark::RightWrist, Position::visible(left.x, 0.5));
        }
        let config = AnalysisConfig {
            handedness: Handedness::Left,
            ..Default::default()
        };
        let seg = segment(&frames, &config).unwrap();
        assert_eq!(seg.tracked_wrist, Some(Landmark::LeftWrist));
        assert_eq!(seg.top_index, shape.top);
    }

    #[test]
    fn proportional_fallback() {
        let mut frames = testutil::swing_frames(&SwingShape {
            frames: 20,
            top: 12,
            impact: 16,
            ..SwingShape::default()
        });
        for f in frames.iter_mut().skip(4) {
            f.landmarks.remove(&Landmark::RightWrist);
            f.landmarks.remove(&Landmark::LeftWrist);
        }
        let seg = segment(&frames, &AnalysisConfig::default()).unwrap();
        assert_eq!(seg.method, SegmentationMethod::Proportional);
        assert_eq!(seg.wrist_samples, 4);
        let bounds: Vec<_> = seg.phases.iter().map(|p| (p.start_frame, p.end_frame)).collect();
        assert_eq!(bounds, vec![(0, 2), (3, 8), (9, 10), (11, 14), (15, 19)]);
        assert_eq!(seg.top_index, 9);
        assert_eq!(seg.impact_index, 14);
    }

    #[test]
    fn proportional_minimum_length() {
        let frames = wrist_frames(&[0.5; 10]);
        let config = AnalysisConfig {
            min_wrist_samples: 11,
            ..Default::default()
        };
        let seg = segment(&frames, &config).unwrap();
        let bounds: Vec<_> = seg.phases.iter().map(|p| (p.start_frame, p.end_frame)).collect();
        assert_eq!(bounds, vec![(0, 1), (2, 4), (5, 5), (6, 7), (8, 9)]);
    }

    #[test]
    fn always_a_partition() {
        // Deterministic pseudo-random wrist heights across many lengths.
        let mut state: u64 = 0x2545_F491_4F6C_DD1D;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 1000) as f64 / 1000.0
        };
        for layout in [PhaseLayout::Standard, PhaseLayout::Detailed] {
            let config = AnalysisConfig {
                layout,
                ..Default::default()
            };
            for n in 10..=90 {
                let ys: Vec<f64> = (0..n).map(|_| next()).collect();
                let seg = segment(&wrist_frames(&ys), &config).unwrap();
                assert_partition(&seg.phases, n);
                assert!(seg.top_index <= seg.impact_index);
                assert!(seg.impact_index < n);
            }
            let short = AnalysisConfig {
                min_frames: 1,
                ..config.clone()
            };
            for n in 1..10 {
                let ys: Vec<f64> = (0..n).map(|_| next()).collect();
                let seg = segment(&wrist_frames(&ys), &short).unwrap();
                assert_partition(&seg.phases, n);
                assert!(seg.impact_index < n);
            }
        }
    }

    #[test]
    fn partition_drops_empty_windows() {
        let phases = partition(
            10,
            &[
                (PhaseName::Address, 0),
                (PhaseName::Backswing, 0),
                (PhaseName::Top, 4),
                (PhaseName::Downswing, 2),
                (PhaseName::FollowThrough, 12),
            ],
        );
        assert_eq!(
            phases,
            vec![
                Phase { name: PhaseName::Backswing, start_frame: 0, end_frame: 3 },
                Phase { name: PhaseName::Downswing, start_frame: 4, end_frame: 9 },
            ]
        );
    }
}
