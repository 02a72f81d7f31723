//! End-to-end analysis: observations in, [`SwingAnalysisResult`] out.
//!
//! ```text
//! observations ─▶ build_frame ─▶ segment ─▶ aggregate ─┬▶ score
//!                                                      └▶ recommend
//! ```
//!
//! A run either returns a complete result or an error; nothing partial.

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::frame::{self, Observation, PoseFrame};
use crate::metrics::{self, PhaseMetrics, SequenceMetrics};
use crate::overlay::{self, KeyFrame};
use crate::phase::{self, Phase, PhaseName, Segmentation};
use crate::recommend::{self, ClubMetrics};
use crate::score::{self, ScoreBreakdown};

/// Facts about the source video that the landmarks alone do not carry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VideoMetadata {
    pub fps: f64,
    /// Frames in the video, detected or not. 0 if unknown.
    pub total_frame_count: u32,
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    pub fn new(fps: f64, total_frame_count: u32, width: u32, height: u32) -> Self {
        Self {
            fps,
            total_frame_count,
            width,
            height,
        }
    }

    /// Seconds, using the default frame rate if `fps` is unusable.
    pub fn duration(&self) -> f64 {
        f64::from(self.total_frame_count) / frame::effective_fps(self.fps)
    }
}

/// Output of one analysis run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SwingAnalysisResult {
    /// Phases and the key indices they came from.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub segmentation: Segmentation,
    pub overall_metrics: SequenceMetrics,
    pub per_phase_metrics: BTreeMap<PhaseName, PhaseMetrics>,
    pub recommendations: Vec<String>,
    pub overall_score: u8,
    pub score_breakdown: ScoreBreakdown,
    pub pose_tracking_quality: f64,
    pub key_frames: Vec<KeyFrame>,
    pub video_info: VideoMetadata,
}

impl SwingAnalysisResult {
    pub fn phases(&self) -> &[Phase] {
        &self.segmentation.phases
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Configurable analysis driver.
///
/// Holds the configuration, optional club data and observer hooks. Runs are
/// independent; the analyzer keeps no state between them.
///
/// ```no_run
/// use swingsight::{AnalysisConfig, Analyzer, VideoMetadata};
///
/// let mut analyzer = Analyzer::new(AnalysisConfig::default())?;
/// analyzer.set_on_dropped(|i| eprintln!("no body in frame {i}"));
/// let observations = Vec::new(); // from a FrameExtractor
/// let result = analyzer.analyze(&observations, &VideoMetadata::new(30.0, 0, 1280, 720))?;
/// println!("score {}", result.overall_score);
/// # Ok::<(), swingsight::AnalysisError>(())
/// ```
pub struct Analyzer {
    config: AnalysisConfig,
    club: Option<ClubMetrics>,
    /// Called with every frame that survives detection.
    on_frame: Option<Box<dyn FnMut(&PoseFrame)>>,
    /// Called with the video index of every frame without a usable body.
    on_dropped: Option<Box<dyn FnMut(u32)>>,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            club: None,
            on_frame: None,
            on_dropped: None,
        }
    }
}

impl Analyzer {
    /// Fails if `config` does not validate.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Club delivery data to feed the recommender (e.g. from a launch monitor).
    pub fn set_club_metrics(&mut self, club: ClubMetrics) {
        self.club = Some(club);
    }

    /// Register a callback invoked with each frame built from a detection.
    pub fn set_on_frame(&mut self, f: impl FnMut(&PoseFrame) + 'static) {
        self.on_frame = Some(Box::new(f));
    }

    /// Register a callback invoked with the index of each dropped frame.
    pub fn set_on_dropped(&mut self, f: impl FnMut(u32) + 'static) {
        self.on_dropped = Some(Box::new(f));
    }

    /// Turn observations into the surviving frame sequence.
    ///
    /// Timestamps must not decrease across the input.
    pub fn build_frames(&mut self, observations: &[Observation]) -> Result<Vec<PoseFrame>> {
        check_timestamps(observations.iter().map(|o| (o.frame_index, o.timestamp)))?;

        let mut frames = Vec::with_capacity(observations.len());
        for obs in observations {
            let built = obs
                .detection
                .as_ref()
                .and_then(|d| frame::build_frame(d, obs.frame_index, obs.timestamp));
            match built {
                Some(f) => {
                    if let Some(cb) = self.on_frame.as_mut() {
                        cb(&f);
                    }
                    frames.push(f);
                }
                None => {
                    debug!(frame = obs.frame_index, "no pose detected, frame dropped");
                    if let Some(cb) = self.on_dropped.as_mut() {
                        cb(obs.frame_index);
                    }
                }
            }
        }
        debug!(
            observed = observations.len(),
            kept = frames.len(),
            "built pose frames"
        );
        Ok(frames)
    }

    pub fn analyze(
        &mut self,
        observations: &[Observation],
        metadata: &VideoMetadata,
    ) -> Result<SwingAnalysisResult> {
        let frames = self.build_frames(observations)?;
        self.analyze_frames(&frames, metadata)
    }

    /// Analyze an already-built frame sequence.
    pub fn analyze_frames(
        &self,
        frames: &[PoseFrame],
        metadata: &VideoMetadata,
    ) -> Result<SwingAnalysisResult> {
        check_timestamps(frames.iter().map(|f| (f.frame_index, f.timestamp)))?;

        let segmentation = phase::segment(frames, &self.config)?;
        let total = (metadata.total_frame_count > 0).then_some(metadata.total_frame_count as usize);
        let overall = metrics::aggregate(frames, Some(&segmentation), total, &self.config);
        let per_phase = metrics::per_phase(frames, &segmentation);
        let breakdown = score::breakdown(&overall);
        let recommendations = recommend::recommend(&overall, self.club.as_ref(), &self.config);
        let key_frames = overlay::key_frames(&segmentation, frames);

        debug!(
            frames = frames.len(),
            score = breakdown.total,
            tempo = ?overall.tempo_ratio,
            quality = overall.pose_tracking_quality,
            "swing analyzed"
        );

        Ok(SwingAnalysisResult {
            pose_tracking_quality: overall.pose_tracking_quality,
            segmentation,
            overall_metrics: overall,
            per_phase_metrics: per_phase,
            recommendations,
            overall_score: breakdown.total,
            score_breakdown: breakdown,
            key_frames,
            video_info: *metadata,
        })
    }
}

/// Analyze with the default configuration.
pub fn analyze(observations: &[Observation], metadata: &VideoMetadata) -> Result<SwingAnalysisResult> {
    Analyzer::default().analyze(observations, metadata)
}

fn check_timestamps(mut entries: impl Iterator<Item = (u32, f64)>) -> Result<()> {
    let Some((_, mut previous)) = entries.next() else {
        return Ok(());
    };
    for (frame_index, timestamp) in entries {
        if timestamp.is_nan() || timestamp < previous {
            return Err(AnalysisError::TimestampOutOfOrder {
                frame_index,
                timestamp,
                previous,
            });
        }
        previous = timestamp;
    }
    Ok(())
}
