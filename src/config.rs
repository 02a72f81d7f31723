//! Analysis configuration.
//!
//! The defaults are the empirically chosen constants of the swing model.

use crate::error::{AnalysisError, Result};
use crate::landmark::Landmark;
use crate::phase::PhaseLayout;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Fewest surviving frames for which segmentation is attempted.
pub const MIN_FRAMES: usize = 10;
/// Fewest wrist observations for trajectory segmentation (else proportional).
pub const MIN_WRIST_SAMPLES: usize = 5;
/// Samples after the top searched for the impact velocity peak.
pub const IMPACT_SEARCH_WINDOW: usize = 15;
/// A top within this many samples of the end puts impact on the last frame.
pub const IMPACT_END_MARGIN: usize = 5;
/// Visibility above which a landmark counts as tracked.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;
/// Half-width of the top-of-backswing window as a fraction of the sequence.
pub const TOP_HALF_WIDTH: f64 = 0.05;
/// Frame rate assumed when the source reports none.
pub const DEFAULT_FPS: f64 = 30.0;
/// Below this pose tracking quality the recommender suggests re-recording.
pub const TRACKING_ADVICE_THRESHOLD: f64 = 0.6;

/// Which hand trails in the swing. Right-handed golfers trail with the right
/// hand, whose wrist drives phase detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Handedness {
    #[default]
    Right,
    Left,
}

impl Handedness {
    pub fn trailing_wrist(self) -> Landmark {
        match self {
            Self::Right => Landmark::RightWrist,
            Self::Left => Landmark::LeftWrist,
        }
    }

    pub fn lead_wrist(self) -> Landmark {
        match self {
            Self::Right => Landmark::LeftWrist,
            Self::Left => Landmark::RightWrist,
        }
    }
}

/// Tunables for one analysis run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisConfig {
    pub handedness: Handedness,
    pub layout: PhaseLayout,
    pub min_frames: usize,
    pub min_wrist_samples: usize,
    pub impact_search_window: usize,
    pub impact_end_margin: usize,
    pub visibility_threshold: f64,
    pub top_half_width: f64,
    pub tracking_advice_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            handedness: Handedness::Right,
            layout: PhaseLayout::Standard,
            min_frames: MIN_FRAMES,
            min_wrist_samples: MIN_WRIST_SAMPLES,
            impact_search_window: IMPACT_SEARCH_WINDOW,
            impact_end_margin: IMPACT_END_MARGIN,
            visibility_threshold: VISIBILITY_THRESHOLD,
            top_half_width: TOP_HALF_WIDTH,
            tracking_advice_threshold: TRACKING_ADVICE_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Reject settings the segmenter and aggregator cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.min_frames == 0 {
            return Err(AnalysisError::InvalidConfig("min_frames must be at least 1".into()));
        }
        if self.min_wrist_samples == 0 {
            return Err(AnalysisError::InvalidConfig(
                "min_wrist_samples must be at least 1".into(),
            ));
        }
        if self.impact_search_window == 0 {
            return Err(AnalysisError::InvalidConfig(
                "impact_search_window must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.visibility_threshold) {
            return Err(AnalysisError::InvalidConfig(format!(
                "visibility_threshold {} outside 0..=1",
                self.visibility_threshold
            )));
        }
        if !(0.0..0.5).contains(&self.top_half_width) {
            return Err(AnalysisError::InvalidConfig(format!(
                "top_half_width {} outside 0..0.5",
                self.top_half_width
            )));
        }
        if !(0.0..=1.0).contains(&self.tracking_advice_threshold) {
            return Err(AnalysisError::InvalidConfig(format!(
                "tracking_advice_threshold {} outside 0..=1",
                self.tracking_advice_threshold
            )));
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields take their defaults.
    #[cfg(feature = "json")]
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
