pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod landmark;
pub mod metrics;
pub mod overlay;
pub mod phase;
pub mod pipeline;
pub mod recommend;
pub mod score;

#[cfg(test)]
mod testutil;

pub use config::{AnalysisConfig, Handedness};
pub use error::{AnalysisError, Result};
pub use frame::{AngleName, Detection, FrameExtractor, Observation, PoseFrame, PoseSource};
pub use landmark::{Landmark, Position};
pub use metrics::{AngleStats, PhaseMetrics, SequenceMetrics};
pub use phase::{Phase, PhaseLayout, PhaseName, Segmentation, SegmentationMethod};
pub use pipeline::{Analyzer, SwingAnalysisResult, VideoMetadata, analyze};
pub use recommend::ClubMetrics;
pub use score::ScoreBreakdown;
