use thiserror::Error;

/// Errors arising from swing analysis.
///
/// Missing measurements are never errors: a statistic whose landmarks were
/// not observed is simply absent from the result. Only conditions that make
/// the whole run meaningless surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient pose data: {got} usable frames, need at least {need}")]
    InsufficientFrames { got: usize, need: usize },

    #[error(
        "timestamp out of order at frame {frame_index} ({timestamp:.4}s after {previous:.4}s)"
    )]
    TimestampOutOfOrder {
        frame_index: u32,
        timestamp: f64,
        previous: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AnalysisError {
    /// Create an `InsufficientFrames` error.
    pub(crate) fn insufficient(got: usize, need: usize) -> Self {
        Self::InsufficientFrames { got, need }
    }

    /// True if the run failed for lack of data (as opposed to bad input or config).
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientFrames { .. })
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for AnalysisError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidConfig(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
