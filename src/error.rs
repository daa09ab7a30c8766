use thiserror::Error;

/// Convenient alias for results returned by the scoring pipeline.
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Terminal failures of a single scoring invocation.
///
/// The pipeline is deterministic, so none of these are retried internally;
/// re-running with the same input reproduces the same error. Only
/// [`ScoreError::EmptyAudio`] is user-actionable (record again, speak louder);
/// everything else is a caller/system problem.
#[derive(Debug, Error)]
pub enum ScoreError {
    #[error(
        "no usable voiced audio: {trimmed_ms:.1} ms remained after trimming \
         (minimum {min_ms:.1} ms)"
    )]
    EmptyAudio { trimmed_ms: f32, min_ms: f32 },

    #[error("invalid alignment input: {message}")]
    InvalidAlignmentInput { message: String },

    #[error(
        "audio too short to align: {phonemes} phonemes over {usable_samples} samples \
         leaves segments under the {min_samples}-sample minimum"
    )]
    AlignmentTooShort {
        phonemes: usize,
        usable_samples: usize,
        min_samples: usize,
    },

    #[error("segment count {user} does not match reference count {reference}")]
    AlignmentMismatch { user: usize, reference: usize },

    #[error("no reference entry for phoneme {symbol:?}")]
    UnknownPhoneme { symbol: String },

    #[error("feature extraction failed: {message}")]
    FeatureExtraction { message: String },

    #[error("invalid pipeline configuration: {message}")]
    InvalidConfig { message: String },
}

impl ScoreError {
    pub(crate) fn invalid_alignment_input(message: impl Into<String>) -> Self {
        Self::InvalidAlignmentInput {
            message: message.into(),
        }
    }

    pub(crate) fn feature_extraction(message: impl Into<String>) -> Self {
        Self::FeatureExtraction {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
