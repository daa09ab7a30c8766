//! Phoneme-level pronunciation scoring.
//!
//! Evaluates a learner's spoken attempt at a target sentence against
//! canonical per-phoneme reference fingerprints: preprocess the recording,
//! divide it into per-phoneme segments, extract a fixed-length cepstral
//! vector per segment, and score each against the reference by cosine
//! similarity on a 0–100 scale.
//!
//! Transcription and grapheme-to-phoneme conversion are external
//! collaborators; this crate consumes their output (a phoneme sequence from
//! the closed ARPABET inventory) and owns nothing beyond one scoring
//! invocation at a time.

pub mod align;
pub mod audio;
pub mod config;
pub mod error;
pub mod features;
pub mod phoneme;
pub mod pipeline;
pub mod reference;
pub mod score;

pub use align::{Aligner, DurationPriors, ProportionalAligner, Segment};
pub use audio::preprocess::AudioPreprocessor;
pub use audio::{RawAudio, Signal};
pub use config::PipelineConfig;
pub use error::{Result, ScoreError};
pub use features::{FeatureExtractor, FeatureVector};
pub use phoneme::{parse_sequence, Phoneme};
pub use pipeline::ScoringPipeline;
pub use reference::{ReferenceSnapshot, ReferenceStore};
pub use score::{Classification, PhonemeScore, ScoreResult, SimilarityScorer};
