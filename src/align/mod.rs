//! Mapping a phoneme sequence onto time spans of the preprocessed signal.
//!
//! The [`Aligner`] seam is deliberately narrow: proportional time-division is
//! a placeholder policy, and a future forced aligner must be able to slot in
//! without touching feature extraction or scoring.

mod proportional;

pub use proportional::ProportionalAligner;

use crate::audio::Signal;
use crate::error::Result;
use crate::phoneme::{Phoneme, PhonemeClass};

/// One phoneme mapped to a half-open sample range `[start, end)`.
///
/// Segments for an utterance are stored in a flat ordered `Vec`, contiguous
/// and non-overlapping, with the final `end` equal to the signal length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub phoneme: Phoneme,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn start_ms(&self, sample_rate: u32) -> f32 {
        self.start as f32 * 1000.0 / sample_rate as f32
    }

    pub fn end_ms(&self, sample_rate: u32) -> f32 {
        self.end as f32 * 1000.0 / sample_rate as f32
    }
}

/// Relative duration weights for the phoneme sequence being aligned.
#[derive(Debug, Clone)]
pub enum DurationPriors {
    /// Class-based weights: vowels get more time than stops.
    Phonetic,
    /// Caller-supplied weight per phoneme, same length as the sequence.
    Explicit(Vec<f32>),
}

impl DurationPriors {
    /// Resolves to one positive weight per phoneme.
    pub fn weights(&self, phonemes: &[Phoneme]) -> Result<Vec<f32>> {
        match self {
            DurationPriors::Phonetic => {
                Ok(phonemes.iter().map(|p| class_weight(p.class())).collect())
            }
            DurationPriors::Explicit(weights) => {
                if weights.len() != phonemes.len() {
                    return Err(crate::error::ScoreError::invalid_alignment_input(format!(
                        "{} duration priors supplied for {} phonemes",
                        weights.len(),
                        phonemes.len()
                    )));
                }
                if weights.iter().any(|w| !(w.is_finite() && *w > 0.0)) {
                    return Err(crate::error::ScoreError::invalid_alignment_input(
                        "duration priors must be positive and finite",
                    ));
                }
                Ok(weights.clone())
            }
        }
    }
}

fn class_weight(class: PhonemeClass) -> f32 {
    match class {
        PhonemeClass::Vowel => 1.6,
        PhonemeClass::Approximant => 1.2,
        PhonemeClass::Nasal => 1.0,
        PhonemeClass::Fricative => 1.0,
        PhonemeClass::Affricate => 0.9,
        PhonemeClass::Stop => 0.7,
    }
}

/// Maps an ordered phoneme sequence onto segments covering the full signal.
pub trait Aligner {
    fn align(
        &self,
        signal: &Signal,
        phonemes: &[Phoneme],
        priors: Option<&DurationPriors>,
    ) -> Result<Vec<Segment>>;
}

#[cfg(test)]
mod tests {
    use super::{DurationPriors, Segment};
    use crate::phoneme::Phoneme;

    #[test]
    fn segment_times_convert_to_milliseconds() {
        let segment = Segment {
            phoneme: Phoneme::Ah,
            start: 1600,
            end: 4800,
        };
        assert_eq!(segment.len(), 3200);
        assert!((segment.start_ms(16_000) - 100.0).abs() < 1e-4);
        assert!((segment.end_ms(16_000) - 300.0).abs() < 1e-4);
    }

    #[test]
    fn phonetic_priors_favor_vowels_over_stops() {
        let weights = DurationPriors::Phonetic
            .weights(&[Phoneme::Ae, Phoneme::T])
            .unwrap();
        assert!(weights[0] > weights[1]);
    }

    #[test]
    fn explicit_priors_must_match_sequence_length() {
        let result = DurationPriors::Explicit(vec![1.0]).weights(&[Phoneme::Ae, Phoneme::T]);
        assert!(result.is_err());
    }

    #[test]
    fn explicit_priors_must_be_positive() {
        let result = DurationPriors::Explicit(vec![1.0, 0.0]).weights(&[Phoneme::Ae, Phoneme::T]);
        assert!(result.is_err());
    }
}
