use tracing::debug;

use crate::audio::Signal;
use crate::error::{Result, ScoreError};
use crate::phoneme::Phoneme;

use super::{Aligner, DurationPriors, Segment};

/// Proportional time-division alignment.
///
/// Divides the usable duration among the phonemes, uniformly or weighted by
/// duration priors, laying segments out consecutively with no gaps. Boundary
/// rounding is absorbed by construction: each boundary is the rounded
/// cumulative allotment and the final segment always ends at the signal
/// length, so coverage is exact.
#[derive(Debug, Clone)]
pub struct ProportionalAligner {
    min_segment_samples: usize,
}

impl ProportionalAligner {
    pub fn new(min_segment_samples: usize) -> Self {
        Self {
            min_segment_samples: min_segment_samples.max(1),
        }
    }
}

impl Aligner for ProportionalAligner {
    fn align(
        &self,
        signal: &Signal,
        phonemes: &[Phoneme],
        priors: Option<&DurationPriors>,
    ) -> Result<Vec<Segment>> {
        if phonemes.is_empty() {
            return Err(ScoreError::invalid_alignment_input(
                "phoneme sequence is empty",
            ));
        }

        let total = signal.len();
        let weights = match priors {
            Some(priors) => priors.weights(phonemes)?,
            None => vec![1.0; phonemes.len()],
        };
        let weight_sum: f64 = weights.iter().map(|w| *w as f64).sum();

        // Fail before producing degenerate segments: every ideal allotment
        // must clear the per-phoneme minimum.
        let smallest = weights
            .iter()
            .map(|w| total as f64 * *w as f64 / weight_sum)
            .fold(f64::INFINITY, f64::min);
        if smallest < self.min_segment_samples as f64 {
            return Err(ScoreError::AlignmentTooShort {
                phonemes: phonemes.len(),
                usable_samples: total,
                min_samples: self.min_segment_samples,
            });
        }

        let mut segments = Vec::with_capacity(phonemes.len());
        let mut cumulative = 0.0f64;
        let mut start = 0usize;
        for (index, (&phoneme, &weight)) in phonemes.iter().zip(weights.iter()).enumerate() {
            cumulative += weight as f64;
            let end = if index + 1 == phonemes.len() {
                total
            } else {
                ((total as f64 * cumulative / weight_sum).round() as usize).min(total)
            };
            segments.push(Segment {
                phoneme,
                start,
                end: end.max(start),
            });
            start = end.max(start);
        }

        debug_assert_eq!(segments.last().map(|s| s.end), Some(total));
        debug!(
            phonemes = phonemes.len(),
            samples = total,
            weighted = priors.is_some(),
            "aligned phoneme sequence by proportional time-division"
        );
        Ok(segments)
    }
}
