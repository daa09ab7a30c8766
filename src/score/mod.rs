//! Similarity scoring of user segment features against reference fingerprints.

use ndarray::Array1;
use serde::Serialize;
use tracing::debug;

use crate::align::Segment;
use crate::config::ClassificationThresholds;
use crate::error::{Result, ScoreError};
use crate::features::FeatureVector;
use crate::phoneme::Phoneme;
use crate::reference::ReferenceSnapshot;

/// Per-segment verdict derived from the score bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Score at or above the good threshold.
    Good,
    /// Between the weak and good thresholds.
    Weak,
    /// Below the weak threshold: likely substitution or badly formed sound.
    Mispronounced,
    /// Segment energy under the silence floor; the sound was not produced.
    /// Kept distinct so near-silence is never mistaken for mispronunciation.
    Missing,
}

/// Score and verdict for one aligned phoneme.
#[derive(Debug, Clone, Serialize)]
pub struct PhonemeScore {
    pub phoneme: Phoneme,
    pub score: f32,
    pub classification: Classification,
    pub start_ms: f32,
    pub end_ms: f32,
    pub feedback: &'static str,
    /// Closest reference fingerprint when the expected phoneme scored below
    /// the weak threshold and another phoneme matched better.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likely_substitution: Option<Phoneme>,
}

/// Immutable output of one scoring run.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResult {
    pub per_phoneme: Vec<PhonemeScore>,
    /// Mean of per-phoneme scores (difficulty-weighted when configured).
    pub aggregate_score: f32,
    /// `max(0, 100 - variance)`: steadier per-phoneme scores read as fluent.
    pub fluency_score: f32,
    /// Phonemes that scored below the good threshold, deduplicated in order.
    pub weak_phonemes: Vec<Phoneme>,
    pub phoneme_count: usize,
    pub reference_version: u64,
}

/// Compares user segment features against a reference snapshot.
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    thresholds: ClassificationThresholds,
    silence_floor: f32,
    difficulty_weights: Option<std::collections::HashMap<Phoneme, f32>>,
}

impl SimilarityScorer {
    pub fn new(
        thresholds: ClassificationThresholds,
        silence_floor: f32,
        difficulty_weights: Option<std::collections::HashMap<Phoneme, f32>>,
    ) -> Self {
        Self {
            thresholds,
            silence_floor,
            difficulty_weights,
        }
    }

    /// Scores one utterance. `segments` and `vectors` must correspond
    /// one-to-one; the reference snapshot supplies one fingerprint per
    /// phoneme or the lookup fails.
    pub fn score(
        &self,
        segments: &[Segment],
        vectors: &[FeatureVector],
        snapshot: &ReferenceSnapshot,
        sample_rate: u32,
    ) -> Result<ScoreResult> {
        let phonemes: Vec<Phoneme> = segments.iter().map(|s| s.phoneme).collect();
        let references = snapshot.vectors_for(&phonemes)?;
        let scores = score_vectors(vectors, &references)?;

        let mut per_phoneme = Vec::with_capacity(segments.len());
        for ((segment, vector), raw_score) in segments.iter().zip(vectors).zip(scores) {
            let (score, classification) = if vector.is_near_silent(self.silence_floor) {
                (0.0, Classification::Missing)
            } else {
                (raw_score, self.classify(raw_score))
            };

            let likely_substitution = if classification == Classification::Mispronounced {
                closest_reference(vector.coeffs(), snapshot)
                    .filter(|&(best, best_score)| best != segment.phoneme && best_score > score)
                    .map(|(best, _)| best)
            } else {
                None
            };

            per_phoneme.push(PhonemeScore {
                phoneme: segment.phoneme,
                score,
                classification,
                start_ms: segment.start_ms(sample_rate),
                end_ms: segment.end_ms(sample_rate),
                feedback: feedback_for(classification, score),
                likely_substitution,
            });
        }

        let aggregate_score = self.aggregate(&per_phoneme);
        let fluency_score = fluency(&per_phoneme, aggregate_score);
        let weak_phonemes = weak_in_order(&per_phoneme);
        debug!(
            phonemes = per_phoneme.len(),
            aggregate_score,
            fluency_score,
            reference_version = snapshot.version(),
            "scored utterance"
        );

        Ok(ScoreResult {
            phoneme_count: per_phoneme.len(),
            per_phoneme,
            aggregate_score,
            fluency_score,
            weak_phonemes,
            reference_version: snapshot.version(),
        })
    }

    fn classify(&self, score: f32) -> Classification {
        if score >= self.thresholds.good {
            Classification::Good
        } else if score >= self.thresholds.weak {
            Classification::Weak
        } else {
            Classification::Mispronounced
        }
    }

    fn aggregate(&self, per_phoneme: &[PhonemeScore]) -> f32 {
        if per_phoneme.is_empty() {
            return 0.0;
        }
        let mut total = 0.0f32;
        let mut weight_sum = 0.0f32;
        for entry in per_phoneme {
            let weight = self
                .difficulty_weights
                .as_ref()
                .and_then(|weights| weights.get(&entry.phoneme))
                .copied()
                .unwrap_or(1.0);
            total += entry.score * weight;
            weight_sum += weight;
        }
        (total / weight_sum).clamp(0.0, 100.0)
    }
}

/// Per-phoneme raw scores for paired vector sequences. Mismatched lengths are
/// an error, never silently truncated or padded.
pub fn score_vectors(user: &[FeatureVector], reference: &[&Array1<f32>]) -> Result<Vec<f32>> {
    if user.len() != reference.len() {
        return Err(ScoreError::AlignmentMismatch {
            user: user.len(),
            reference: reference.len(),
        });
    }
    Ok(user
        .iter()
        .zip(reference)
        .map(|(vector, reference)| similarity_score(vector.coeffs(), reference))
        .collect())
}

/// Maps cosine similarity into `[0, 100]`: negative similarity clamps to 0
/// rather than producing a negative score.
pub fn similarity_score(user: &Array1<f32>, reference: &Array1<f32>) -> f32 {
    (cosine_similarity(user, reference).max(0.0) * 100.0).clamp(0.0, 100.0)
}

/// Cosine of the angle between two vectors; 0.0 when either has no magnitude.
pub fn cosine_similarity(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    let dot = a.dot(b);
    let norms = a.dot(a).sqrt() * b.dot(b).sqrt();
    if norms <= f32::EPSILON || !norms.is_finite() {
        return 0.0;
    }
    (dot / norms).clamp(-1.0, 1.0)
}

fn closest_reference(
    user: &Array1<f32>,
    snapshot: &ReferenceSnapshot,
) -> Option<(Phoneme, f32)> {
    // Tie-break on phoneme order so the result never depends on map
    // iteration order.
    snapshot
        .iter()
        .map(|(phoneme, reference)| (phoneme, similarity_score(user, reference)))
        .max_by(|(pa, a), (pb, b)| a.total_cmp(b).then_with(|| pb.cmp(pa)))
}

fn fluency(per_phoneme: &[PhonemeScore], aggregate: f32) -> f32 {
    if per_phoneme.len() < 2 {
        return aggregate;
    }
    let mean = per_phoneme.iter().map(|p| p.score).sum::<f32>() / per_phoneme.len() as f32;
    let variance = per_phoneme
        .iter()
        .map(|p| (p.score - mean).powi(2))
        .sum::<f32>()
        / per_phoneme.len() as f32;
    (100.0 - variance).clamp(0.0, 100.0)
}

fn weak_in_order(per_phoneme: &[PhonemeScore]) -> Vec<Phoneme> {
    let mut seen = Vec::new();
    for entry in per_phoneme {
        if entry.classification != Classification::Good && !seen.contains(&entry.phoneme) {
            seen.push(entry.phoneme);
        }
    }
    seen
}

fn feedback_for(classification: Classification, score: f32) -> &'static str {
    match classification {
        Classification::Missing => "No sound detected for this phoneme",
        _ if score >= 90.0 => "Excellent!",
        _ if score >= 80.0 => "Very good",
        _ if score >= 70.0 => "Good",
        _ if score >= 60.0 => "Acceptable",
        _ if score >= 50.0 => "Needs practice",
        _ => "Needs significant improvement",
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array1;

    use super::{cosine_similarity, score_vectors, similarity_score};
    use crate::error::ScoreError;
    use crate::features::FeatureVector;

    fn vector(values: &[f32]) -> FeatureVector {
        FeatureVector::new(Array1::from_vec(values.to_vec()), 0.5)
    }

    #[test]
    fn identical_vectors_score_maximum() {
        let a = Array1::from_vec(vec![0.5, -0.3, 0.2]);
        assert!((similarity_score(&a, &a) - 100.0).abs() < 1e-4);
    }

    #[test]
    fn opposed_vectors_clamp_to_zero() {
        let a = Array1::from_vec(vec![1.0, 0.0]);
        let b = Array1::from_vec(vec![-1.0, 0.0]);
        assert_eq!(similarity_score(&a, &b), 0.0);
    }

    #[test]
    fn zero_magnitude_vector_has_zero_similarity() {
        let a = Array1::from_vec(vec![0.0, 0.0]);
        let b = Array1::from_vec(vec![1.0, 0.0]);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn mismatched_sequence_lengths_are_rejected() {
        let user: Vec<FeatureVector> = (0..5).map(|_| vector(&[1.0, 0.0])).collect();
        let ref_vec = Array1::from_vec(vec![1.0, 0.0]);
        let references: Vec<&Array1<f32>> = (0..4).map(|_| &ref_vec).collect();
        let err = score_vectors(&user, &references).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::AlignmentMismatch {
                user: 5,
                reference: 4,
            }
        ));
    }

    #[test]
    fn scores_stay_in_bounds() {
        let a = Array1::from_vec(vec![0.3, 0.9, -0.4]);
        let b = Array1::from_vec(vec![-0.2, 0.1, 0.7]);
        let score = similarity_score(&a, &b);
        assert!((0.0..=100.0).contains(&score));
    }
}
