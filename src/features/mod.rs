//! Per-segment acoustic fingerprints.
//!
//! Each aligned segment is reduced to one fixed-length cepstral vector:
//! MFCCs over overlapping analysis windows, mean-pooled across the time axis
//! so segment duration never changes the output dimensionality.

mod mel;

use ndarray::Array1;
use tracing::trace;

use crate::align::Segment;
use crate::audio::Signal;
use crate::config::AnalysisConfig;
use crate::error::{Result, ScoreError};

/// Fixed-length cepstral fingerprint for one segment, plus the segment's RMS
/// energy (used downstream to tell "missing sound" from "wrong sound").
#[derive(Debug, Clone)]
pub struct FeatureVector {
    coeffs: Array1<f32>,
    energy: f32,
}

impl FeatureVector {
    pub fn new(coeffs: Array1<f32>, energy: f32) -> Self {
        Self { coeffs, energy }
    }

    pub fn coeffs(&self) -> &Array1<f32> {
        &self.coeffs
    }

    pub fn dim(&self) -> usize {
        self.coeffs.len()
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// A segment with energy under the floor carries no usable voice signal.
    pub fn is_near_silent(&self, floor: f32) -> bool {
        self.energy < floor
    }
}

/// Computes a [`FeatureVector`] per aligned segment.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    sample_rate: u32,
    analysis: AnalysisConfig,
}

impl FeatureExtractor {
    pub fn new(sample_rate: u32, analysis: AnalysisConfig) -> Self {
        Self {
            sample_rate,
            analysis,
        }
    }

    /// Extracts one vector per segment, in segment order.
    pub fn extract_all(&self, signal: &Signal, segments: &[Segment]) -> Result<Vec<FeatureVector>> {
        segments
            .iter()
            .map(|segment| self.extract(signal, segment))
            .collect()
    }

    pub fn extract(&self, signal: &Signal, segment: &Segment) -> Result<FeatureVector> {
        if segment.is_empty() || segment.end > signal.len() {
            return Err(ScoreError::feature_extraction(format!(
                "segment [{}, {}) is outside the {}-sample signal",
                segment.start,
                segment.end,
                signal.len()
            )));
        }

        let slice = &signal.samples()[segment.start..segment.end];
        let energy = rms(slice);

        // Segments shorter than one analysis window are zero-padded
        // symmetrically to guarantee at least one window. Features from such
        // segments lean on very little signal; the energy floor downstream
        // keeps truly silent ones from being scored.
        let window = mel::window_samples(self.sample_rate, &self.analysis);
        let padded = pad_to_window(slice, window);

        let frames = mel::mfcc_frames(padded, self.sample_rate, &self.analysis);
        let coeffs = mean_pool(&frames, self.analysis.mfcc_count)?;
        trace!(
            phoneme = %segment.phoneme,
            samples = slice.len(),
            frames = frames.len(),
            energy,
            "extracted segment features"
        );
        Ok(FeatureVector::new(coeffs, energy))
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let energy: f32 = samples.iter().map(|s| s * s).sum();
    (energy / samples.len() as f32).sqrt()
}

fn pad_to_window(slice: &[f32], window: usize) -> Vec<f64> {
    let mut padded = Vec::with_capacity(slice.len().max(window));
    if slice.len() < window {
        let deficit = window - slice.len();
        padded.extend(std::iter::repeat(0.0).take(deficit / 2));
        padded.extend(slice.iter().map(|&s| s as f64));
        padded.extend(std::iter::repeat(0.0).take(deficit - deficit / 2));
    } else {
        padded.extend(slice.iter().map(|&s| s as f64));
    }
    padded
}

/// Reduces variable-length MFCC frame sequences to one fixed vector by
/// arithmetic mean over the time axis. NaN or infinite coefficients are a
/// detectable error state, never a silent score.
fn mean_pool(frames: &[Vec<f64>], dim: usize) -> Result<Array1<f32>> {
    if frames.is_empty() {
        return Err(ScoreError::feature_extraction(
            "analysis produced no frames for segment",
        ));
    }

    let mut pooled = vec![0.0f64; dim];
    for frame in frames {
        if frame.len() != dim {
            return Err(ScoreError::feature_extraction(format!(
                "frame has {} coefficients, expected {dim}",
                frame.len()
            )));
        }
        for (acc, value) in pooled.iter_mut().zip(frame.iter()) {
            *acc += value;
        }
    }

    let count = frames.len() as f64;
    let coeffs: Vec<f32> = pooled.iter().map(|sum| (sum / count) as f32).collect();
    if coeffs.iter().any(|c| !c.is_finite()) {
        return Err(ScoreError::feature_extraction(
            "pooled coefficients contain NaN or infinity",
        ));
    }
    Ok(Array1::from_vec(coeffs))
}

#[cfg(test)]
mod tests {
    use super::{mean_pool, pad_to_window, rms, FeatureExtractor, FeatureVector};
    use crate::align::Segment;
    use crate::audio::Signal;
    use crate::config::AnalysisConfig;
    use crate::error::ScoreError;
    use crate::phoneme::Phoneme;
    use ndarray::Array1;

    const RATE: u32 = 16_000;

    fn tone(len: usize, step: f32) -> Vec<f32> {
        (0..len).map(|i| (i as f32 * step).sin() * 0.8).collect()
    }

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(RATE, AnalysisConfig::default())
    }

    #[test]
    fn extraction_yields_fixed_dimensionality() {
        let signal = Signal::new(tone(16_000, 0.3), RATE);
        let short = Segment {
            phoneme: Phoneme::T,
            start: 0,
            end: 1_600,
        };
        let long = Segment {
            phoneme: Phoneme::Ae,
            start: 1_600,
            end: 16_000,
        };

        let extractor = extractor();
        let a = extractor.extract(&signal, &short).unwrap();
        let b = extractor.extract(&signal, &long).unwrap();
        assert_eq!(a.dim(), 13);
        assert_eq!(b.dim(), 13);
    }

    #[test]
    fn sub_window_segment_is_padded_not_rejected() {
        let signal = Signal::new(tone(16_000, 0.3), RATE);
        // 5 ms segment, well under the 25 ms window.
        let tiny = Segment {
            phoneme: Phoneme::T,
            start: 0,
            end: 80,
        };
        let vector = extractor().extract(&signal, &tiny).unwrap();
        assert_eq!(vector.dim(), 13);
    }

    #[test]
    fn out_of_range_segment_is_an_error() {
        let signal = Signal::new(tone(1_000, 0.3), RATE);
        let segment = Segment {
            phoneme: Phoneme::T,
            start: 500,
            end: 2_000,
        };
        let err = extractor().extract(&signal, &segment).unwrap_err();
        assert!(matches!(err, ScoreError::FeatureExtraction { .. }));
    }

    #[test]
    fn silent_segment_reports_near_silence() {
        let mut samples = tone(16_000, 0.3);
        for sample in samples.iter_mut().take(3_200) {
            *sample = 0.0;
        }
        let signal = Signal::new(samples, RATE);
        let silent = Segment {
            phoneme: Phoneme::Dh,
            start: 0,
            end: 3_200,
        };
        let vector = extractor().extract(&signal, &silent).unwrap();
        assert!(vector.is_near_silent(1e-3));
    }

    #[test]
    fn pad_centers_short_slices() {
        let padded = pad_to_window(&[1.0, 1.0], 6);
        assert_eq!(padded, vec![0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn mean_pool_averages_frames() {
        let frames = vec![vec![1.0, 3.0], vec![3.0, 5.0]];
        let pooled = mean_pool(&frames, 2).unwrap();
        assert_eq!(pooled, Array1::from_vec(vec![2.0, 4.0]));
    }

    #[test]
    fn mean_pool_rejects_non_finite_values() {
        let frames = vec![vec![f64::NAN, 1.0]];
        assert!(mean_pool(&frames, 2).is_err());
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0, 0.0, 0.0]), 0.0);
        let _ = FeatureVector::new(Array1::zeros(13), 0.0);
    }
}
