//! Pipeline configuration with serde-friendly defaults.
//!
//! Every knob has a default matching the bundled reference table, so an
//! empty JSON object deserializes to a working configuration. Callers that
//! override values must pass the result through [`PipelineConfig::validate`]
//! before building a pipeline; construction does this automatically.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Result, ScoreError};
use crate::phoneme::Phoneme;

/// Silence-trimming parameters for the preprocessor.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TrimConfig {
    /// Per-frame RMS below this is treated as silence.
    pub threshold: f32,
    /// Frame length for the energy scan, in milliseconds.
    pub frame_ms: f32,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            threshold: 0.01,
            frame_ms: 10.0,
        }
    }
}

/// Spectral analysis parameters shared by user-side feature extraction and
/// any offline regeneration of the reference table.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis window length in milliseconds.
    pub window_ms: usize,
    /// Hop between successive windows in milliseconds.
    pub hop_ms: usize,
    /// Number of mel filterbank bands.
    pub mel_bands: usize,
    /// Lower edge of the filterbank in Hz.
    pub min_freq: f64,
    /// Cepstral coefficients kept per frame; also the fingerprint dimension.
    pub mfcc_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_ms: 25,
            hop_ms: 10,
            mel_bands: 80,
            min_freq: 20.0,
            mfcc_count: 13,
        }
    }
}

/// Score bands for per-phoneme classification.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    /// Scores at or above this are `good`.
    pub good: f32,
    /// Scores at or above this (but below `good`) are `weak`.
    pub weak: f32,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            good: 80.0,
            weak: 50.0,
        }
    }
}

/// Full configuration for one [`crate::pipeline::ScoringPipeline`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Internal processing rate; all input is resampled to this.
    pub sample_rate: u32,
    pub trim: TrimConfig,
    /// Minimum voiced duration after trimming, in milliseconds.
    pub min_voiced_ms: f32,
    /// Minimum per-phoneme segment length, in milliseconds.
    pub min_segment_ms: f32,
    pub analysis: AnalysisConfig,
    pub thresholds: ClassificationThresholds,
    /// Segment RMS below this floor classifies the phoneme as missing.
    pub silence_floor: f32,
    /// Optional per-phoneme weights for the aggregate score.
    pub difficulty_weights: Option<HashMap<Phoneme, f32>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            trim: TrimConfig::default(),
            min_voiced_ms: 100.0,
            min_segment_ms: 10.0,
            analysis: AnalysisConfig::default(),
            thresholds: ClassificationThresholds::default(),
            silence_floor: 1e-3,
            difficulty_weights: None,
        }
    }
}

impl PipelineConfig {
    /// Rejects configurations that would make later stages misbehave rather
    /// than fail cleanly.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ScoreError::invalid_config("sample_rate must be non-zero"));
        }
        if !(self.trim.threshold.is_finite() && self.trim.threshold >= 0.0) {
            return Err(ScoreError::invalid_config(
                "trim.threshold must be finite and non-negative",
            ));
        }
        if !(self.trim.frame_ms.is_finite() && self.trim.frame_ms > 0.0) {
            return Err(ScoreError::invalid_config("trim.frame_ms must be positive"));
        }
        if !(self.min_voiced_ms.is_finite() && self.min_voiced_ms > 0.0) {
            return Err(ScoreError::invalid_config("min_voiced_ms must be positive"));
        }
        if !(self.min_segment_ms.is_finite() && self.min_segment_ms > 0.0) {
            return Err(ScoreError::invalid_config("min_segment_ms must be positive"));
        }
        if self.analysis.window_ms == 0 || self.analysis.hop_ms == 0 {
            return Err(ScoreError::invalid_config(
                "analysis window_ms and hop_ms must be positive",
            ));
        }
        if self.analysis.hop_ms > self.analysis.window_ms {
            return Err(ScoreError::invalid_config(
                "analysis hop_ms must not exceed window_ms",
            ));
        }
        if self.analysis.mel_bands == 0 {
            return Err(ScoreError::invalid_config("mel_bands must be positive"));
        }
        if self.analysis.mfcc_count == 0 || self.analysis.mfcc_count > self.analysis.mel_bands {
            return Err(ScoreError::invalid_config(
                "mfcc_count must be positive and at most mel_bands",
            ));
        }
        if !(self.analysis.min_freq.is_finite()
            && self.analysis.min_freq >= 0.0
            && self.analysis.min_freq < (self.sample_rate as f64) / 2.0)
        {
            return Err(ScoreError::invalid_config(
                "analysis.min_freq must lie below the Nyquist frequency",
            ));
        }
        if !(0.0..=100.0).contains(&self.thresholds.weak)
            || !(0.0..=100.0).contains(&self.thresholds.good)
            || self.thresholds.weak > self.thresholds.good
        {
            return Err(ScoreError::invalid_config(
                "thresholds must satisfy 0 <= weak <= good <= 100",
            ));
        }
        if !(self.silence_floor.is_finite() && self.silence_floor >= 0.0) {
            return Err(ScoreError::invalid_config(
                "silence_floor must be finite and non-negative",
            ));
        }
        if let Some(weights) = &self.difficulty_weights {
            for (phoneme, weight) in weights {
                if !(weight.is_finite() && *weight > 0.0) {
                    return Err(ScoreError::invalid_config(format!(
                        "difficulty weight for {phoneme} must be positive"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Minimum segment length expressed in samples at the pipeline rate.
    pub fn min_segment_samples(&self) -> usize {
        ((self.min_segment_ms / 1000.0 * self.sample_rate as f32).round() as usize).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::PipelineConfig;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.min_segment_samples(), 160);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let config: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.analysis.mfcc_count, 13);
        config.validate().unwrap();
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"thresholds": {"good": 90.0}}"#).unwrap();
        assert_eq!(config.thresholds.good, 90.0);
        assert_eq!(config.thresholds.weak, 50.0);
        assert_eq!(config.sample_rate, 16_000);
    }

    #[test]
    fn zero_sample_rate_rejected() {
        let config = PipelineConfig {
            sample_rate: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let mut config = PipelineConfig::default();
        config.thresholds.weak = 90.0;
        config.thresholds.good = 60.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn hop_larger_than_window_rejected() {
        let mut config = PipelineConfig::default();
        config.analysis.hop_ms = 40;
        assert!(config.validate().is_err());
    }

    #[test]
    fn difficulty_weights_must_be_positive() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"difficulty_weights": {"TH": 0.0}}"#).unwrap();
        assert!(config.validate().is_err());
    }
}
