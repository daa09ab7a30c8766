use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{Result, ScoreError};

use super::resample::linear_resample;
use super::trim::voiced_range;
use super::{RawAudio, Signal};

/// Normalizes raw recordings into the pipeline's canonical [`Signal`].
///
/// Deterministic given identical input bytes and configuration:
/// downmix to mono (channel average), resample once to the pipeline rate,
/// trim leading/trailing silence, peak-normalize.
#[derive(Debug, Clone)]
pub struct AudioPreprocessor {
    config: PipelineConfig,
}

impl AudioPreprocessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn preprocess(&self, raw: &RawAudio) -> Result<Signal> {
        let mono = raw.downmix();
        let resampled = if raw.sample_rate == self.config.sample_rate {
            mono
        } else {
            linear_resample(&mono, raw.sample_rate, self.config.sample_rate)
        };

        let range = voiced_range(&resampled, self.config.sample_rate, &self.config.trim)
            .ok_or(ScoreError::EmptyAudio {
                trimmed_ms: 0.0,
                min_ms: self.config.min_voiced_ms,
            })?;
        let trimmed = &resampled[range];

        let trimmed_ms = trimmed.len() as f32 * 1000.0 / self.config.sample_rate as f32;
        if trimmed_ms < self.config.min_voiced_ms {
            return Err(ScoreError::EmptyAudio {
                trimmed_ms,
                min_ms: self.config.min_voiced_ms,
            });
        }

        let samples = peak_normalize(trimmed);
        debug!(
            input_samples = raw.samples.len(),
            input_rate = raw.sample_rate,
            channels = raw.channels,
            voiced_samples = samples.len(),
            voiced_ms = trimmed_ms,
            "preprocessed recording"
        );
        Ok(Signal::new(samples, self.config.sample_rate))
    }
}

/// Scales the buffer so its peak magnitude is 1.0, removing loudness bias
/// between speakers. The trim stage guarantees a non-zero peak here.
fn peak_normalize(samples: &[f32]) -> Vec<f32> {
    let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
    if peak <= f32::EPSILON {
        return samples.to_vec();
    }
    samples.iter().map(|s| s / peak).collect()
}

#[cfg(test)]
mod tests {
    use super::AudioPreprocessor;
    use crate::audio::RawAudio;
    use crate::config::PipelineConfig;
    use crate::error::ScoreError;

    fn preprocessor() -> AudioPreprocessor {
        AudioPreprocessor::new(PipelineConfig::default())
    }

    fn tone(duration_ms: usize, rate: u32, amplitude: f32) -> Vec<f32> {
        let len = duration_ms * rate as usize / 1000;
        (0..len)
            .map(|i| amplitude * (i as f32 * 0.3).sin())
            .collect()
    }

    #[test]
    fn all_zero_audio_is_rejected() {
        let raw = RawAudio::mono(vec![0.0; 16_000], 16_000);
        let err = preprocessor().preprocess(&raw).unwrap_err();
        assert!(matches!(err, ScoreError::EmptyAudio { .. }));
    }

    #[test]
    fn near_silent_audio_below_minimum_is_rejected() {
        // 50 ms of tone is voiced but under the 100 ms minimum.
        let raw = RawAudio::mono(tone(50, 16_000, 0.5), 16_000);
        let err = preprocessor().preprocess(&raw).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::EmptyAudio { trimmed_ms, .. } if trimmed_ms > 0.0
        ));
    }

    #[test]
    fn voiced_audio_is_normalized_to_unit_peak() {
        let raw = RawAudio::mono(tone(500, 16_000, 0.25), 16_000);
        let signal = preprocessor().preprocess(&raw).unwrap();
        let peak = signal
            .samples()
            .iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));
        assert!((peak - 1.0).abs() < 1e-6);
        assert_eq!(signal.sample_rate(), 16_000);
    }

    #[test]
    fn resamples_foreign_rates_to_pipeline_rate() {
        let raw = RawAudio::mono(tone(500, 48_000, 0.5), 48_000);
        let signal = preprocessor().preprocess(&raw).unwrap();
        assert_eq!(signal.sample_rate(), 16_000);
        assert!(signal.duration_ms() > 400.0);
    }

    #[test]
    fn preprocessing_is_deterministic() {
        let raw = RawAudio::mono(tone(500, 16_000, 0.5), 16_000);
        let pre = preprocessor();
        let a = pre.preprocess(&raw).unwrap();
        let b = pre.preprocess(&raw).unwrap();
        assert_eq!(a.samples(), b.samples());
    }
}
