//! Audio ingestion and preprocessing.
//!
//! Raw recordings arrive in whatever shape the capture side produced
//! (any container, any rate, any channel count). Everything downstream of
//! [`preprocess::AudioPreprocessor`] sees one canonical form: mono f32 at the
//! pipeline sample rate, silence-trimmed and peak-normalized.

pub mod decoder;
pub mod preprocess;
pub mod resample;
pub mod trim;

/// Decoded audio exactly as it came off disk or the microphone:
/// interleaved samples, source rate, source channel count.
#[derive(Debug, Clone)]
pub struct RawAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl RawAudio {
    /// Wraps an already-mono buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            channels: 1,
        }
    }

    /// Averages interleaved channels down to mono. The same reduction is used
    /// for user and reference audio so features stay comparable.
    pub fn downmix(&self) -> Vec<f32> {
        if self.channels <= 1 {
            return self.samples.clone();
        }
        let channels = self.channels as usize;
        self.samples
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    }
}

/// Canonical analysis-ready signal: mono, fixed sample rate, trimmed,
/// peak-normalized. Invariant: non-empty.
#[derive(Debug, Clone)]
pub struct Signal {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Signal {
    /// Wraps samples that are already mono and at the pipeline rate.
    /// Most callers should go through [`preprocess::AudioPreprocessor`].
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        debug_assert!(!samples.is_empty(), "Signal must contain samples");
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> f32 {
        self.samples.len() as f32 * 1000.0 / self.sample_rate as f32
    }
}
