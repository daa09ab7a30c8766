use aus::analysis;
use aus::analysis::mel::MelFilterbank;
use aus::spectrum;
use aus::WindowType;

use crate::config::AnalysisConfig;

/// Computes per-window MFCC frames for one segment of samples.
///
/// Window, hop, and filterbank parameters come from the shared
/// [`AnalysisConfig`]; user and reference features must be computed on the
/// identical scale or scores silently drift.
pub(crate) fn mfcc_frames(
    samples: Vec<f64>,
    sample_rate: u32,
    config: &AnalysisConfig,
) -> Vec<Vec<f64>> {
    let fft_size = ((sample_rate as usize * config.window_ms) / 1000).max(1);
    let hop_size = ((sample_rate as usize * config.hop_ms) / 1000).max(1);

    let stft = spectrum::rstft(&samples, fft_size, hop_size, WindowType::Hanning);
    let (magnitude, _) = spectrum::complex_to_polar_rstft(&stft);
    let power = analysis::make_power_spectrogram(&magnitude);

    let freqs = spectrum::rfftfreq(fft_size, sample_rate);
    let filterbank = MelFilterbank::new(
        config.min_freq,
        (sample_rate as f64) / 2.0,
        config.mel_bands,
        &freqs,
        true,
    );
    let mel = analysis::mel::make_mel_spectrogram(&power, &filterbank);
    analysis::mel::mfcc_spectrogram(&mel, config.mfcc_count, None)
}

/// Number of samples in one analysis window.
pub(crate) fn window_samples(sample_rate: u32, config: &AnalysisConfig) -> usize {
    ((sample_rate as usize * config.window_ms) / 1000).max(1)
}
