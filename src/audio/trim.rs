use std::ops::Range;

use crate::config::TrimConfig;

/// Locates the voiced span of `samples` by per-frame RMS energy.
///
/// Returns the half-open sample range from the first voiced frame to the end
/// of the last voiced frame, or `None` when no frame clears the threshold.
pub fn voiced_range(samples: &[f32], sample_rate: u32, config: &TrimConfig) -> Option<Range<usize>> {
    if samples.is_empty() {
        return None;
    }
    let frame_len = ((config.frame_ms / 1000.0 * sample_rate as f32).round() as usize).max(1);

    let mut first_voiced = None;
    let mut last_voiced = None;
    for (index, frame) in samples.chunks(frame_len).enumerate() {
        if frame_rms(frame) >= config.threshold {
            first_voiced.get_or_insert(index);
            last_voiced = Some(index);
        }
    }

    let (first, last) = (first_voiced?, last_voiced?);
    let start = first * frame_len;
    let end = ((last + 1) * frame_len).min(samples.len());
    Some(start..end)
}

fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let energy: f32 = frame.iter().map(|s| s * s).sum();
    (energy / frame.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::voiced_range;
    use crate::config::TrimConfig;

    const RATE: u32 = 16_000;

    fn config() -> TrimConfig {
        TrimConfig {
            threshold: 0.01,
            frame_ms: 10.0,
        }
    }

    #[test]
    fn silence_yields_none() {
        let samples = vec![0.0; RATE as usize];
        assert!(voiced_range(&samples, RATE, &config()).is_none());
    }

    #[test]
    fn trims_leading_and_trailing_silence() {
        // 100 ms silence, 200 ms tone, 100 ms silence.
        let frame = (0.010 * RATE as f32) as usize;
        let mut samples = vec![0.0; 10 * frame];
        samples.extend(vec![0.5; 20 * frame]);
        samples.extend(vec![0.0; 10 * frame]);

        let range = voiced_range(&samples, RATE, &config()).unwrap();
        assert_eq!(range.start, 10 * frame);
        assert_eq!(range.end, 30 * frame);
    }

    #[test]
    fn voiced_everywhere_keeps_whole_signal() {
        let samples = vec![0.3; RATE as usize];
        let range = voiced_range(&samples, RATE, &config()).unwrap();
        assert_eq!(range, 0..samples.len());
    }
}
