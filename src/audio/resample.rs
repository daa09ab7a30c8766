/// Linearly resample `samples` from `source_rate` to `target_rate`.
///
/// Both rates must be positive; the preprocessor validates them before
/// calling. Linear interpolation is plenty for speech analysis at the rates
/// involved and keeps the stage deterministic.
pub fn linear_resample(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    debug_assert!(source_rate > 0 && target_rate > 0);
    if samples.is_empty() || source_rate == target_rate {
        return samples.to_vec();
    }

    let step = source_rate as f64 / target_rate as f64;
    let output_len = ((samples.len() as f64 / step).ceil() as usize).max(1);
    let last = samples.len() - 1;

    (0..output_len)
        .map(|i| {
            let position = i as f64 * step;
            let left = (position.floor() as usize).min(last);
            let right = (left + 1).min(last);
            let frac = (position - left as f64) as f32;
            samples[left] * (1.0 - frac) + samples[right] * frac
        })
        .collect()
}
