//! Integer-factor decimation
//!
//! Decimated sample `i` is original sample `i * factor`, so results can
//! always be mapped back onto the original index space by multiplication.
//! Optional smoothing before subsampling is a centred moving average over
//! valid samples only; missing samples are never mixed into neighbours.

use ndarray::{Array1, ArrayView1};

/// Keep every `factor`-th sample, starting at index 0.
pub fn decimate(signal: ArrayView1<f64>, factor: usize) -> Array1<f64> {
    let factor = factor.max(1);
    signal.iter().step_by(factor).copied().collect()
}

/// Decimate a validity mask the same way as [`decimate`].
pub fn decimate_mask(valid: &[bool], factor: usize) -> Vec<bool> {
    valid.iter().step_by(factor.max(1)).copied().collect()
}

/// Centred moving average of width `width`, using valid samples only.
///
/// Invalid samples keep their original value and stay invalid. A valid
/// sample whose window holds no other valid sample is returned unchanged.
/// Averaging is symmetric around each sample, so no phase shift is added.
pub fn masked_moving_average(signal: ArrayView1<f64>, valid: &[bool], width: usize) -> Array1<f64> {
    let n = signal.len();
    let half = width / 2;
    let mut out = signal.to_owned();

    if width <= 1 {
        return out;
    }

    for i in 0..n {
        if !valid[i] {
            continue;
        }
        let lo = i.saturating_sub(half);
        let hi = (i + half).min(n - 1);
        let (sum, count) = (lo..=hi)
            .filter(|&j| valid[j])
            .fold((0.0, 0usize), |(s, c), j| (s + signal[j], c + 1));
        out[i] = sum / count as f64;
    }
    out
}
