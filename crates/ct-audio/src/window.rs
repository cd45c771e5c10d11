//! Hamming window applied to each frame before the transform.

use std::f64::consts::PI;

/// Hamming coefficients `0.54 - 0.46 cos(2πn / (N - 1))`.
///
/// Windows shorter than 2 samples are all ones.
///
/// # Example
/// ```
/// use ct_audio::hamming;
/// let w = hamming(5);
/// assert!((w[0] - 0.08).abs() < 1e-6);
/// assert!((w[2] - 1.0).abs() < 1e-6);
/// ```
#[must_use]
pub fn hamming(len: usize) -> Vec<f32> {
    if len < 2 {
        return vec![1.0; len];
    }
    let denom = (len - 1) as f64;
    (0..len)
        .map(|n| (0.54 - 0.46 * (2.0 * PI * n as f64 / denom).cos()) as f32)
        .collect()
}

/// Multiply a frame by a Hamming window of the same length.
#[must_use]
pub fn apply_window(frame: &[f32]) -> Vec<f32> {
    frame
        .iter()
        .zip(hamming(frame.len()))
        .map(|(&s, w)| s * w)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hamming_is_symmetric() {
        let w = hamming(64);
        for n in 0..32 {
            assert!((w[n] - w[63 - n]).abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_windows_are_identity() {
        assert!(hamming(0).is_empty());
        assert_eq!(apply_window(&[3.0]), vec![3.0]);
    }

    #[test]
    fn apply_window_keeps_length_and_tapers_edges() {
        let out = apply_window(&[1.0; 9]);
        assert_eq!(out.len(), 9);
        assert!((out[0] - 0.08).abs() < 1e-6);
        assert!((out[4] - 1.0).abs() < 1e-6);
    }
}
