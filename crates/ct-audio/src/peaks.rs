//! Formant candidate detection on a smoothed envelope.

use ct_core::PeakMode;

/// Interior indices strictly greater than both neighbors, ascending.
///
/// Flat tops are not reported; see [`detect_plateau_aware`].
///
/// # Example
/// ```
/// use ct_audio::detect;
/// assert_eq!(detect(&[0.0, 1.0, 0.0, 1.0, 0.0]), vec![1, 3]);
/// assert!(detect(&[1.0, 2.0, 3.0, 4.0]).is_empty());
/// ```
#[must_use]
pub fn detect(envelope: &[f32]) -> Vec<usize> {
    envelope
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Like [`detect`], but a maximal run of equal values whose outer neighbors
/// are both lower reports its midpoint `(first + last) / 2`.
///
/// # Example
/// ```
/// use ct_audio::detect_plateau_aware;
/// assert_eq!(detect_plateau_aware(&[0.0, 2.0, 2.0, 2.0, 0.0]), vec![2]);
/// ```
#[must_use]
#[allow(clippy::float_cmp)] // plateaus are runs of bit-equal values
pub fn detect_plateau_aware(envelope: &[f32]) -> Vec<usize> {
    let n = envelope.len();
    let mut peaks = Vec::new();
    let mut i = 1;
    while i + 1 < n {
        if envelope[i] > envelope[i - 1] {
            let mut last = i;
            while last + 1 < n && envelope[last + 1] == envelope[i] {
                last += 1;
            }
            if last + 1 < n && envelope[last + 1] < envelope[i] {
                peaks.push((i + last) / 2);
            }
            i = last + 1;
        } else {
            i += 1;
        }
    }
    peaks
}

/// Dispatch on the configured peak rule.
#[must_use]
pub fn detect_with(envelope: &[f32], mode: PeakMode) -> Vec<usize> {
    match mode {
        PeakMode::Strict => detect(envelope),
        PeakMode::PlateauMidpoint => detect_plateau_aware(envelope),
    }
}
