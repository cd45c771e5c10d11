//! Cepstral spectral-envelope estimation.
//!
//! The transform size equals the sample rate, so one bin is one Hz:
//! forward FFT → clamped log10 magnitude → inverse FFT (cepstrum) →
//! low-pass lifter → forward FFT magnitude.
//! Transforms are planned once per estimator and reused for every frame.

use std::sync::Arc;

use ct_core::{Error, Result, SpectrumScale};
use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

/// Floor applied to magnitudes before the logarithm.
pub const MAGNITUDE_FLOOR: f32 = 1e-10;

/// Cepstral smoother for one sample rate.
///
/// Holds no per-call state, so a single estimator can be shared by
/// reference across threads.
///
/// # Example
/// ```
/// use ct_audio::EnvelopeEstimator;
/// use ct_core::SpectrumScale;
/// let est = EnvelopeEstimator::new(8000, SpectrumScale::Magnitude).unwrap();
/// let frame = vec![0.5f32; 400];
/// let env = est.envelope(&frame, 30).unwrap();
/// assert_eq!(env.len(), 4001);
/// ```
pub struct EnvelopeEstimator {
    size: usize,
    scale: SpectrumScale,
    forward: Arc<dyn RealToComplex<f32>>,
    inverse: Arc<dyn ComplexToReal<f32>>,
}

impl std::fmt::Debug for EnvelopeEstimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeEstimator")
            .field("size", &self.size)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}

impl EnvelopeEstimator {
    /// Plan forward and inverse transforms of `sample_rate` points.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `sample_rate < 2`.
    pub fn new(sample_rate: u32, scale: SpectrumScale) -> Result<Self> {
        let size = sample_rate as usize;
        if size < 2 {
            return Err(Error::invalid(format!(
                "transform size must be at least 2, got {size}"
            )));
        }
        let mut planner = RealFftPlanner::<f32>::new();
        let forward = planner.plan_fft_forward(size);
        let inverse = planner.plan_fft_inverse(size);
        log::debug!("Planned {size}-point real transforms ({scale:?} cepstrum)");
        Ok(Self {
            size,
            scale,
            forward,
            inverse,
        })
    }

    /// Number of transform points (= sample rate).
    #[must_use]
    pub fn transform_size(&self) -> usize {
        self.size
    }

    /// Length of every cepstrum this estimator produces.
    #[must_use]
    pub fn cepstrum_len(&self) -> usize {
        self.size
    }

    /// Length of every envelope this estimator produces.
    #[must_use]
    pub fn envelope_len(&self) -> usize {
        self.size / 2 + 1
    }

    /// Unsmoothed `log10` spectrum of a frame, zero-padded or truncated
    /// to the transform size.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the transform rejects its buffers.
    pub fn log_magnitude(&self, frame: &[f32]) -> Result<Vec<f32>> {
        let mut input = self.forward.make_input_vec();
        let n = frame.len().min(self.size);
        input[..n].copy_from_slice(&frame[..n]);
        let mut spectrum = self.forward.make_output_vec();
        self.forward
            .process(&mut input, &mut spectrum)
            .map_err(|e| Error::invalid(format!("forward transform: {e}")))?;

        let factor = match self.scale {
            SpectrumScale::Magnitude => 1.0,
            SpectrumScale::Power => 2.0,
        };
        Ok(spectrum
            .iter()
            .map(|c| factor * c.norm().max(MAGNITUDE_FLOOR).log10())
            .collect())
    }

    /// Real cepstrum of a frame: inverse transform of its log spectrum.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if a transform rejects its buffers.
    pub fn cepstrum(&self, frame: &[f32]) -> Result<Vec<f32>> {
        let log_spectrum = self.log_magnitude(frame)?;
        let mut input: Vec<Complex<f32>> =
            log_spectrum.iter().map(|&v| Complex::new(v, 0.0)).collect();
        let mut cepstrum = self.inverse.make_output_vec();
        self.inverse
            .process(&mut input, &mut cepstrum)
            .map_err(|e| Error::invalid(format!("inverse transform: {e}")))?;

        let norm = 1.0 / self.size as f32;
        for c in &mut cepstrum {
            *c *= norm;
        }
        Ok(cepstrum)
    }

    /// Zero every coefficient above `cutoff` and return the magnitude of the
    /// forward transform of what remains.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `cutoff` is not a valid cepstrum index or
    /// if `cepstrum` was not produced at this transform size.
    pub fn lifter_envelope(&self, cepstrum: &[f32], cutoff: usize) -> Result<Vec<f32>> {
        if cepstrum.len() != self.size {
            return Err(Error::invalid(format!(
                "cepstrum has {} coefficients, expected {}",
                cepstrum.len(),
                self.size
            )));
        }
        self.check_cutoff(cutoff)?;

        let mut input = self.forward.make_input_vec();
        input[..=cutoff].copy_from_slice(&cepstrum[..=cutoff]);
        let mut spectrum = self.forward.make_output_vec();
        self.forward
            .process(&mut input, &mut spectrum)
            .map_err(|e| Error::invalid(format!("forward transform: {e}")))?;
        Ok(spectrum.iter().map(|c| c.norm()).collect())
    }

    /// Smoothed envelope of one (already windowed) frame.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `cutoff >= cepstrum_len()`.
    pub fn envelope(&self, frame: &[f32], cutoff: usize) -> Result<Vec<f32>> {
        self.check_cutoff(cutoff)?;
        let cepstrum = self.cepstrum(frame)?;
        self.lifter_envelope(&cepstrum, cutoff)
    }

    fn check_cutoff(&self, cutoff: usize) -> Result<()> {
        if cutoff >= self.size {
            return Err(Error::invalid(format!(
                "cutoff quefrency {cutoff} exceeds cepstrum length {}",
                self.size
            )));
        }
        Ok(())
    }
}

/// One-shot envelope with a freshly planned estimator.
///
/// Prefer [`EnvelopeEstimator`] when processing more than one frame.
///
/// # Errors
/// Returns `InvalidParameter` for a sample rate below 2 or an out-of-range cutoff.
pub fn envelope(frame: &[f32], sample_rate: u32, cutoff_quefrency: usize) -> Result<Vec<f32>> {
    EnvelopeEstimator::new(sample_rate, SpectrumScale::Magnitude)?.envelope(frame, cutoff_quefrency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::apply_window;

    const RATE: u32 = 2000;

    fn voiced_frame(len: usize) -> Vec<f32> {
        // 100 Hz pulse train shaped by a 300 Hz and a 700 Hz resonance.
        let rate = f64::from(RATE);
        let frame: Vec<f32> = (0..len)
            .map(|n| {
                let t = n as f64 / rate;
                let mut s = 0.0;
                for h in 1..10 {
                    let f = 100.0 * f64::from(h);
                    let gain = 1.0 / (1.0 + ((f - 300.0) / 80.0).powi(2))
                        + 0.6 / (1.0 + ((f - 700.0) / 80.0).powi(2));
                    s += gain * (2.0 * std::f64::consts::PI * f * t).sin();
                }
                s as f32
            })
            .collect();
        apply_window(&frame)
    }

    #[test]
    fn envelope_length_ignores_cutoff_and_frame_length() {
        let est = EnvelopeEstimator::new(RATE, SpectrumScale::Magnitude).unwrap();
        for (len, cutoff) in [(100, 5), (200, 40), (3000, 999)] {
            let env = est.envelope(&voiced_frame(len), cutoff).unwrap();
            assert_eq!(env.len(), est.envelope_len());
        }
    }

    #[test]
    fn envelope_is_deterministic() {
        let est = EnvelopeEstimator::new(RATE, SpectrumScale::Magnitude).unwrap();
        let frame = voiced_frame(200);
        let a = est.envelope(&frame, 20).unwrap();
        let b = est.envelope(&frame, 20).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn silent_frame_stays_finite() {
        let env = envelope(&[0.0; 200], RATE, 20).unwrap();
        assert!(env.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn full_cutoff_recovers_log_spectrum() {
        let est = EnvelopeEstimator::new(RATE, SpectrumScale::Magnitude).unwrap();
        let frame = voiced_frame(200);
        let log_mag = est.log_magnitude(&frame).unwrap();
        let env = est.envelope(&frame, est.cepstrum_len() - 1).unwrap();
        for (e, l) in env.iter().zip(&log_mag) {
            assert!((e - l.abs()).abs() < 1e-3, "{e} vs {l}");
        }
    }

    #[test]
    fn zero_cutoff_is_flat() {
        let est = EnvelopeEstimator::new(RATE, SpectrumScale::Magnitude).unwrap();
        let env = est.envelope(&voiced_frame(200), 0).unwrap();
        let first = env[0];
        assert!(env.iter().all(|v| (v - first).abs() < 1e-4));
    }

    #[test]
    fn smoothing_grows_with_lower_cutoff() {
        fn roughness(env: &[f32]) -> f32 {
            env.windows(3)
                .map(|w| (w[0] - 2.0 * w[1] + w[2]).abs())
                .sum()
        }
        let est = EnvelopeEstimator::new(RATE, SpectrumScale::Magnitude).unwrap();
        let frame = voiced_frame(200);
        let coarse = roughness(&est.envelope(&frame, 10).unwrap());
        let fine = roughness(&est.envelope(&frame, 400).unwrap());
        assert!(coarse < fine);
    }

    #[test]
    fn power_scale_doubles_the_cepstrum() {
        let frame = voiced_frame(200);
        let mag = EnvelopeEstimator::new(RATE, SpectrumScale::Magnitude)
            .unwrap()
            .cepstrum(&frame)
            .unwrap();
        let pow = EnvelopeEstimator::new(RATE, SpectrumScale::Power)
            .unwrap()
            .cepstrum(&frame)
            .unwrap();
        for (m, p) in mag.iter().zip(&pow) {
            assert!((2.0 * m - p).abs() < 1e-4);
        }
    }

    #[test]
    fn rejects_cutoff_beyond_cepstrum() {
        let est = EnvelopeEstimator::new(RATE, SpectrumScale::Magnitude).unwrap();
        assert!(matches!(
            est.envelope(&[0.1; 64], RATE as usize),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            est.lifter_envelope(&[0.0; 10], 3),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn rejects_tiny_transform() {
        assert!(EnvelopeEstimator::new(1, SpectrumScale::Magnitude).is_err());
    }
}
