//! Immutable mono sample buffer shared by every analysis stage.

use std::sync::Arc;

use crate::error::{Error, Result};

/// Decoded mono waveform.
///
/// Samples are `f32` normalized to `[-1, 1]`. The buffer is shared behind an
/// `Arc` and never mutated, so clones are cheap and safe to hand to worker
/// threads.
///
/// # Example
/// ```
/// use ct_core::Waveform;
/// let wave = Waveform::new(vec![0.0f32, 0.5, -0.5], 8000).unwrap();
/// assert_eq!(wave.len(), 3);
/// assert_eq!(wave.sample_rate(), 8000);
/// ```
#[derive(Debug, Clone)]
pub struct Waveform {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap decoded samples.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `sample_rate` is zero or a sample is
    /// NaN or infinite.
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::invalid("sample rate must be positive"));
        }
        let samples: Arc<[f32]> = samples.into();
        if let Some(i) = samples.iter().position(|s| !s.is_finite()) {
            return Err(Error::invalid(format!(
                "sample {i} is not finite ({})",
                samples[i]
            )));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}
