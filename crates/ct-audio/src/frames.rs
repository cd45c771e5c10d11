//! Waveform segmentation into fixed-length analysis frames.
//!
//! A trailing chunk shorter than the frame length is dropped, never padded.

use ct_core::{Error, Result};

/// Frame length and hop, both in samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    pub length: usize,
    pub hop: usize,
}

impl FrameLayout {
    /// Derive the layout from a duration in seconds.
    ///
    /// `hop_fraction = None` gives back-to-back frames.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if the frame would hold fewer than 2 samples,
    /// if `hop_fraction` is outside `(0, 1]`, or if the hop rounds down to 0.
    ///
    /// # Example
    /// ```
    /// use ct_audio::FrameLayout;
    /// let layout = FrameLayout::new(16_000, 0.025, Some(0.5)).unwrap();
    /// assert_eq!((layout.length, layout.hop), (400, 200));
    /// ```
    pub fn new(sample_rate: u32, frame_duration: f64, hop_fraction: Option<f64>) -> Result<Self> {
        if !frame_duration.is_finite() || frame_duration < 0.0 {
            return Err(Error::invalid(format!(
                "frame duration must be a non-negative number of seconds, got {frame_duration}"
            )));
        }
        let length = (f64::from(sample_rate) * frame_duration).floor() as usize;
        if length < 2 {
            return Err(Error::invalid(format!(
                "frame length must be at least 2 samples, got {length} ({sample_rate} Hz x {frame_duration} s)"
            )));
        }
        let hop = match hop_fraction {
            None => length,
            Some(f) if f > 0.0 && f <= 1.0 => (length as f64 * f).floor() as usize,
            Some(f) => {
                return Err(Error::invalid(format!(
                    "hop fraction must lie in (0, 1], got {f}"
                )));
            }
        };
        if hop == 0 {
            return Err(Error::invalid(format!(
                "hop rounds down to 0 samples for frame length {length}"
            )));
        }
        Ok(Self { length, hop })
    }

    /// Number of full frames that fit in `total` samples.
    #[must_use]
    pub fn frame_count(&self, total: usize) -> usize {
        if total < self.length {
            0
        } else {
            (total - self.length) / self.hop + 1
        }
    }
}

/// One analysis window borrowed from the waveform.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Position in the frame sequence.
    pub index: usize,
    /// First sample index in the waveform.
    pub start: usize,
    /// `start / sample_rate`, in seconds.
    pub time: f64,
    pub samples: &'a [f32],
}

/// Split `samples` into frames of `floor(sample_rate * frame_duration)` samples.
///
/// # Errors
/// Same as [`FrameLayout::new`].
///
/// # Example
/// ```
/// use ct_audio::segment;
/// let samples = vec![0.0f32; 25];
/// let frames = segment(&samples, 100, 0.1, None).unwrap();
/// assert_eq!(frames.len(), 2); // 5 trailing samples dropped
/// assert!((frames[1].time - 0.1).abs() < 1e-12);
/// ```
pub fn segment(
    samples: &[f32],
    sample_rate: u32,
    frame_duration: f64,
    hop_fraction: Option<f64>,
) -> Result<Vec<Frame<'_>>> {
    let layout = FrameLayout::new(sample_rate, frame_duration, hop_fraction)?;
    let rate = f64::from(sample_rate);
    let frames: Vec<Frame<'_>> = (0..layout.frame_count(samples.len()))
        .map(|index| {
            let start = index * layout.hop;
            Frame {
                index,
                start,
                time: start as f64 / rate,
                samples: &samples[start..start + layout.length],
            }
        })
        .collect();

    let used = frames.last().map_or(0, |f| f.start + layout.length);
    if used < samples.len() {
        log::debug!(
            "Dropping {} trailing samples shorter than one frame",
            samples.len() - used
        );
    }
    Ok(frames)
}
