//! Framing → window → cepstrum → lifter → peaks → tracks.
//!
//! The cepstrum of a frame does not depend on the lifter cutoff, so it is
//! computed once ([`CepstralFrames`]) and liftered as many times as needed.

use ct_audio::{EnvelopeEstimator, apply_window, detect_with, segment};
use ct_core::{AnalysisConfig, Error, PeakMode, Result, Waveform};
use ct_track::{FormantTrack, FrameCandidates, Tracker};
use serde::Serialize;

/// Windowed-frame cepstra of one waveform, ready to be liftered.
#[derive(Debug)]
pub struct CepstralFrames {
    estimator: EnvelopeEstimator,
    times: Vec<f64>,
    cepstra: Vec<Vec<f32>>,
    peak_mode: PeakMode,
    max_bin: Option<usize>,
}

impl CepstralFrames {
    /// Segment, window and transform every frame of `waveform`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` for a bad frame layout and
    /// `InsufficientData` if the waveform is shorter than one frame.
    pub fn compute(waveform: &Waveform, config: &AnalysisConfig) -> Result<Self> {
        let frames = segment(
            waveform.samples(),
            waveform.sample_rate(),
            config.frame_duration,
            config.hop_fraction,
        )?;
        if frames.is_empty() {
            return Err(Error::insufficient(format!(
                "waveform of {} samples is shorter than one {} s frame",
                waveform.len(),
                config.frame_duration
            )));
        }

        let estimator = EnvelopeEstimator::new(waveform.sample_rate(), config.spectrum_scale)?;
        let mut times = Vec::with_capacity(frames.len());
        let mut cepstra = Vec::with_capacity(frames.len());
        for frame in &frames {
            times.push(frame.time);
            cepstra.push(estimator.cepstrum(&apply_window(frame.samples))?);
        }
        log::debug!(
            "Computed {} cepstra ({} coefficients each)",
            cepstra.len(),
            estimator.cepstrum_len()
        );

        Ok(Self {
            estimator,
            times,
            cepstra,
            peak_mode: config.peak_mode,
            max_bin: config.max_frequency.map(|f| f.floor() as usize),
        })
    }

    /// Number of analysed frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cepstra.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cepstra.is_empty()
    }

    /// Frame start times in seconds.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Highest valid cutoff + 1.
    #[must_use]
    pub fn cepstrum_len(&self) -> usize {
        self.estimator.cepstrum_len()
    }

    /// Smoothed envelope of every frame at `cutoff`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `cutoff >= cepstrum_len()`.
    pub fn envelopes(&self, cutoff: usize) -> Result<Vec<Vec<f32>>> {
        self.cepstra
            .iter()
            .map(|c| self.estimator.lifter_envelope(c, cutoff))
            .collect()
    }

    /// Formant candidates of every frame at `cutoff`.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if `cutoff >= cepstrum_len()`.
    pub fn candidates(&self, cutoff: usize) -> Result<Vec<FrameCandidates>> {
        self.cepstra
            .iter()
            .zip(&self.times)
            .map(|(c, &time)| {
                let envelope = self.estimator.lifter_envelope(c, cutoff)?;
                let mut bins = detect_with(&envelope, self.peak_mode);
                if let Some(max_bin) = self.max_bin {
                    bins.retain(|&b| b <= max_bin);
                }
                Ok(FrameCandidates { time, bins })
            })
            .collect()
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub cutoff: usize,
    #[serde(skip)]
    pub frames: Vec<FrameCandidates>,
    pub tracks: Vec<FormantTrack>,
    /// Ascending mean frequency of tracks long enough to count.
    pub mean_formants: Vec<f64>,
}

impl Analysis {
    /// Total number of candidates across frames.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.frames.iter().map(|f| f.bins.len()).sum()
    }
}

/// Configured analysis pipeline.
///
/// # Example
/// ```
/// use ct_analysis::Pipeline;
/// use ct_core::{AnalysisConfig, Waveform};
/// let samples: Vec<f32> = (0..8000)
///     .map(|n| (2.0 * std::f32::consts::PI * 440.0 * n as f32 / 8000.0).sin())
///     .collect();
/// let wave = Waveform::new(samples, 8000).unwrap();
/// let pipeline = Pipeline::new(AnalysisConfig::default()).unwrap();
/// let analysis = pipeline.run(&wave).unwrap();
/// assert_eq!(analysis.frames.len(), 10);
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    tracker: Box<dyn Tracker>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("tracker", &self.tracker.name())
            .finish()
    }
}

impl Pipeline {
    /// # Errors
    /// Returns `InvalidParameter` if the configuration does not validate.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let tracker = ct_track::from_config(&config.tracker)?;
        Ok(Self { config, tracker })
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Compute the cutoff-independent part of the analysis.
    ///
    /// # Errors
    /// See [`CepstralFrames::compute`].
    pub fn prepare(&self, waveform: &Waveform) -> Result<CepstralFrames> {
        CepstralFrames::compute(waveform, &self.config)
    }

    /// Lifter at `cutoff`, detect candidates, track and summarize.
    ///
    /// # Errors
    /// Returns `InvalidParameter` for an out-of-range cutoff.
    pub fn run_prepared(&self, frames: &CepstralFrames, cutoff: usize) -> Result<Analysis> {
        let candidates = frames.candidates(cutoff)?;
        let tracks = self.tracker.track(&candidates)?;
        let means = ct_track::mean_formants(&tracks, self.config.tracker.min_track_len);
        log::debug!(
            "cutoff {cutoff}: {} tracks, {} counted ({} tracker)",
            tracks.len(),
            means.len(),
            self.tracker.name()
        );
        Ok(Analysis {
            cutoff,
            frames: candidates,
            tracks,
            mean_formants: means,
        })
    }

    /// Full run at the configured cutoff.
    ///
    /// # Errors
    /// See [`Pipeline::prepare`] and [`Pipeline::run_prepared`].
    pub fn run(&self, waveform: &Waveform) -> Result<Analysis> {
        let frames = self.prepare(waveform)?;
        let analysis = self.run_prepared(&frames, self.config.cutoff_quefrency)?;
        log::info!(
            "Analysed {} frames: {} candidates, {} tracks",
            analysis.frames.len(),
            analysis.candidate_count(),
            analysis.tracks.len()
        );
        Ok(analysis)
    }
}

/// Tracks of `waveform` under `config`.
///
/// # Errors
/// See [`Pipeline::run`].
pub fn track_formants(waveform: &Waveform, config: &AnalysisConfig) -> Result<Vec<FormantTrack>> {
    Ok(Pipeline::new(config.clone())?.run(waveform)?.tracks)
}

/// Ascending mean formant frequencies of `waveform` under `config`.
///
/// # Errors
/// See [`Pipeline::run`].
pub fn mean_formants(waveform: &Waveform, config: &AnalysisConfig) -> Result<Vec<f64>> {
    Ok(Pipeline::new(config.clone())?.run(waveform)?.mean_formants)
}

/// Full analysis of `waveform` under `config`.
///
/// # Errors
/// See [`Pipeline::run`].
pub fn analyze(waveform: &Waveform, config: &AnalysisConfig) -> Result<Analysis> {
    Pipeline::new(config.clone())?.run(waveform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_core::TrackerMode;

    fn tone(freq: f32, rate: u32, len: usize) -> Waveform {
        let samples: Vec<f32> = (0..len)
            .map(|n| (2.0 * std::f32::consts::PI * freq * n as f32 / rate as f32).sin())
            .collect();
        Waveform::new(samples, rate).unwrap()
    }

    #[test]
    fn short_waveform_is_insufficient_data() {
        let wave = Waveform::new(vec![0.0f32; 50], 1000).unwrap();
        assert!(matches!(
            analyze(&wave, &AnalysisConfig::default()),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn out_of_range_cutoff_is_rejected() {
        let config = AnalysisConfig {
            cutoff_quefrency: 5000,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            analyze(&tone(200.0, 1000, 1000), &config),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn frame_times_follow_the_hop() {
        let config = AnalysisConfig {
            hop_fraction: Some(0.5),
            ..AnalysisConfig::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        let frames = pipeline.prepare(&tone(200.0, 1000, 1000)).unwrap();
        assert_eq!(frames.len(), 19);
        assert!((frames.times()[1] - 0.05).abs() < 1e-12);
    }

    #[test]
    fn candidates_are_interior_bins() {
        let pipeline = Pipeline::new(AnalysisConfig::default()).unwrap();
        let frames = pipeline.prepare(&tone(200.0, 1000, 1000)).unwrap();
        let env_len = frames.envelopes(35).unwrap()[0].len();
        for frame in frames.candidates(35).unwrap() {
            assert!(frame.bins.iter().all(|&b| b > 0 && b < env_len - 1));
            assert!(frame.bins.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn max_frequency_limits_candidates() {
        let config = AnalysisConfig {
            max_frequency: Some(100.0),
            ..AnalysisConfig::default()
        };
        let analysis = analyze(&tone(200.0, 1000, 1000), &config).unwrap();
        assert!(
            analysis
                .frames
                .iter()
                .flat_map(|f| &f.bins)
                .all(|&b| b <= 100)
        );
    }

    #[test]
    fn run_is_reproducible() {
        let wave = tone(150.0, 2000, 2000);
        let a = analyze(&wave, &AnalysisConfig::default()).unwrap();
        let b = analyze(&wave, &AnalysisConfig::default()).unwrap();
        assert_eq!(a.tracks, b.tracks);
        assert_eq!(a.mean_formants, b.mean_formants);
    }

    #[test]
    fn class_tracker_tracks_never_exceed_seed_count() {
        let mut config = AnalysisConfig::default();
        config.tracker.mode = TrackerMode::Class;
        let analysis = analyze(&tone(150.0, 2000, 2000), &config).unwrap();
        let seeds = analysis
            .frames
            .iter()
            .find(|f| !f.bins.is_empty())
            .map_or(0, |f| f.bins.len());
        assert_eq!(analysis.tracks.len(), seeds);
        let assigned: usize = analysis.tracks.iter().map(FormantTrack::len).sum();
        assert_eq!(assigned, analysis.candidate_count());
    }
}
