//! Brute-force search for the lifter cutoff that best reproduces known formants.
//!
//! Every integer cutoff of the configured inclusive range is scored by the
//! summed absolute difference between the expected formants and the
//! ascending mean formants the pipeline finds. The objective is piecewise
//! constant in the cutoff, so no ordering or convexity is assumed.
//!
//! Cutoffs yielding fewer tracks than expected formants score
//! `InsufficientData` and lose against any scored cutoff. The winner is the
//! minimum error; ties keep the lowest cutoff. Scoring runs on the rayon
//! pool when `tuner.parallel` is set, with the same winner as a sequential
//! scan.

use std::cmp::Ordering;
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use ct_core::{AnalysisConfig, Error, Result, Waveform};
use rayon::prelude::*;
use serde::Serialize;

use crate::pipeline::{CepstralFrames, Pipeline};

/// Best-so-far `(error, cutoff)` pair. Ordered by error, then cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TuningResult {
    pub error: f64,
    pub cutoff: usize,
}

impl Eq for TuningResult {}

impl PartialOrd for TuningResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TuningResult {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error
            .total_cmp(&other.error)
            .then(self.cutoff.cmp(&other.cutoff))
    }
}

/// What happened to one cutoff during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOutcome {
    Scored(f64),
    /// Fewer tracks than expected formants.
    Insufficient,
    /// Not started before the deadline.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutoffScore {
    pub cutoff: usize,
    pub outcome: ScoreOutcome,
}

/// Winner plus the score of every cutoff, in ascending cutoff order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningReport {
    pub best: TuningResult,
    pub scores: Vec<CutoffScore>,
}

/// `Σ |expected[i] - found[i]|` over the expected formants.
///
/// # Errors
/// Returns `InsufficientData` if fewer formants were found than expected.
///
/// # Example
/// ```
/// use ct_analysis::formant_error;
/// let e = formant_error(&[500.0, 1500.0], &[480.0, 1550.0, 2600.0]).unwrap();
/// assert!((e - 70.0).abs() < 1e-9);
/// assert!(formant_error(&[500.0, 1500.0], &[480.0]).is_err());
/// ```
pub fn formant_error(expected: &[f64], found: &[f64]) -> Result<f64> {
    if found.len() < expected.len() {
        return Err(Error::insufficient(format!(
            "found {} formants, expected {}",
            found.len(),
            expected.len()
        )));
    }
    Ok(expected.iter().zip(found).map(|(e, f)| (e - f).abs()).sum())
}

impl Pipeline {
    /// Error of the mean formants found at `cutoff` against `expected`.
    ///
    /// # Errors
    /// `InsufficientData` if too few tracks are found, `InvalidParameter`
    /// for an out-of-range cutoff.
    pub fn score(&self, frames: &CepstralFrames, expected: &[f64], cutoff: usize) -> Result<f64> {
        let analysis = self.run_prepared(frames, cutoff)?;
        formant_error(expected, &analysis.mean_formants)
    }

    /// Score every cutoff of `range` and pick the winner.
    ///
    /// # Errors
    /// `InvalidParameter` for an empty or out-of-range `range` or empty
    /// `expected`; `InsufficientData` if no cutoff finds enough formants;
    /// `DeadlineExceeded` if the deadline passes before anything is scored.
    pub fn tune(
        &self,
        waveform: &Waveform,
        expected: &[f64],
        range: RangeInclusive<usize>,
    ) -> Result<TuningReport> {
        let started = Instant::now();
        let deadline = self
            .config()
            .tuner
            .timeout_secs
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
            .and_then(|d| started.checked_add(d));

        if expected.is_empty() || expected.iter().any(|f| !f.is_finite()) {
            return Err(Error::invalid(
                "expected formants must be a non-empty list of finite frequencies",
            ));
        }
        if range.is_empty() {
            return Err(Error::invalid(format!(
                "cutoff range {}..={} is empty",
                range.start(),
                range.end()
            )));
        }

        let frames = self.prepare(waveform)?;
        if *range.end() >= frames.cepstrum_len() {
            return Err(Error::invalid(format!(
                "cutoff range ends at {}, beyond cepstrum length {}",
                range.end(),
                frames.cepstrum_len()
            )));
        }

        let evaluate = |cutoff: usize| -> Result<CutoffScore> {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(CutoffScore {
                    cutoff,
                    outcome: ScoreOutcome::Skipped,
                });
            }
            let outcome = match self.score(&frames, expected, cutoff) {
                Ok(error) => ScoreOutcome::Scored(error),
                Err(e) if e.is_insufficient_data() => ScoreOutcome::Insufficient,
                Err(e) => return Err(e),
            };
            log::debug!("cutoff {cutoff}: {outcome:?}");
            Ok(CutoffScore { cutoff, outcome })
        };

        let scores: Vec<CutoffScore> = if self.config().tuner.parallel {
            range
                .clone()
                .into_par_iter()
                .map(evaluate)
                .collect::<Result<_>>()?
        } else {
            range.clone().map(evaluate).collect::<Result<_>>()?
        };

        let skipped = scores
            .iter()
            .filter(|s| s.outcome == ScoreOutcome::Skipped)
            .count();
        if skipped > 0 {
            log::warn!(
                "Tuning deadline reached: {skipped} of {} cutoffs skipped",
                scores.len()
            );
        }

        let best = scores
            .iter()
            .filter_map(|s| match s.outcome {
                ScoreOutcome::Scored(error) => Some(TuningResult {
                    error,
                    cutoff: s.cutoff,
                }),
                _ => None,
            })
            .min();
        let Some(best) = best else {
            if skipped > 0 {
                return Err(Error::DeadlineExceeded);
            }
            return Err(Error::insufficient(format!(
                "no cutoff in {}..={} yields {} formants",
                range.start(),
                range.end(),
                expected.len()
            )));
        };

        log::info!(
            "Best cutoff {} (error {:.1} Hz) in {}..={} after {:.2?}",
            best.cutoff,
            best.error,
            range.start(),
            range.end(),
            started.elapsed()
        );
        Ok(TuningReport { best, scores })
    }
}

/// Scan the configured range and return the full report.
///
/// # Errors
/// See [`Pipeline::tune`].
pub fn tune_report(
    waveform: &Waveform,
    expected: &[f64],
    config: &AnalysisConfig,
) -> Result<TuningReport> {
    let range = config.tuner.quefrency_min..=config.tuner.quefrency_max;
    Pipeline::new(config.clone())?.tune(waveform, expected, range)
}

/// Cutoff minimizing the formant error over the configured range.
///
/// # Errors
/// See [`Pipeline::tune`].
pub fn tune(waveform: &Waveform, expected: &[f64], config: &AnalysisConfig) -> Result<usize> {
    Ok(tune_report(waveform, expected, config)?.best.cutoff)
}
