//! End-to-end formant analysis and cepstral cutoff tuning.

pub mod pipeline;
pub mod tune;

pub use pipeline::{Analysis, CepstralFrames, Pipeline, analyze, mean_formants, track_formants};
pub use tune::{
    CutoffScore, ScoreOutcome, TuningReport, TuningResult, formant_error, tune, tune_report,
};
