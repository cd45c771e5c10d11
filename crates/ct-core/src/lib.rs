//! Shared types, errors and configuration for cepstrack.

pub mod config;
pub mod error;
pub mod waveform;

pub use config::{
    AnalysisConfig, PeakMode, SpectrumScale, TrackerConfig, TrackerMode, TunerConfig,
};
pub use error::{Error, Result};
pub use waveform::Waveform;
