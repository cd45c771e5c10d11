//! Analysis configuration, loaded from TOML.
//!
//! Every field has a default so a partial file (or none at all) is valid.
//! Sections:
//! - top level: framing, cepstral cutoff, peak picking
//! - `[tracker]`: clustering or class-based tracking
//! - `[tuner]`: cutoff search range and execution

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Log-spectrum flavour fed to the cepstrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumScale {
    /// `log10 |X|`
    #[default]
    Magnitude,
    /// `log10 |X|²`, twice the magnitude cepstrum.
    Power,
}

/// Peak picking rule on the smoothed envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakMode {
    /// Strict local maxima only; flat tops are never reported.
    #[default]
    Strict,
    /// Also report the midpoint of a flat top.
    PlateauMidpoint,
}

/// Cross-frame linking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerMode {
    /// Greedy nearest-neighbor chaining in the time/frequency plane.
    #[default]
    Cluster,
    /// Nearest-tail assignment to tracks seeded by the first frame.
    Class,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub mode: TrackerMode,
    /// Scales time against frequency in the chaining distance.
    pub distance_weight: f64,
    /// Largest chaining step before a track is closed.
    pub max_distance: f64,
    /// Tracks with fewer points are ignored when computing mean formants.
    pub min_track_len: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            mode: TrackerMode::Cluster,
            distance_weight: 0.5,
            max_distance: 300.0,
            min_track_len: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Inclusive lower bound of the cutoff scan.
    pub quefrency_min: usize,
    /// Inclusive upper bound of the cutoff scan.
    pub quefrency_max: usize,
    /// Score cutoffs on the rayon pool.
    pub parallel: bool,
    /// Skip cutoffs not started within this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<f64>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            quefrency_min: 10,
            quefrency_max: 150,
            parallel: true,
            timeout_secs: None,
        }
    }
}

/// Full pipeline configuration.
///
/// # Example
/// ```
/// use ct_core::AnalysisConfig;
/// let config = AnalysisConfig::from_toml_str("cutoff_quefrency = 40\n[tracker]\nmax_distance = 150.0\n").unwrap();
/// assert_eq!(config.cutoff_quefrency, 40);
/// assert!((config.frame_duration - 0.1).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Analysis window length in seconds.
    pub frame_duration: f64,
    /// Hop as a fraction of the frame length; `None` means no overlap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hop_fraction: Option<f64>,
    /// Highest quefrency kept by the lifter.
    pub cutoff_quefrency: usize,
    pub spectrum_scale: SpectrumScale,
    pub peak_mode: PeakMode,
    /// Candidates above this frequency (Hz) are discarded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_frequency: Option<f64>,
    pub tracker: TrackerConfig,
    pub tuner: TunerConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_duration: 0.1,
            hop_fraction: None,
            cutoff_quefrency: 35,
            spectrum_scale: SpectrumScale::Magnitude,
            peak_mode: PeakMode::Strict,
            max_frequency: None,
            tracker: TrackerConfig::default(),
            tuner: TunerConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    /// Returns `InvalidParameter` on malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::invalid(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    ///
    /// # Errors
    /// Returns `Io` if the file cannot be read, `InvalidParameter` otherwise.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Serialize back to TOML.
    ///
    /// # Errors
    /// Returns `InvalidParameter` if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::invalid(format!("config: {e}")))
    }

    /// Check every value against its domain.
    ///
    /// # Errors
    /// Returns `InvalidParameter` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_duration.is_finite() || self.frame_duration <= 0.0 {
            return Err(Error::invalid(format!(
                "frame_duration must be positive, got {}",
                self.frame_duration
            )));
        }
        if let Some(h) = self.hop_fraction
            && !(h > 0.0 && h <= 1.0)
        {
            return Err(Error::invalid(format!(
                "hop_fraction must lie in (0, 1], got {h}"
            )));
        }
        if let Some(f) = self.max_frequency
            && !(f.is_finite() && f > 0.0)
        {
            return Err(Error::invalid(format!(
                "max_frequency must be positive, got {f}"
            )));
        }
        let t = &self.tracker;
        if !t.distance_weight.is_finite() || t.distance_weight <= 0.0 {
            return Err(Error::invalid(format!(
                "tracker.distance_weight must be positive, got {}",
                t.distance_weight
            )));
        }
        if !t.max_distance.is_finite() || t.max_distance < 0.0 {
            return Err(Error::invalid(format!(
                "tracker.max_distance must be non-negative, got {}",
                t.max_distance
            )));
        }
        if t.min_track_len == 0 {
            return Err(Error::invalid("tracker.min_track_len must be at least 1"));
        }
        let q = &self.tuner;
        if q.quefrency_min > q.quefrency_max {
            return Err(Error::invalid(format!(
                "tuner range {}..={} is empty",
                q.quefrency_min, q.quefrency_max
            )));
        }
        if let Some(s) = q.timeout_secs
            && !(s > 0.0 && Duration::try_from_secs_f64(s).is_ok())
        {
            return Err(Error::invalid(format!(
                "tuner.timeout_secs must be a positive, representable duration, got {s}"
            )));
        }
        Ok(())
    }
}
