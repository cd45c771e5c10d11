//! Cross-frame formant tracking.
//!
//! Two strategies link per-frame candidates into [`FormantTrack`]s:
//! - [`cluster::ClusterTracker`]: greedy nearest-neighbor chaining in the
//!   time/frequency plane (default)
//! - [`sequential::ClassTracker`]: nearest-tail assignment to tracks seeded by
//!   the first frame

pub mod cluster;
pub mod point;
pub mod sequential;

use ct_core::{Result, TrackerConfig, TrackerMode};

pub use cluster::{ClusterTracker, track};
pub use point::{FormantTrack, FrameCandidates, TfPoint, mean_formants};
pub use sequential::{ClassTracker, track_by_class};

/// Links per-frame candidates into tracks.
pub trait Tracker: Send + Sync {
    /// Build tracks from candidates listed in frame order.
    ///
    /// # Errors
    /// Implementations return `InvalidParameter` for unusable input.
    fn track(&self, frames: &[FrameCandidates]) -> Result<Vec<FormantTrack>>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Build the tracker selected by the configuration.
///
/// # Errors
/// Returns `InvalidParameter` if the clustering parameters are out of range.
///
/// # Example
/// ```
/// use ct_core::TrackerConfig;
/// let tracker = ct_track::from_config(&TrackerConfig::default()).unwrap();
/// assert_eq!(tracker.name(), "cluster");
/// ```
pub fn from_config(config: &TrackerConfig) -> Result<Box<dyn Tracker>> {
    Ok(match config.mode {
        TrackerMode::Cluster => Box::new(ClusterTracker::new(
            config.distance_weight,
            config.max_distance,
        )?),
        TrackerMode::Class => Box::new(ClassTracker),
    })
}
