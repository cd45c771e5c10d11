//! Error kinds shared by every analysis stage.

use thiserror::Error;

/// Result alias used across the library crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures raised by the analysis pipeline and its collaborators.
///
/// Stages raise at the point of detection and never return a silently
/// shortened result instead.
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter is outside its valid domain (frame length, hop, cutoff, weight...).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Not enough frames, candidates or tracks to satisfy a requested comparison.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Raised by the decoder; propagated unchanged through the pipeline entry point.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The tuner deadline elapsed before any cutoff could be scored.
    #[error("tuning deadline exceeded before any cutoff was scored")]
    DeadlineExceeded,
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Shorthand for [`Error::InsufficientData`].
    pub fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    /// True for the only failure the tuner recovers from per cutoff.
    #[must_use]
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, Self::InsufficientData(_))
    }
}
