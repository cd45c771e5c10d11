//! Per-frame signal processing: framing, windowing, cepstral envelope and peak picking.

pub mod cepstrum;
pub mod frames;
pub mod peaks;
pub mod window;

pub use cepstrum::{EnvelopeEstimator, envelope};
pub use frames::{Frame, FrameLayout, segment};
pub use peaks::{detect, detect_plateau_aware, detect_with};
pub use window::{apply_window, hamming};
