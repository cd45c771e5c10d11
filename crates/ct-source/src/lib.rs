//! Audio decoding for cepstrack.

pub mod decode;

pub use decode::{decode, decode_bytes};
