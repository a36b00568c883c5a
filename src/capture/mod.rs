//! Capture sources and saved captures.

pub mod file;
pub mod synthetic;

pub use file::Capture;
pub use synthetic::{synthetic_amplitude, SyntheticRecorder};
