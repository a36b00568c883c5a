//! Configuration management for wavegraph.
//!
//! Loads and saves the TOML configuration kept in the user's config directory.

pub mod file;

pub use file::{get_config_path, CaptureConfig, ColorsConfig, GraphConfig, WavegraphConfig};
