//! wavegraph: a scrolling, pannable amplitude waveform renderer.
//!
//! The [`graph`] module is the rendering core and has no terminal
//! dependency beyond colour values. The remaining modules make up the
//! `wavegraph` binary.

pub mod app;
pub mod capture;
pub mod commands;
pub mod config;
pub mod graph;
pub mod logging;
pub mod ui;
