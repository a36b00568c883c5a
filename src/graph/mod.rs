//! Amplitude waveform rendering.
//!
//! Two renderers share one data model: a [`SampleBuffer`] appended by a
//! producer and read through length-bounded snapshots. While a capture is live
//! the streaming renderer scrolls it right to left; once stopped, the
//! full-graph renderer shows the frozen capture with horizontal panning.
//! [`GraphSession`] ties both to a [`Surface`].

pub mod full_graph;
pub mod mapper;
pub mod marker;
pub mod pacing;
pub mod sample;
pub mod scene;
pub mod session;
pub mod settings;
pub mod streaming;
pub mod surface;

pub use full_graph::{FullGraphRenderer, PanState, RedrawRequest, RedrawWorker};
pub use mapper::Glyph;
pub use marker::TimeLabel;
pub use pacing::FrameScheduler;
pub use sample::{FrozenSamples, Sample, SampleBuffer, Snapshot};
pub use scene::{MarkerBand, Needle, Scene};
pub use session::{GraphSession, Mode, SampleSink};
pub use settings::{GraphSettings, Palette, SharedSettings, Viewport, WaveLength};
pub use streaming::{StreamingLoop, StreamingRenderer};
pub use surface::{MemorySurface, Surface, SurfaceSlot};
