//! One capture's worth of graph state, owned by the caller.
//!
//! A session holds the sample buffer, the shared settings and the surface slot,
//! and runs at most one renderer at a time: the streaming loop while a capture
//! is live, the full-graph redraw worker afterwards.

use super::full_graph::{content_width, FullGraphRenderer, PanState, RedrawRequest, RedrawWorker};
use super::sample::{FrozenSamples, Sample, SampleBuffer};
use super::settings::{GraphSettings, SharedSettings, Viewport};
use super::streaming::{StreamingLoop, StreamingRenderer};
use super::surface::{Surface, SurfaceSlot};
use ratatui::style::Color;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Which renderer currently owns the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Streaming,
    FullGraph,
}

/// Producer handle that can be moved to the capture thread.
///
/// Samples pushed while no capture is active are dropped.
#[derive(Debug, Clone)]
pub struct SampleSink {
    buffer: SampleBuffer,
    recording: Arc<AtomicBool>,
}

impl SampleSink {
    pub fn push(&self, time_ms: u64, amplitude: u32) {
        if self.recording.load(Ordering::Acquire) {
            self.buffer.append(Sample::new(time_ms, amplitude));
        } else {
            tracing::trace!("Dropping sample at {}ms: not recording", time_ms);
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct FullGraphState {
    worker: RedrawWorker,
    pan: PanState,
    sample_count: usize,
}

#[derive(Debug)]
pub struct GraphSession {
    buffer: SampleBuffer,
    recording: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    settings: SharedSettings,
    slot: SurfaceSlot,
    streaming: Option<StreamingLoop>,
    full_graph: Option<FullGraphState>,
}

impl Default for GraphSession {
    fn default() -> Self {
        Self::new(GraphSettings::default())
    }
}

impl GraphSession {
    pub fn new(settings: GraphSettings) -> Self {
        Self {
            buffer: SampleBuffer::new(),
            recording: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
            settings: SharedSettings::new(settings),
            slot: SurfaceSlot::new(),
            streaming: None,
            full_graph: None,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.streaming.is_some() {
            Mode::Streaming
        } else if self.full_graph.is_some() {
            Mode::FullGraph
        } else {
            Mode::Idle
        }
    }

    pub fn settings(&self) -> GraphSettings {
        self.settings.get()
    }

    /// Last viewport reported by the attached surface.
    pub fn viewport(&self) -> Viewport {
        self.slot.viewport()
    }

    pub fn sample_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Current full-graph pan offset, zero outside full-graph mode.
    pub fn pan_offset(&self) -> i64 {
        self.full_graph
            .as_ref()
            .map_or(0, |full_graph| full_graph.pan.offset())
    }

    /// Installs the drawing target, replacing any previous one.
    pub fn attach_to_surface(&mut self, surface: Box<dyn Surface>) {
        if self.slot.attach(surface).is_some() {
            tracing::debug!("Replaced attached surface");
        }
        self.redraw_full_graph();
    }

    /// Removes the drawing target once the in-flight frame has been submitted.
    pub fn detach_surface(&mut self) -> Option<Box<dyn Surface>> {
        self.slot.detach()
    }

    pub fn sample_sink(&self) -> SampleSink {
        SampleSink {
            buffer: self.buffer.clone(),
            recording: Arc::clone(&self.recording),
        }
    }

    /// Resets the session for a new capture and starts streaming it.
    pub fn on_recording_started(&mut self) {
        tracing::info!("Capture started");
        self.stop_full_graph();
        self.stop_streaming_loop();
        self.buffer.clear();
        self.paused.store(false, Ordering::Release);
        self.recording.store(true, Ordering::Release);
        self.start_streaming();
    }

    pub fn on_sample(&self, time_ms: u64, amplitude: u32) {
        self.sample_sink().push(time_ms, amplitude);
    }

    /// Ends the capture and shows the whole of it.
    pub fn on_recording_stopped(&mut self) -> FrozenSamples {
        self.recording.store(false, Ordering::Release);
        let samples = self.stop_streaming();
        tracing::info!("Capture stopped with {} samples", samples.len());
        self.show_full_graph(samples.clone());
        samples
    }

    /// Starts the streaming loop over the session buffer. No-op if already streaming.
    pub fn start_streaming(&mut self) {
        if self.streaming.is_some() {
            return;
        }
        self.stop_full_graph();

        let renderer = StreamingRenderer::new(self.buffer.clone());
        match StreamingLoop::spawn(
            renderer,
            self.settings.clone(),
            self.slot.clone(),
            Arc::clone(&self.paused),
        ) {
            Ok(streaming) => self.streaming = Some(streaming),
            Err(e) => tracing::error!("Failed to start streaming loop: {e}"),
        }
    }

    /// Stops the streaming loop, waits for its last frame and returns the samples so far.
    pub fn stop_streaming(&mut self) -> FrozenSamples {
        self.stop_streaming_loop();
        self.buffer.freeze()
    }

    /// Switches to the static, pannable view of `samples`.
    ///
    /// Streaming is quiesced first. An empty capture leaves the session untouched.
    pub fn show_full_graph(&mut self, samples: FrozenSamples) {
        if samples.is_empty() {
            tracing::debug!("Not showing full graph: no samples");
            return;
        }

        self.stop_streaming_loop();
        self.stop_full_graph();

        let sample_count = samples.len();
        match RedrawWorker::spawn(FullGraphRenderer::new(samples), self.slot.clone()) {
            Ok(worker) => {
                tracing::debug!("Showing full graph of {} samples", sample_count);
                self.full_graph = Some(FullGraphState {
                    worker,
                    pan: PanState::default(),
                    sample_count,
                });
                self.redraw_full_graph();
            }
            Err(e) => tracing::error!("Failed to start full-graph redraw worker: {e}"),
        }
    }

    /// Drags the full graph horizontally. Ignored outside full-graph mode.
    pub fn pan(&mut self, delta_px: i64) {
        let Some(full_graph) = self.full_graph.as_mut() else {
            return;
        };
        let settings = self.settings.get();
        let content_width =
            content_width(full_graph.sample_count, settings.wave_length().px());
        full_graph
            .pan
            .pan(delta_px, self.slot.viewport().width, content_width);
        full_graph.worker.request(RedrawRequest {
            settings,
            pan_offset: full_graph.pan.offset(),
        });
    }

    /// Sets the zoom level; out-of-range values are clamped into [2, 15].
    pub fn set_wave_length(&mut self, px: i32) {
        self.settings.update(|settings| settings.set_wave_length(px));
        self.redraw_full_graph();
    }

    pub fn zoom_in(&mut self) {
        let px = self.settings.get().wave_length().zoomed_in().px();
        self.set_wave_length(px);
    }

    pub fn zoom_out(&mut self) {
        let px = self.settings.get().wave_length().zoomed_out().px();
        self.set_wave_length(px);
    }

    pub fn set_max_amplitude(&mut self, max_amplitude: u32) {
        self.settings
            .update(|settings| settings.set_max_amplitude(max_amplitude));
        self.redraw_full_graph();
    }

    pub fn set_time_scale(&mut self, time_scale_ms: u64) {
        self.settings
            .update(|settings| settings.set_time_scale(time_scale_ms));
        self.redraw_full_graph();
    }

    pub fn set_x_offset_fraction(&mut self, fraction: f64) {
        self.settings
            .update(|settings| settings.set_x_offset_fraction(fraction));
    }

    /// Suppresses streaming frames without stopping the loop.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.settings.update(|settings| settings.palette.background = color);
        self.redraw_full_graph();
    }

    pub fn set_wave_color(&mut self, color: Color) {
        self.settings.update(|settings| settings.palette.wave = color);
        self.redraw_full_graph();
    }

    pub fn set_marker_color(&mut self, color: Color) {
        self.settings.update(|settings| settings.palette.marker = color);
    }

    pub fn set_needle_color(&mut self, color: Color) {
        self.settings.update(|settings| settings.palette.needle = color);
    }

    pub fn set_time_text_color(&mut self, color: Color) {
        self.settings.update(|settings| settings.palette.time_text = color);
        self.redraw_full_graph();
    }

    /// Re-reads the surface size, e.g. after a resize, and redraws the full graph.
    pub fn refresh(&mut self) {
        let viewport = self.slot.refresh_viewport();
        tracing::trace!("Viewport is now {}x{}", viewport.width, viewport.height);
        self.redraw_full_graph();
    }

    /// Re-clamps pan against the current zoom and viewport and queues a redraw.
    fn redraw_full_graph(&mut self) {
        let Some(full_graph) = self.full_graph.as_mut() else {
            return;
        };
        let settings = self.settings.get();
        let content_width =
            content_width(full_graph.sample_count, settings.wave_length().px());
        full_graph
            .pan
            .clamp(self.slot.viewport().width, content_width);
        full_graph.worker.request(RedrawRequest {
            settings,
            pan_offset: full_graph.pan.offset(),
        });
    }

    /// Blocks until any queued full-graph redraw has been drawn.
    pub fn wait_for_redraw(&self) {
        if let Some(full_graph) = self.full_graph.as_ref() {
            full_graph.worker.wait_idle();
        }
    }

    fn stop_streaming_loop(&mut self) {
        if let Some(streaming) = self.streaming.take() {
            if let Some(renderer) = streaming.stop() {
                tracing::debug!(
                    "Streaming stopped at frame sleep {}ms",
                    renderer.scheduler().frame_sleep_ms()
                );
            }
        }
    }

    fn stop_full_graph(&mut self) {
        if let Some(mut full_graph) = self.full_graph.take() {
            full_graph.worker.shutdown();
        }
    }
}

impl Drop for GraphSession {
    fn drop(&mut self) {
        self.stop_streaming_loop();
        self.stop_full_graph();
    }
}
