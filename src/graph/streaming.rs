//! Live scrolling renderer.
//!
//! Each frame walks the buffer backwards from the newest sample, laying
//! samples out right to left from the current-sample position until they
//! scroll off the left edge. The newest sample also gets the needle, and the
//! region right of the current-sample position is covered by the marker band.

use super::mapper::{amp_to_y, streaming_x, Glyph};
use super::marker::{label_for, TimeLabel};
use super::pacing::FrameScheduler;
use super::sample::{SampleBuffer, Snapshot};
use super::scene::{MarkerBand, Needle, Scene};
use super::settings::{GraphSettings, SharedSettings, Viewport};
use super::surface::SurfaceSlot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How often a paused loop checks whether it was resumed or stopped.
const PAUSED_POLL: Duration = Duration::from_millis(20);

/// Per-frame geometry builder for streaming mode.
#[derive(Debug)]
pub struct StreamingRenderer {
    buffer: SampleBuffer,
    scheduler: FrameScheduler,
}

impl StreamingRenderer {
    pub fn new(buffer: SampleBuffer) -> Self {
        Self {
            buffer,
            scheduler: FrameScheduler::new(),
        }
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Advances pacing for one frame and draws it if the surface allows.
    ///
    /// Pacing advances even when the draw is skipped; only the visual frame is lost.
    pub fn render_frame(&mut self, settings: &GraphSettings, slot: &SurfaceSlot) -> bool {
        let snapshot = self.buffer.snapshot();
        self.scheduler
            .tick(snapshot.len(), settings.wave_length().px());
        slot.draw_with(|viewport| self.compose(&snapshot, settings, viewport))
    }

    /// Builds the scene for the current pacing state.
    pub fn compose(&self, snapshot: &Snapshot, settings: &GraphSettings, viewport: Viewport) -> Scene {
        let wave_length = settings.wave_length().px();
        let half_height = viewport.half_height();
        let base_x = (f64::from(viewport.width) * settings.x_offset_fraction()) as i32;
        let start_x = base_x - self.scheduler.redraw_count();

        let mut scene = Scene::new(viewport, settings.palette);
        scene.marker = Some(MarkerBand {
            x_start: base_x,
            x_end: viewport.width,
            height: viewport.height,
        });

        if snapshot.is_empty() {
            return scene;
        }

        // Steps k with start_x - k * wave_length >= -wave_length.
        let reach = start_x + wave_length;
        if reach < 0 {
            return scene;
        }
        let steps = (reach / wave_length) as usize + 1;
        let count = steps.min(snapshot.len());
        let first = snapshot.len() - count;

        // One extra sample on the left for the crossing test of the oldest visible one.
        let window_start = first.saturating_sub(1);
        let window = snapshot.window(window_start..snapshot.len());
        let newest = snapshot.len() - 1;

        for k in 0..count {
            let index = newest - k;
            let Some(sample) = window.get(index - window_start) else {
                break;
            };
            let prev = index
                .checked_sub(1)
                .and_then(|p| window.get(p - window_start));

            let x = streaming_x(start_x, k as i32, wave_length);
            let dy = amp_to_y(sample.amplitude, half_height, settings.max_amplitude());

            if k == 0 {
                scene.needle = Some(Needle {
                    x_start: base_x,
                    x_end: viewport.width,
                    y: half_height - dy,
                });
            }

            if let Some(text) = label_for(index, prev, sample, settings.time_scale_ms()) {
                scene.labels.push(TimeLabel { x, text });
            }

            scene
                .glyphs
                .push(Glyph::for_sample(x, wave_length, half_height, dy));
        }

        scene
    }
}

/// Handle to a running streaming loop thread.
///
/// The loop checks its stop flag every iteration; [`StreamingLoop::stop`]
/// waits for the in-flight frame before returning.
#[derive(Debug)]
pub struct StreamingLoop {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<StreamingRenderer>>,
}

impl StreamingLoop {
    /// Starts the loop on a dedicated thread.
    ///
    /// # Errors
    /// - If the thread cannot be spawned
    pub fn spawn(
        mut renderer: StreamingRenderer,
        settings: SharedSettings,
        slot: SurfaceSlot,
        paused: Arc<AtomicBool>,
    ) -> anyhow::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("wavegraph-stream".to_string())
            .spawn(move || {
                tracing::debug!("Streaming loop started");
                let mut frames = 0u64;

                while !stop_flag.load(Ordering::Acquire) {
                    if paused.load(Ordering::Acquire) {
                        thread::park_timeout(PAUSED_POLL);
                        continue;
                    }

                    let settings = settings.get();
                    renderer.render_frame(&settings, &slot);
                    frames += 1;

                    let sleep = renderer.scheduler().frame_sleep();
                    if sleep.is_zero() {
                        thread::yield_now();
                    } else {
                        thread::park_timeout(sleep);
                    }
                }

                tracing::debug!(
                    "Streaming loop stopped after {} frames (frame sleep {}ms)",
                    frames,
                    renderer.scheduler().frame_sleep_ms()
                );
                renderer
            })?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .is_some_and(|thread| !thread.is_finished())
    }

    /// Signals the loop and waits for it to exit. Returns the renderer on a clean exit.
    pub fn stop(mut self) -> Option<StreamingRenderer> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<StreamingRenderer> {
        self.stop.store(true, Ordering::Release);
        let thread = self.thread.take()?;
        thread.thread().unpark();
        match thread.join() {
            Ok(renderer) => Some(renderer),
            Err(_) => {
                tracing::error!("Streaming loop panicked");
                None
            }
        }
    }
}

impl Drop for StreamingLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
