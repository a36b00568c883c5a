//! Static, pannable render of a completed capture.
//!
//! Content is laid out left to right, one wavelength per sample, plus a fixed
//! margin. Only the samples inside the viewport are turned into geometry.
//! Redraws run on a single worker thread fed through a one-deep slot: a new
//! request replaces any request that has not started yet.

use super::mapper::{amp_to_y, full_graph_x, Glyph};
use super::marker::{label_for, TimeLabel};
use super::sample::FrozenSamples;
use super::scene::Scene;
use super::settings::{GraphSettings, Viewport};
use super::surface::SurfaceSlot;
use std::ops::Range;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

/// Blank space appended after the last sample.
pub const FULL_GRAPH_MARGIN_PX: i64 = 50;

/// Total pixel width of `sample_count` samples plus the margin.
pub fn content_width(sample_count: usize, wave_length: i32) -> i64 {
    sample_count as i64 * i64::from(wave_length) + FULL_GRAPH_MARGIN_PX
}

/// Horizontal pan offset, always within `[min(0, view - content), 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanState {
    offset_px: i64,
}

impl PanState {
    pub fn offset(&self) -> i64 {
        self.offset_px
    }

    /// The most negative offset allowed: content's right edge at the view's right edge.
    pub fn min_offset(view_width: i32, content_width: i64) -> i64 {
        (i64::from(view_width) - content_width).min(0)
    }

    pub fn clamp(&mut self, view_width: i32, content_width: i64) {
        self.offset_px = self
            .offset_px
            .clamp(Self::min_offset(view_width, content_width), 0);
    }

    /// Accumulates a drag delta and clamps the result.
    pub fn pan(&mut self, delta_px: i64, view_width: i32, content_width: i64) {
        self.offset_px = self.offset_px.saturating_add(delta_px);
        self.clamp(view_width, content_width);
    }
}

/// Indices of the samples that fall inside the viewport at `pan_offset`.
///
/// The last index is `floor((view_width - pan_offset) / wave_length)`, capped at
/// the final sample.
pub fn visible_range(sample_count: usize, wave_length: i32, pan_offset: i64, view_width: i32) -> Range<usize> {
    if sample_count == 0 {
        return 0..0;
    }
    if content_width(sample_count, wave_length) <= i64::from(view_width) {
        return 0..sample_count;
    }

    let wave_length = i64::from(wave_length.max(1));
    let pan_offset = pan_offset.min(0);
    let first = (-pan_offset / wave_length) as usize;
    let last = ((i64::from(view_width) - pan_offset) / wave_length) as usize;
    let end = (last + 1).min(sample_count);
    first.min(end)..end
}

/// Geometry builder for a frozen capture.
#[derive(Debug, Clone)]
pub struct FullGraphRenderer {
    samples: FrozenSamples,
}

impl FullGraphRenderer {
    pub fn new(samples: FrozenSamples) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &FrozenSamples {
        &self.samples
    }

    pub fn content_width(&self, wave_length: i32) -> i64 {
        content_width(self.samples.len(), wave_length)
    }

    /// Builds the scene for the visible part of the capture.
    ///
    /// `pan_offset` is re-clamped against this viewport, so a stale offset from
    /// before a resize or zoom still yields a valid frame.
    pub fn compose(&self, settings: &GraphSettings, pan_offset: i64, viewport: Viewport) -> Scene {
        let wave_length = settings.wave_length().px();
        let half_height = viewport.half_height();
        let content_width = self.content_width(wave_length);

        let mut pan = PanState { offset_px: pan_offset };
        pan.clamp(viewport.width, content_width);

        let mut scene = Scene::new(viewport, settings.palette);
        let range = visible_range(self.samples.len(), wave_length, pan.offset(), viewport.width);

        for index in range {
            let sample = &self.samples[index];
            let prev = index.checked_sub(1).map(|p| &self.samples[p]);
            let x = (full_graph_x(index, wave_length) + pan.offset()) as i32;

            if let Some(text) = label_for(index, prev, sample, settings.time_scale_ms()) {
                scene.labels.push(TimeLabel { x, text });
            }

            let dy = amp_to_y(sample.amplitude, half_height, settings.max_amplitude());
            scene
                .glyphs
                .push(Glyph::for_sample(x, wave_length, half_height, dy));
        }

        scene
    }
}

/// What a full-graph redraw needs besides the samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RedrawRequest {
    pub settings: GraphSettings,
    pub pan_offset: i64,
}

#[derive(Debug, Default)]
struct WorkerState {
    pending: Option<RedrawRequest>,
    in_flight: bool,
    shutdown: bool,
    completed: u64,
}

#[derive(Debug, Default)]
struct WorkerShared {
    state: Mutex<WorkerState>,
    wake: Condvar,
}

impl WorkerShared {
    fn lock(&self) -> MutexGuard<'_, WorkerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Single thread that serialises full-graph redraws.
///
/// At most one redraw runs at a time and at most one waits behind it.
#[derive(Debug)]
pub struct RedrawWorker {
    shared: Arc<WorkerShared>,
    thread: Option<JoinHandle<()>>,
}

impl RedrawWorker {
    /// Starts the worker thread.
    ///
    /// # Errors
    /// - If the thread cannot be spawned
    pub fn spawn(renderer: FullGraphRenderer, slot: SurfaceSlot) -> anyhow::Result<Self> {
        let shared = Arc::new(WorkerShared::default());
        let worker_shared = Arc::clone(&shared);

        let thread = thread::Builder::new()
            .name("wavegraph-redraw".to_string())
            .spawn(move || run_worker(&renderer, &slot, &worker_shared))?;

        Ok(Self {
            shared,
            thread: Some(thread),
        })
    }

    /// Queues a redraw, replacing one that has not started yet.
    pub fn request(&self, request: RedrawRequest) {
        let mut state = self.shared.lock();
        if state.pending.replace(request).is_some() {
            tracing::trace!("Superseded pending full-graph redraw");
        }
        self.shared.wake.notify_all();
    }

    /// Blocks until nothing is queued or drawing.
    pub fn wait_idle(&self) {
        let mut state = self.shared.lock();
        while (state.pending.is_some() || state.in_flight) && !state.shutdown {
            state = self
                .shared
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Number of redraws executed so far, drawn or skipped.
    pub fn completed(&self) -> u64 {
        self.shared.lock().completed
    }

    /// Stops the worker after its current redraw and joins it.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.pending = None;
            self.shared.wake.notify_all();
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Full-graph redraw worker panicked");
            }
        }
    }
}

impl Drop for RedrawWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(renderer: &FullGraphRenderer, slot: &SurfaceSlot, shared: &WorkerShared) {
    tracing::debug!(
        "Full-graph redraw worker started ({} samples)",
        renderer.samples().len()
    );

    loop {
        let request = {
            let mut state = shared.lock();
            while state.pending.is_none() && !state.shutdown {
                state = shared
                    .wake
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if state.shutdown {
                break;
            }
            state.in_flight = true;
            state.pending.take()
        };

        if let Some(request) = request {
            slot.draw_with(|viewport| {
                renderer.compose(&request.settings, request.pan_offset, viewport)
            });
        }

        let mut state = shared.lock();
        state.in_flight = false;
        state.completed += 1;
        shared.wake.notify_all();
    }

    tracing::debug!("Full-graph redraw worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::sample::Sample;
    use crate::graph::scene::Scene;
    use crate::graph::settings::WaveLength;
    use crate::graph::surface::{MemorySurface, Surface};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn frozen(count: u64) -> FrozenSamples {
        FrozenSamples::from(
            (0..count)
                .map(|i| Sample::new(i * 150, (i as u32 % 4) * 1000))
                .collect::<Vec<_>>(),
        )
    }

    fn settings(wave_length: i32) -> GraphSettings {
        GraphSettings::new(WaveLength::new(wave_length)).with_max_amplitude(4000)
    }

    #[test]
    fn test_content_width_includes_margin() {
        assert_eq!(content_width(10, 10), 150);
        assert_eq!(content_width(0, 10), 50);
    }

    #[test]
    fn test_pan_is_pinned_at_edges() {
        let content = content_width(10, 10);
        let mut pan = PanState::default();

        pan.pan(-10_000, 60, content);
        assert_eq!(pan.offset(), -90);

        pan.pan(10_000, 60, content);
        assert_eq!(pan.offset(), 0);

        pan.pan(-35, 60, content);
        assert_eq!(pan.offset(), -35);

        pan.pan(i64::MIN, 60, content);
        assert_eq!(pan.offset(), -90);
    }

    #[test]
    fn test_pan_is_zero_when_content_fits() {
        let mut pan = PanState::default();
        pan.pan(-40, 500, content_width(10, 10));
        assert_eq!(pan.offset(), 0);
    }

    #[test]
    fn test_visible_range_follows_pan() {
        // 10 samples, wavelength 10, view 60, content 150.
        assert_eq!(visible_range(10, 10, 0, 60), 0..7);
        assert_eq!(visible_range(10, 10, -35, 60), 3..10);
        assert_eq!(visible_range(10, 10, -90, 60), 9..10);
        assert_eq!(visible_range(0, 10, 0, 60), 0..0);
        assert_eq!(visible_range(10, 10, 0, 400), 0..10);
    }

    #[test]
    fn test_last_visible_index_formula() {
        for pan in (-90..=0).rev() {
            let range = visible_range(10, 10, pan, 60);
            let expected_last = ((60 - pan) / 10).min(9) as usize;
            assert_eq!(range.end - 1, expected_last);
        }
    }

    #[test]
    fn test_compose_small_capture_starts_at_zero() {
        let renderer = FullGraphRenderer::new(frozen(5));
        let scene = renderer.compose(&settings(10), -30, Viewport::new(400, 100));

        let xs: Vec<i32> = scene.glyphs.iter().map(|glyph| glyph.x()).collect();
        assert_eq!(xs, vec![0, 10, 20, 30, 40]);
        assert_eq!(scene.labels[0], TimeLabel { x: 0, text: "00:00".to_string() });
        assert!(scene.needle.is_none());
        assert!(scene.marker.is_none());
    }

    #[test]
    fn test_compose_applies_pan() {
        let renderer = FullGraphRenderer::new(frozen(10));
        let scene = renderer.compose(&settings(10), -35, Viewport::new(60, 100));

        assert_eq!(scene.glyphs.len(), 7);
        assert_eq!(scene.glyphs[0].x(), -5);
        assert_eq!(scene.glyphs[6].x(), 55);
        assert!(scene.labels.is_empty());
    }

    #[test]
    fn test_compose_is_idempotent() {
        let samples: Vec<Sample> = (0..400)
            .map(|i| Sample::new(i * 130, (i as u32 * 37) % 5000))
            .collect();
        let renderer = FullGraphRenderer::new(FrozenSamples::from(samples));
        let settings = settings(4);

        let first = renderer.compose(&settings, -600, Viewport::new(300, 80));
        let second = renderer.compose(&settings, -600, Viewport::new(300, 80));
        assert_eq!(first, second);
        assert!(!first.labels.is_empty());
    }

    #[test]
    fn test_worker_draws_latest_request() {
        let slot = SurfaceSlot::new();
        let surface = MemorySurface::new(Viewport::new(60, 100));
        slot.attach(Box::new(surface.clone()));

        let worker = RedrawWorker::spawn(FullGraphRenderer::new(frozen(10)), slot).unwrap();
        worker.request(RedrawRequest { settings: settings(10), pan_offset: 0 });
        worker.request(RedrawRequest { settings: settings(10), pan_offset: -90 });
        worker.wait_idle();

        let scene = surface.last_scene().unwrap();
        assert_eq!(scene.glyphs.len(), 1);
        assert_eq!(scene.glyphs[0].x(), 0);
        assert!(worker.completed() >= 1);
    }

    struct SlowSurface {
        active: Arc<AtomicUsize>,
        max_active: Arc<AtomicUsize>,
    }

    impl Surface for SlowSurface {
        fn is_valid(&self) -> bool {
            true
        }

        fn size(&self) -> Option<Viewport> {
            Some(Viewport::new(60, 100))
        }

        fn present(&mut self, _scene: &Scene) -> anyhow::Result<()> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_rapid_requests_are_coalesced() {
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));
        let slot = SurfaceSlot::new();
        slot.attach(Box::new(SlowSurface {
            active: Arc::clone(&active),
            max_active: Arc::clone(&max_active),
        }));

        let worker = RedrawWorker::spawn(FullGraphRenderer::new(frozen(100)), slot).unwrap();
        for i in 0..100 {
            worker.request(RedrawRequest {
                settings: settings(10),
                pan_offset: -i,
            });
        }
        worker.wait_idle();

        assert!(worker.completed() < 10);
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut worker = RedrawWorker::spawn(FullGraphRenderer::new(frozen(3)), SurfaceSlot::new()).unwrap();
        worker.request(RedrawRequest { settings: settings(10), pan_offset: 0 });
        worker.shutdown();
        worker.shutdown();
        worker.wait_idle();
    }
}
