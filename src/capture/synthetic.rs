//! Synthetic amplitude source.
//!
//! Stands in for a microphone: a background thread pushes one
//! `(time_ms, amplitude)` sample per interval into a [`SampleSink`].
//! Timestamps count active capture time only, so pausing leaves no gap.

use crate::graph::SampleSink;
use std::f64::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Amplitude of the generated signal at `time_ms`.
///
/// A slow envelope forms bursts separated by silence, with a faster
/// ripple on top.
pub fn synthetic_amplitude(time_ms: u64, peak: u32) -> u32 {
    let t = time_ms as f64;
    let envelope = (TAU * t / 2300.0).sin() * 0.5 + 0.5;
    if envelope < 0.2 {
        return 0;
    }
    let ripple = (TAU * t / 370.0).sin().abs();
    (f64::from(peak) * envelope * (0.6 + 0.4 * ripple)) as u32
}

/// Generates samples at a fixed cadence with pause and resume support.
pub struct SyntheticRecorder {
    interval: Duration,
    peak_amplitude: u32,
    is_paused: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<u64>>,
}

impl SyntheticRecorder {
    pub fn new(interval_ms: u64, peak_amplitude: u32) -> Self {
        Self {
            interval: Duration::from_millis(interval_ms.max(1)),
            peak_amplitude,
            is_paused: Arc::new(AtomicBool::new(false)),
            stop: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Starts pushing samples into `sink`.
    ///
    /// # Errors
    /// - If the recorder is already running
    /// - If the thread cannot be spawned
    pub fn start_recording(&mut self, sink: SampleSink) -> anyhow::Result<()> {
        if self.thread.is_some() {
            return Err(anyhow::anyhow!("Recorder is already running"));
        }

        self.stop.store(false, Ordering::Release);
        let stop = Arc::clone(&self.stop);
        let is_paused = Arc::clone(&self.is_paused);
        let interval = self.interval;
        let peak = self.peak_amplitude;

        let thread = thread::Builder::new()
            .name("wavegraph-capture".to_string())
            .spawn(move || {
                let mut active = Duration::ZERO;
                let mut last = Instant::now();
                let mut pushed = 0u64;

                while !stop.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if !is_paused.load(Ordering::Acquire) {
                        active += now - last;
                        let time_ms = active.as_millis() as u64;
                        sink.push(time_ms, synthetic_amplitude(time_ms, peak));
                        pushed += 1;
                    }
                    last = now;
                    thread::park_timeout(interval);
                }
                pushed
            })?;

        tracing::debug!(
            "Synthetic capture started: {}ms interval, peak {}",
            self.interval.as_millis(),
            self.peak_amplitude
        );
        self.thread = Some(thread);
        Ok(())
    }

    pub fn toggle_pause(&self) {
        let was_paused = self.is_paused.fetch_xor(true, Ordering::AcqRel);
        tracing::debug!("Capture {}", if was_paused { "resumed" } else { "paused" });
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused.load(Ordering::Acquire)
    }

    /// Stops the generator thread. Returns how many samples it pushed.
    pub fn stop_recording(&mut self) -> u64 {
        self.stop.store(true, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            return 0;
        };
        thread.thread().unpark();
        match thread.join() {
            Ok(pushed) => {
                tracing::debug!("Synthetic capture stopped after {} samples", pushed);
                pushed
            }
            Err(_) => {
                tracing::error!("Synthetic capture thread panicked");
                0
            }
        }
    }
}

impl Drop for SyntheticRecorder {
    fn drop(&mut self) {
        self.stop_recording();
    }
}
