//! Adaptive frame pacing for the streaming renderer.
//!
//! Between sample arrivals the wave keeps scrolling one pixel per frame. Once
//! it has scrolled a full wavelength without new data, every further frame
//! nudges the inter-frame sleep up by a millisecond. A sample that arrives
//! while the freeze count is still negative (no overflow since the previous
//! sample) walks the sleep back down by a millisecond, floored at zero.

use std::time::Duration;

/// Sleep before the first frame of a session.
pub const INITIAL_FRAME_SLEEP_MS: u64 = 5;

/// Pacing state carried from one streaming frame to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameScheduler {
    last_observed_sample_count: usize,
    redraw_count: i32,
    freeze_count: i32,
    frame_sleep_ms: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            last_observed_sample_count: 0,
            redraw_count: 0,
            freeze_count: 0,
            frame_sleep_ms: INITIAL_FRAME_SLEEP_MS,
        }
    }

    /// Advances the state machine by one frame.
    ///
    /// `sample_count` is the buffer length seen this frame, `wave_length` the
    /// current pixel width of one sample.
    pub fn tick(&mut self, sample_count: usize, wave_length: i32) {
        if sample_count != self.last_observed_sample_count {
            if self.freeze_count < 0 {
                self.frame_sleep_ms = self.frame_sleep_ms.saturating_sub(1);
            }
            self.last_observed_sample_count = sample_count;
            self.freeze_count = -1;
            self.redraw_count = 0;
            return;
        }

        self.redraw_count += 1;
        if self.redraw_count > wave_length {
            self.freeze_count += 1;
            if self.freeze_count > 0 {
                self.frame_sleep_ms += 1;
            }
            self.redraw_count = wave_length;
        }
    }

    pub fn redraw_count(&self) -> i32 {
        self.redraw_count
    }

    pub fn freeze_count(&self) -> i32 {
        self.freeze_count
    }

    pub fn frame_sleep_ms(&self) -> u64 {
        self.frame_sleep_ms
    }

    pub fn frame_sleep(&self) -> Duration {
        Duration::from_millis(self.frame_sleep_ms)
    }

    pub fn last_observed_sample_count(&self) -> usize {
        self.last_observed_sample_count
    }
}
