//! Append-only sample storage shared between the producer and the renderers.
//!
//! The producer appends under a write lock and then publishes the new length.
//! Readers take a [`Snapshot`], which pins the published length at the time of
//! the call; every read through the snapshot is bounded by that length even if
//! more samples arrive in the meantime.

use serde::{Deserialize, Serialize};
use std::ops::{Deref, Range};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// One amplitude reading and the millisecond timestamp it was taken at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sample {
    pub time_ms: u64,
    pub amplitude: u32,
}

impl Sample {
    pub fn new(time_ms: u64, amplitude: u32) -> Self {
        Self { time_ms, amplitude }
    }
}

#[derive(Debug, Default)]
struct Inner {
    samples: RwLock<Vec<Sample>>,
    published: AtomicUsize,
}

/// Thread-safe, append-only ordered store of samples.
///
/// Cloning the buffer clones the handle, not the data.
#[derive(Debug, Clone, Default)]
pub struct SampleBuffer {
    inner: Arc<Inner>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sample and publishes the new length.
    pub fn append(&self, sample: Sample) {
        let mut samples = self
            .inner
            .samples
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = samples.last() {
            if sample.time_ms < last.time_ms {
                tracing::debug!(
                    "Sample time went backwards: {}ms after {}ms",
                    sample.time_ms,
                    last.time_ms
                );
            }
        }

        samples.push(sample);
        self.inner.published.store(samples.len(), Ordering::Release);
    }

    /// Returns the last published length.
    pub fn len(&self) -> usize {
        self.inner.published.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pins the current length and returns bounded read access to `[0, len)`.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            len: self.len(),
            inner: Arc::clone(&self.inner),
        }
    }

    /// Empties the buffer.
    ///
    /// Only valid while no renderer is reading; a streaming reader must never
    /// see the length shrink.
    pub fn clear(&self) {
        let mut samples = self
            .inner
            .samples
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        samples.clear();
        self.inner.published.store(0, Ordering::Release);
    }

    /// Copies the published samples into an immutable, shareable sequence.
    pub fn freeze(&self) -> FrozenSamples {
        let snapshot = self.snapshot();
        FrozenSamples::from(snapshot.window(0..snapshot.len()))
    }
}

/// Read view of a [`SampleBuffer`] bounded by the length published when it was taken.
#[derive(Debug, Clone)]
pub struct Snapshot {
    len: usize,
    inner: Arc<Inner>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<Sample> {
        if index >= self.len {
            return None;
        }
        let samples = self
            .inner
            .samples
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        samples.get(index).copied()
    }

    /// Copies the samples in `range`, clipped to the snapshot length, under a single read lock.
    pub fn window(&self, range: Range<usize>) -> Vec<Sample> {
        let end = range.end.min(self.len);
        let start = range.start.min(end);
        let samples = self
            .inner
            .samples
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        // A concurrent clear() may have shortened the storage.
        let end = end.min(samples.len());
        let start = start.min(end);
        samples[start..end].to_vec()
    }
}

/// A completed capture: read-only and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenSamples(Arc<[Sample]>);

impl Default for FrozenSamples {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl FrozenSamples {
    pub fn as_slice(&self) -> &[Sample] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<Sample> {
        self.0.to_vec()
    }
}

impl From<Vec<Sample>> for FrozenSamples {
    fn from(samples: Vec<Sample>) -> Self {
        Self(Arc::from(samples))
    }
}

impl Deref for FrozenSamples {
    type Target = [Sample];

    fn deref(&self) -> &[Sample] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_append_publishes_length() {
        let buffer = SampleBuffer::new();
        assert!(buffer.is_empty());

        buffer.append(Sample::new(0, 10));
        buffer.append(Sample::new(150, 20));

        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.snapshot().get(1), Some(Sample::new(150, 20)));
    }

    #[test]
    fn test_snapshot_is_bounded_by_pinned_length() {
        let buffer = SampleBuffer::new();
        buffer.append(Sample::new(0, 1));
        buffer.append(Sample::new(150, 2));

        let snapshot = buffer.snapshot();
        buffer.append(Sample::new(300, 3));

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(2), None);
        assert_eq!(snapshot.window(0..10).len(), 2);
        assert_eq!(buffer.snapshot().len(), 3);
    }

    #[test]
    fn test_window_clips_range() {
        let buffer = SampleBuffer::new();
        for i in 0..5 {
            buffer.append(Sample::new(i * 150, i as u32));
        }
        let snapshot = buffer.snapshot();

        let window = snapshot.window(3..9);
        assert_eq!(window, vec![Sample::new(450, 3), Sample::new(600, 4)]);
        assert!(snapshot.window(7..9).is_empty());
    }

    #[test]
    fn test_clear_resets_length() {
        let buffer = SampleBuffer::new();
        buffer.append(Sample::new(0, 1));
        buffer.clear();

        assert!(buffer.is_empty());
        assert!(buffer.freeze().is_empty());
    }

    #[test]
    fn test_freeze_copies_published_samples() {
        let buffer = SampleBuffer::new();
        buffer.append(Sample::new(0, 1));
        buffer.append(Sample::new(150, 2));

        let frozen = buffer.freeze();
        buffer.append(Sample::new(300, 3));

        assert_eq!(frozen.len(), 2);
        assert_eq!(frozen[1], Sample::new(150, 2));
    }

    #[test]
    fn test_concurrent_reads_never_shrink() {
        let buffer = SampleBuffer::new();
        let writer = buffer.clone();

        let producer = thread::spawn(move || {
            for i in 0..2000u64 {
                writer.append(Sample::new(i, i as u32));
            }
        });

        let mut last_len = 0;
        for _ in 0..500 {
            let snapshot = buffer.snapshot();
            assert!(snapshot.len() >= last_len);
            if let Some(last) = snapshot.len().checked_sub(1) {
                assert_eq!(snapshot.get(last).map(|s| s.time_ms), Some(last as u64));
            }
            last_len = snapshot.len();
        }

        producer.join().unwrap();
        assert_eq!(buffer.len(), 2000);
    }
}
