//! Output device contract.
//!
//! The tick driver only needs three things from a device: how far playback
//! has progressed, a non-blocking write that may accept a prefix of what it is
//! given, and the stream format it was opened with.
//!
//! [`VirtualDevice`] is an in-memory implementation with a bounded queue whose
//! playback is advanced by hand. It stands in for hardware in tests and
//! offline simulation.

#[cfg(not(feature = "std"))]
use alloc::{boxed::Box, collections::VecDeque, vec::Vec};
#[cfg(feature = "std")]
use std::collections::VecDeque;

/// A playback sink that accepts interleaved `f32` samples.
///
/// # Contract
///
/// - [`playback_offset`](Self::playback_offset) never decreases. It counts
///   interleaved samples consumed since the stream started and may stay at 0
///   until playback audibly begins.
/// - [`write`](Self::write) never blocks. It returns how many *leading*
///   samples were queued, in `0..=samples.len()`. The device keeps no
///   reference to the rest; the caller resubmits them.
/// - [`channels`](Self::channels) and [`sample_rate`](Self::sample_rate) are
///   fixed at construction.
pub trait OutputDevice {
    /// Interleaved channel count.
    fn channels(&self) -> u16;

    /// Sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Interleaved samples consumed by the hardware so far.
    fn playback_offset(&self) -> u64;

    /// Queues as many leading samples as fit and returns that count.
    fn write(&mut self, samples: &[f32]) -> usize;

    /// Label used in log lines.
    fn name(&self) -> &str {
        "output device"
    }
}

impl<D: OutputDevice + ?Sized> OutputDevice for Box<D> {
    fn channels(&self) -> u16 {
        (**self).channels()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn playback_offset(&self) -> u64 {
        (**self).playback_offset()
    }

    fn write(&mut self, samples: &[f32]) -> usize {
        (**self).write(samples)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// In-memory device with a fixed-capacity queue.
///
/// Writes fill the queue up to `capacity` samples; [`play`](Self::play) drains
/// it and advances the playback offset. With [`recording`](Self::recording)
/// enabled, played samples are kept for inspection.
#[derive(Debug, Clone)]
pub struct VirtualDevice {
    channels: u16,
    sample_rate: u32,
    capacity: usize,
    queue: VecDeque<f32>,
    played: u64,
    record: Option<Vec<f32>>,
}

impl VirtualDevice {
    /// Creates a device that holds at most `capacity` interleaved samples.
    pub fn new(channels: u16, sample_rate: u32, capacity: usize) -> Self {
        Self {
            channels,
            sample_rate,
            capacity,
            queue: VecDeque::with_capacity(capacity),
            played: 0,
            record: None,
        }
    }

    /// Keeps every played sample; see [`recorded`](Self::recorded).
    pub fn recording(mut self) -> Self {
        self.record = Some(Vec::new());
        self
    }

    /// Queue capacity in interleaved samples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples written but not yet played.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Free queue slots.
    pub fn free(&self) -> usize {
        self.capacity - self.queue.len()
    }

    /// Plays up to `samples` queued samples. Returns how many were played.
    pub fn play(&mut self, samples: usize) -> usize {
        let n = samples.min(self.queue.len());
        match self.record.as_mut() {
            Some(record) => record.extend(self.queue.drain(..n)),
            None => {
                self.queue.drain(..n);
            }
        }
        self.played += n as u64;
        n
    }

    /// Plays up to `frames` whole frames.
    pub fn play_frames(&mut self, frames: usize) -> usize {
        self.play(frames * usize::from(self.channels))
    }

    /// Everything played so far, if recording is enabled.
    pub fn recorded(&self) -> &[f32] {
        self.record.as_deref().unwrap_or(&[])
    }
}

impl OutputDevice for VirtualDevice {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn playback_offset(&self) -> u64 {
        self.played
    }

    fn write(&mut self, samples: &[f32]) -> usize {
        let accepted = samples.len().min(self.free());
        self.queue.extend(samples[..accepted].iter().copied());
        accepted
    }

    fn name(&self) -> &str {
        "virtual device"
    }
}
