//! Per-tick sample storage handed to the upstream renderer.
//!
//! [`SampleBuffer`] is addressed by `(channel, frame)` and stored planar so a
//! renderer can fill one channel at a time. The driver flattens it to the
//! interleaved layout devices expect with [`SampleBuffer::interleave_into`].

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// A fixed-shape block of audio: `channels` × `frames` samples.
///
/// The shape is set by the tick driver before each render call; renderers can
/// read and write samples but cannot change the number of frames.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    /// Planar storage, channel-major: `data[channel * frames + frame]`.
    data: Vec<f32>,
    channels: usize,
    frames: usize,
}

impl SampleBuffer {
    /// Creates a zeroed buffer.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is zero.
    pub fn new(channels: usize, frames: usize) -> Self {
        assert!(channels > 0, "SampleBuffer needs at least one channel");
        Self {
            data: vec![0.0; channels * frames],
            channels,
            frames,
        }
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of frames (samples per channel).
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Total number of samples across all channels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the buffer holds no frames.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Returns the sample at `(channel, frame)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn get(&self, channel: usize, frame: usize) -> f32 {
        self.channel(channel)[frame]
    }

    /// Sets the sample at `(channel, frame)`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn set(&mut self, channel: usize, frame: usize, value: f32) {
        self.channel_mut(channel)[frame] = value;
    }

    /// Returns one channel's samples.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        assert!(channel < self.channels, "channel {channel} out of range");
        let start = channel * self.frames;
        &self.data[start..start + self.frames]
    }

    /// Returns one channel's samples mutably.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        assert!(channel < self.channels, "channel {channel} out of range");
        let start = channel * self.frames;
        &mut self.data[start..start + self.frames]
    }

    /// Writes one frame (one sample per channel).
    ///
    /// Extra values in `samples` are ignored; missing channels are left as is.
    pub fn set_frame(&mut self, frame: usize, samples: &[f32]) {
        for (channel, &value) in samples.iter().take(self.channels).enumerate() {
            self.set(channel, frame, value);
        }
    }

    /// Fills every channel with zeros.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Reshapes to `frames` per channel and zeroes the contents.
    ///
    /// Keeps the allocation when shrinking, so steady-state ticks don't allocate.
    pub(crate) fn reshape(&mut self, frames: usize) {
        self.frames = frames;
        self.data.clear();
        self.data.resize(self.channels * frames, 0.0);
    }

    /// Writes the buffer to `out` in interleaved order, replacing its contents.
    ///
    /// Layout: `frame0[ch0, ch1, ..], frame1[ch0, ch1, ..], ..`.
    pub fn interleave_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.reserve(self.data.len());
        for frame in 0..self.frames {
            for channel in 0..self.channels {
                out.push(self.data[channel * self.frames + frame]);
            }
        }
    }

    /// Returns a freshly allocated interleaved copy.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.data.len());
        self.interleave_into(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_silent() {
        let buf = SampleBuffer::new(2, 4);
        assert_eq!(buf.len(), 8);
        assert!(buf.interleaved().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn interleaves_frame_major() {
        let mut buf = SampleBuffer::new(2, 3);
        buf.channel_mut(0).copy_from_slice(&[1.0, 2.0, 3.0]);
        buf.channel_mut(1).copy_from_slice(&[-1.0, -2.0, -3.0]);
        assert_eq!(buf.interleaved(), vec![1.0, -1.0, 2.0, -2.0, 3.0, -3.0]);
    }

    #[test]
    fn set_frame_writes_across_channels() {
        let mut buf = SampleBuffer::new(3, 2);
        buf.set_frame(1, &[0.1, 0.2, 0.3, 9.0]);
        assert_eq!(buf.get(0, 1), 0.1);
        assert_eq!(buf.get(1, 1), 0.2);
        assert_eq!(buf.get(2, 1), 0.3);
        assert_eq!(buf.get(2, 0), 0.0);
    }

    #[test]
    fn reshape_zeroes_and_resizes() {
        let mut buf = SampleBuffer::new(2, 4);
        buf.set(1, 3, 0.5);
        buf.reshape(2);
        assert_eq!(buf.frames(), 2);
        assert_eq!(buf.len(), 4);
        assert!(buf.interleaved().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn interleave_into_replaces_previous_contents() {
        let mut buf = SampleBuffer::new(1, 2);
        buf.set(0, 0, 7.0);
        let mut out = vec![42.0; 10];
        buf.interleave_into(&mut out);
        assert_eq!(out, vec![7.0, 0.0]);
    }

    #[test]
    #[should_panic(expected = "at least one channel")]
    fn zero_channels_panics() {
        let _ = SampleBuffer::new(0, 16);
    }
}
