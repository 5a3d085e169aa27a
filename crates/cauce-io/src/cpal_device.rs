//! cpal-backed [`OutputDevice`].
//!
//! cpal is callback driven: the audio thread asks for a buffer whenever it
//! wants one. [`CpalDevice`] turns that into the non-blocking write/position
//! contract the tick driver expects by putting an `rtrb` SPSC ring between the
//! two sides:
//!
//! ```text
//!  ticker thread                          cpal audio thread
//! ┌───────────────┐   push (try, never   ┌───────────────────────┐
//! │ CpalDevice    │ ──── blocks) ──────▶ │ output callback       │
//! │  ::write()    │      rtrb ring       │  pops, pads silence,  │
//! └───────────────┘                      │  bumps played counter │
//!         ▲                              └───────────┬───────────┘
//!         └────── playback_offset() ◀── AtomicU64 ───┘
//! ```
//!
//! The played counter only advances by samples actually popped from the ring,
//! so it reads 0 until real audio reaches the hardware. That is what lets
//! auto-latency observe when playback begins.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use cauce_core::OutputDevice;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::settings::OutputSettings;
use crate::{Error, Result};

/// Extract device name via `description()` (cpal 0.17+).
fn device_name(device: &cpal::Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Type-erased cpal stream handle.
///
/// The stream plays while this handle exists; dropping it stops the callback.
pub struct StreamHandle {
    /// The backend-specific stream object, kept alive via RAII.
    _inner: Box<dyn Send>,
}

impl StreamHandle {
    /// Wraps a backend stream object, keeping it alive until drop.
    pub fn new<T: Send + 'static>(stream: T) -> Self {
        Self {
            _inner: Box::new(stream),
        }
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Counters shared between the writer and the audio callback.
#[derive(Debug, Default)]
struct PlaybackCounters {
    played: AtomicU64,
    underruns: AtomicU64,
}

/// Writer half of a cpal output stream.
pub struct CpalDevice {
    producer: Producer<f32>,
    counters: Arc<PlaybackCounters>,
    channels: u16,
    sample_rate: u32,
    name: String,
}

impl CpalDevice {
    /// Opens an output stream matching `settings` and starts it playing.
    ///
    /// Returns the writer and the stream handle; keep the handle alive for as
    /// long as the device is in use.
    pub fn open(settings: &OutputSettings) -> Result<(Self, StreamHandle)> {
        let config = settings.session_config()?;
        let host = cpal::default_host();
        let device = find_output_device(&host, settings.device_name.as_deref())?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown output".to_string());

        let (producer, consumer) = RingBuffer::<f32>::new(settings.ring_capacity());
        let counters = Arc::new(PlaybackCounters::default());

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: config.sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        let mut callback = output_callback(consumer, Arc::clone(&counters));
        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| callback(data),
                |err| tracing::error!(%err, "output stream error"),
                None,
            )
            .map_err(|e| match e {
                cpal::BuildStreamError::StreamConfigNotSupported => Error::UnsupportedFormat(
                    format!("{} ch @ {} Hz f32", config.channels, config.sample_rate),
                ),
                other => Error::Stream(other.to_string()),
            })?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %name,
            host = host.id().name(),
            channels = config.channels,
            sample_rate = config.sample_rate,
            ring_samples = settings.ring_capacity(),
            "output stream started"
        );

        let device = Self {
            producer,
            counters,
            channels: config.channels,
            sample_rate: config.sample_rate,
            name,
        };
        Ok((device, StreamHandle::new(stream)))
    }

    /// Callbacks that ran dry after playback had started.
    pub fn underruns(&self) -> u64 {
        self.counters.underruns.load(Ordering::Relaxed)
    }

    /// Free slots in the ring, in interleaved samples.
    pub fn free(&self) -> usize {
        self.producer.slots()
    }
}

impl OutputDevice for CpalDevice {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn playback_offset(&self) -> u64 {
        self.counters.played.load(Ordering::Acquire)
    }

    fn write(&mut self, samples: &[f32]) -> usize {
        let n = samples.len().min(self.producer.slots());
        if n == 0 {
            return 0;
        }
        match self.producer.write_chunk_uninit(n) {
            Ok(chunk) => chunk.fill_from_iter(samples[..n].iter().copied()),
            Err(_) => 0,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Builds the real-time half: drains the ring into `data`, pads with silence.
///
/// No allocation, locking, or logging happens in here.
fn output_callback(
    mut consumer: Consumer<f32>,
    counters: Arc<PlaybackCounters>,
) -> impl FnMut(&mut [f32]) + Send + 'static {
    move |data: &mut [f32]| {
        let available = consumer.slots().min(data.len());
        let copied = match consumer.read_chunk(available) {
            Ok(chunk) => {
                let (first, second) = chunk.as_slices();
                data[..first.len()].copy_from_slice(first);
                data[first.len()..first.len() + second.len()].copy_from_slice(second);
                let n = first.len() + second.len();
                chunk.commit_all();
                n
            }
            Err(_) => 0,
        };
        data[copied..].fill(0.0);

        if copied < data.len() && counters.played.load(Ordering::Relaxed) > 0 {
            counters.underruns.fetch_add(1, Ordering::Relaxed);
        }
        if copied > 0 {
            counters.played.fetch_add(copied as u64, Ordering::Release);
        }
    }
}

/// Find a cpal output device by name, or return the default.
fn find_output_device(host: &cpal::Host, name: Option<&str>) -> Result<cpal::Device> {
    match name {
        Some(search) => {
            let search_lower = search.to_lowercase();
            let devices = host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?;

            for device in devices {
                if let Ok(dev_name) = device_name(&device)
                    && dev_name.to_lowercase().contains(search_lower.as_str())
                {
                    return Ok(device);
                }
            }
            Err(Error::DeviceNotFound(format!(
                "no output device matching '{}'",
                search
            )))
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_drains_ring_and_pads_silence() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(8);
        let counters = Arc::new(PlaybackCounters::default());
        let mut callback = output_callback(consumer, Arc::clone(&counters));

        for s in [0.1, 0.2, 0.3] {
            producer.push(s).unwrap();
        }
        let mut data = [9.0; 4];
        callback(&mut data);
        assert_eq!(data, [0.1, 0.2, 0.3, 0.0]);
        assert_eq!(counters.played.load(Ordering::Acquire), 3);
        assert_eq!(counters.underruns.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn callback_counts_underruns_only_after_start() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(8);
        let counters = Arc::new(PlaybackCounters::default());
        let mut callback = output_callback(consumer, Arc::clone(&counters));

        let mut data = [0.0; 4];
        callback(&mut data);
        assert_eq!(counters.played.load(Ordering::Acquire), 0);
        assert_eq!(counters.underruns.load(Ordering::Relaxed), 0);

        producer.push(1.0).unwrap();
        callback(&mut data);
        callback(&mut data);
        assert_eq!(counters.played.load(Ordering::Acquire), 1);
        assert_eq!(counters.underruns.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn callback_reads_across_ring_wrap() {
        let (mut producer, consumer) = RingBuffer::<f32>::new(4);
        let counters = Arc::new(PlaybackCounters::default());
        let mut callback = output_callback(consumer, Arc::clone(&counters));

        for s in [1.0, 2.0, 3.0] {
            producer.push(s).unwrap();
        }
        let mut data = [0.0; 2];
        callback(&mut data);
        for s in [4.0, 5.0, 6.0] {
            producer.push(s).unwrap();
        }
        let mut data = [0.0; 4];
        callback(&mut data);
        assert_eq!(data, [3.0, 4.0, 5.0, 6.0]);
        assert_eq!(counters.played.load(Ordering::Acquire), 6);
    }
}
