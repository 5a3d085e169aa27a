//! The periodic tick that moves audio from the renderer into the device.
//!
//! [`TickDriver::tick`] is meant to be called on a fixed wall-clock period
//! (10 ms is a good default). Each call:
//!
//! 1. Resubmits any [`Overflow`] left by the previous tick. If the device takes
//!    none or only part of it, the tick ends there.
//! 2. Computes demand:
//!    `playback_offset + buffer_size_frames * channels - write_position`.
//! 3. Updates the auto-latency estimate, if one is running.
//! 4. If at least one whole frame is needed, renders `floor(demand / channels)`
//!    frames at the current write time, writes them, and keeps any unaccepted
//!    tail as the new overflow.
//!
//! A device that accepts nothing is not an error; the next tick simply tries
//! again. Render failures are returned to the caller and nothing is written.
//!
//! ```rust
//! use cauce_core::{ManualClock, SessionConfig, Silence, TickDriver, TickOutcome, VirtualDevice};
//!
//! let config = SessionConfig::default().with_buffer_size(256);
//! let device = VirtualDevice::new(2, 44_100, 4096);
//! let mut driver = TickDriver::with_clock(config, device, Silence, ManualClock::new()).unwrap();
//!
//! assert_eq!(
//!     driver.tick().unwrap(),
//!     TickOutcome::Rendered { frames: 256, accepted: 512 }
//! );
//! assert_eq!(driver.write_time(), 256.0);
//! // Nothing has played yet, so the device is not hungry.
//! assert_eq!(driver.tick().unwrap(), TickOutcome::Idle);
//! ```

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::buffer::SampleBuffer;
use crate::clock::Clock;
use crate::config::{ConfigError, SessionConfig};
use crate::device::OutputDevice;
use crate::latency::LatencyEstimator;
use crate::overflow::Overflow;
use crate::render::{RenderError, Renderer};

#[cfg(feature = "std")]
use crate::clock::SystemClock;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Pending overflow was refused outright; nothing changed.
    Saturated,
    /// Pending overflow was partly accepted; no new audio was rendered.
    Draining {
        /// Samples accepted from the overflow.
        accepted: usize,
    },
    /// Less than one frame was needed.
    Idle,
    /// New audio was rendered and written.
    Rendered {
        /// Frames requested from the renderer.
        frames: usize,
        /// Interleaved samples the device accepted from this render.
        accepted: usize,
    },
}

/// Owns one output session's scheduling state.
///
/// `write_position` lives here and nowhere else; the renderer sees it only as
/// the `time` argument of [`Renderer::render`].
pub struct TickDriver<D, R, C> {
    config: SessionConfig,
    device: D,
    renderer: R,
    clock: C,
    channels: usize,
    started: f64,
    latency: LatencyEstimator,
    write_position: u64,
    rendered: SampleBuffer,
    interleaved: Vec<f32>,
    overflow: Overflow,
}

#[cfg(feature = "std")]
impl<D: OutputDevice, R: Renderer> TickDriver<D, R, SystemClock> {
    /// Creates a driver timed by the system clock. The session starts now.
    pub fn new(config: SessionConfig, device: D, renderer: R) -> Result<Self, ConfigError> {
        Self::with_clock(config, device, renderer, SystemClock::new())
    }
}

impl<D: OutputDevice, R: Renderer, C: Clock> TickDriver<D, R, C> {
    /// Creates a driver timed by `clock`. The session starts at the clock's
    /// current reading.
    ///
    /// Fails if `config` is invalid or the device was opened with a different
    /// channel count or sample rate.
    pub fn with_clock(
        config: SessionConfig,
        device: D,
        renderer: R,
        clock: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if device.channels() != config.channels || device.sample_rate() != config.sample_rate {
            return Err(ConfigError::DeviceMismatch {
                sample_rate: config.sample_rate,
                channels: config.channels,
                device_sample_rate: device.sample_rate(),
                device_channels: device.channels(),
            });
        }

        let latency = match config.buffer_size {
            Some(frames) => LatencyEstimator::fixed(frames),
            None => LatencyEstimator::auto(config.sample_rate),
        };
        let channels = usize::from(config.channels);
        let started = clock.now_secs();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            device = device.name(),
            sample_rate = config.sample_rate,
            channels = config.channels,
            buffer_size = ?config.buffer_size,
            "tick driver created"
        );

        Ok(Self {
            config,
            device,
            renderer,
            clock,
            channels,
            started,
            latency,
            write_position: 0,
            rendered: SampleBuffer::new(channels, 0),
            interleaved: Vec::new(),
            overflow: Overflow::new(),
        })
    }

    /// Runs one scheduling step. See the [module docs](self) for the sequence.
    pub fn tick(&mut self) -> Result<TickOutcome, RenderError> {
        let playback_offset = self.device.playback_offset();

        if let Some(pending) = self.overflow.pending() {
            let submitted = pending.len();
            let accepted = self.device.write(pending).min(submitted);
            if accepted == 0 {
                #[cfg(feature = "tracing")]
                tracing::trace!(pending = submitted, "device saturated");
                return Ok(TickOutcome::Saturated);
            }
            self.write_position += accepted as u64;
            self.overflow.consume(accepted);
            if accepted < submitted {
                #[cfg(feature = "tracing")]
                tracing::trace!(accepted, remaining = self.overflow.len(), "overflow draining");
                return Ok(TickOutcome::Draining { accepted });
            }
        }

        let channels = self.channels as f64;
        let samples_needed = playback_offset as f64
            + self.latency.buffer_size_frames() * channels
            - self.write_position as f64;

        let elapsed = self.clock.now_secs() - self.started;
        if self.latency.observe(elapsed, playback_offset) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                buffer_size_frames = self.latency.buffer_size_frames(),
                elapsed_secs = elapsed,
                "auto-latency settled"
            );
        }

        if samples_needed < channels {
            return Ok(TickOutcome::Idle);
        }

        // Positive here, so truncation is floor.
        let frames = (samples_needed / channels) as usize;
        let time = self.write_time();
        self.rendered.reshape(frames);
        self.renderer.render(time, &mut self.rendered)?;
        self.rendered.interleave_into(&mut self.interleaved);

        let submitted = self.interleaved.len();
        let accepted = self.device.write(&self.interleaved).min(submitted);
        self.write_position += accepted as u64;
        if accepted < submitted {
            self.overflow.capture(&mut self.interleaved, accepted);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(frames, accepted, time, "rendered");

        Ok(TickOutcome::Rendered { frames, accepted })
    }

    /// Per-channel samples the device has played.
    pub fn playback_time(&self) -> f64 {
        self.device.playback_offset() as f64 / self.channels as f64
    }

    /// Per-channel samples handed to the device. Never behind
    /// [`playback_time`](Self::playback_time) for a device that honours its
    /// contract.
    pub fn write_time(&self) -> f64 {
        self.write_position as f64 / self.channels as f64
    }

    /// Total interleaved samples the device has accepted.
    pub fn write_position(&self) -> u64 {
        self.write_position
    }

    /// Current buffer target in frames.
    pub fn buffer_size_frames(&self) -> f64 {
        self.latency.buffer_size_frames()
    }

    /// True while the buffer target is still being estimated.
    pub fn is_auto_latency(&self) -> bool {
        self.latency.is_auto()
    }

    /// Samples rendered but not yet accepted by the device.
    pub fn pending_overflow(&self) -> usize {
        self.overflow.len()
    }

    /// The session parameters.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The output device.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// The output device, mutably.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The upstream renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The upstream renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Tears the session down, handing back the device and renderer.
    ///
    /// Any pending overflow is dropped.
    pub fn into_parts(self) -> (D, R) {
        (self.device, self.renderer)
    }
}

impl<D, R, C> core::fmt::Debug for TickDriver<D, R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TickDriver")
            .field("config", &self.config)
            .field("write_position", &self.write_position)
            .field("latency", &self.latency)
            .field("pending_overflow", &self.overflow.len())
            .finish_non_exhaustive()
    }
}
