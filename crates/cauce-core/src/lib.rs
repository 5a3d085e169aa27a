//! Cauce Core - output scheduling for pull-based audio
//!
//! This crate moves audio from an upstream renderer into an output device that
//! accepts writes in irregular amounts and at its own pace. It is the part of a
//! sink that sits between "render N frames at time T" and "write these samples,
//! tell me how many you took".
//!
//! # Core Abstractions
//!
//! ## Collaborators
//!
//! - [`OutputDevice`] - Non-blocking sink with a playback position counter
//! - [`Renderer`] - Upstream graph; implemented for closures
//!
//! ## Scheduling
//!
//! - [`TickDriver`] - One session's scheduler; call [`TickDriver::tick`] on a fixed period
//! - [`Overflow`] - Unaccepted tail of the last render, resubmitted first
//! - [`LatencyEstimator`] - Fixed target, or auto-latency estimated at startup
//!
//! ## Data
//!
//! - [`SampleBuffer`] - `(channel, frame)` block filled by the renderer
//! - [`SessionConfig`] - Sample rate, channel count, optional buffer size
//!
//! ## Testing and Simulation
//!
//! - [`VirtualDevice`] - Bounded in-memory device with manual playback
//! - [`ManualClock`] - Hand-driven clock for deterministic auto-latency
//! - [`Silence`] - Renderer that outputs zeros
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`). Disable the default `std`
//! feature in your `Cargo.toml`; [`SystemClock`] and the `std::error::Error`
//! impls go away, everything else stays:
//!
//! ```toml
//! [dependencies]
//! cauce-core = { version = "0.1", default-features = false }
//! ```
//!
//! The optional `tracing` feature emits `trace`-level events per tick and a
//! `debug` event when auto-latency settles.
//!
//! # Example
//!
//! ```rust
//! use cauce_core::{
//!     ManualClock, RenderError, SampleBuffer, SessionConfig, TickDriver, VirtualDevice,
//! };
//!
//! let config = SessionConfig::default().with_channels(1).with_buffer_size(64);
//! let device = VirtualDevice::new(1, 44_100, 1024).recording();
//! let mut phase = 0.0_f32;
//! let tone = move |_time: f64, buffer: &mut SampleBuffer| -> Result<(), RenderError> {
//!     for s in buffer.channel_mut(0) {
//!         *s = phase.sin();
//!         phase += 0.1;
//!     }
//!     Ok(())
//! };
//!
//! let mut driver = TickDriver::with_clock(config, device, tone, ManualClock::new()).unwrap();
//! driver.tick().unwrap();
//! driver.device_mut().play(32);
//! driver.tick().unwrap();
//! assert_eq!(driver.write_time(), 96.0);
//! assert_eq!(driver.playback_time(), 32.0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod buffer;
pub mod clock;
pub mod config;
pub mod device;
pub mod driver;
pub mod latency;
pub mod overflow;
pub mod render;

pub use buffer::SampleBuffer;
#[cfg(feature = "std")]
pub use clock::SystemClock;
pub use clock::{Clock, ManualClock};
pub use config::{ConfigError, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, SessionConfig};
pub use device::{OutputDevice, VirtualDevice};
pub use driver::{TickDriver, TickOutcome};
pub use latency::{AUTO_LATENCY_SEED_SECS, LatencyEstimator};
pub use overflow::Overflow;
pub use render::{RenderError, Renderer, Silence};
