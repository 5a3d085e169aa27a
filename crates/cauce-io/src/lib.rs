//! Real-time output for the cauce tick scheduler.
//!
//! This crate provides:
//!
//! - **cpal output**: [`CpalDevice`] adapts a callback-driven cpal stream to
//!   the non-blocking [`OutputDevice`](cauce_core::OutputDevice) contract
//!   through a lock-free `rtrb` ring
//! - **Periodic ticking**: [`OutputSession`] owns a [`TickDriver`] and runs it
//!   on a dedicated thread until stopped or dropped
//! - **Settings**: [`OutputSettings`] with serde defaults for embedding in a
//!   host's config file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cauce_core::{RenderError, SampleBuffer};
//! use cauce_io::{OutputSession, OutputSettings};
//!
//! let settings = OutputSettings::default();
//! let mut phase = 0.0f32;
//! let session = OutputSession::open(&settings, move |_time: f64, buf: &mut SampleBuffer|
//!     -> Result<(), RenderError> {
//!     for frame in 0..buf.frames() {
//!         let s = (phase * std::f32::consts::TAU).sin() * 0.2;
//!         phase = (phase + 440.0 / 44100.0).fract();
//!         buf.set_frame(frame, &[s, s]);
//!     }
//!     Ok(())
//! })?;
//!
//! std::thread::sleep(std::time::Duration::from_secs(2));
//! session.stop()?;
//! ```
//!
//! [`TickDriver`]: cauce_core::TickDriver

mod cpal_device;
mod session;
mod settings;

pub use cpal_device::{CpalDevice, StreamHandle};
pub use session::OutputSession;
pub use settings::{DEFAULT_RING_MS, DEFAULT_TICK_INTERVAL_MS, OutputSettings};

use cauce_core::{ConfigError, RenderError};

/// Error types for output sessions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Session configuration was rejected.
    #[error("Invalid session config: {0}")]
    Config(#[from] ConfigError),

    /// The renderer failed and the session stopped.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The device cannot play the requested format.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Output settings outside the core config were rejected.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// The ticker thread panicked.
    #[error("Ticker thread panicked")]
    TickerPanicked,

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for output operations.
pub type Result<T> = std::result::Result<T, Error>;
