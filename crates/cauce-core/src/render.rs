//! Upstream renderer contract.
//!
//! The signal graph feeding the sink is opaque here. Each tick the driver
//! hands it a [`SampleBuffer`] already shaped to the number of frames the
//! device wants, plus the per-channel write time those frames start at.

#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::buffer::SampleBuffer;

/// Produces audio on demand.
///
/// `time` is the per-channel sample time of the first frame in `buffer`
/// (total samples written so far divided by channel count), usable for
/// parameter automation. `buffer` arrives zeroed; anything left untouched
/// plays as silence.
///
/// Closures with the matching signature implement this trait:
///
/// ```rust
/// use cauce_core::{RenderError, Renderer, SampleBuffer};
///
/// let mut ramp = |_time: f64, buffer: &mut SampleBuffer| -> Result<(), RenderError> {
///     for (i, s) in buffer.channel_mut(0).iter_mut().enumerate() {
///         *s = i as f32;
///     }
///     Ok(())
/// };
/// let mut buffer = SampleBuffer::new(1, 4);
/// ramp.render(0.0, &mut buffer).unwrap();
/// assert_eq!(buffer.channel(0), &[0.0, 1.0, 2.0, 3.0]);
/// ```
pub trait Renderer {
    /// Fills `buffer` with the next `buffer.frames()` frames.
    fn render(&mut self, time: f64, buffer: &mut SampleBuffer) -> Result<(), RenderError>;
}

impl<F> Renderer for F
where
    F: FnMut(f64, &mut SampleBuffer) -> Result<(), RenderError>,
{
    fn render(&mut self, time: f64, buffer: &mut SampleBuffer) -> Result<(), RenderError> {
        self(time, buffer)
    }
}

/// Renderer that always produces silence.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silence;

impl Renderer for Silence {
    fn render(&mut self, _time: f64, buffer: &mut SampleBuffer) -> Result<(), RenderError> {
        buffer.clear();
        Ok(())
    }
}

/// The upstream graph could not produce the requested frames.
///
/// Fatal to the tick that hit it; the driver does not substitute silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError {
    message: String,
}

impl RenderError {
    /// Creates an error with a description of what failed.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure description.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl core::fmt::Display for RenderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "render failed: {}", self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RenderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_clears_buffer() {
        let mut buffer = SampleBuffer::new(2, 3);
        buffer.set(1, 2, 0.9);
        Silence.render(12.0, &mut buffer).unwrap();
        assert!(buffer.interleaved().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn closure_receives_time() {
        let mut seen = None;
        let mut renderer = |time: f64, _: &mut SampleBuffer| -> Result<(), RenderError> {
            seen = Some(time);
            Ok(())
        };
        renderer.render(441.5, &mut SampleBuffer::new(1, 1)).unwrap();
        assert_eq!(seen, Some(441.5));
    }

    #[test]
    fn closure_errors_propagate() {
        let mut renderer = |_: f64, _: &mut SampleBuffer| -> Result<(), RenderError> {
            Err(RenderError::new("graph offline"))
        };
        let err = renderer.render(0.0, &mut SampleBuffer::new(1, 1)).unwrap_err();
        assert_eq!(err.message(), "graph offline");
    }

    #[cfg(feature = "std")]
    #[test]
    fn display_includes_message() {
        assert_eq!(RenderError::new("boom").to_string(), "render failed: boom");
    }
}
