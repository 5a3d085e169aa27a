//! Session configuration and validation.

/// Sample rate used when none is specified.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Channel count used when none is specified.
pub const DEFAULT_CHANNELS: u16 = 2;

/// Immutable parameters of one output session.
///
/// `buffer_size: None` selects auto-latency mode (see
/// [`LatencyEstimator`](crate::LatencyEstimator)).
///
/// ```rust
/// use cauce_core::SessionConfig;
///
/// let config = SessionConfig::default().with_buffer_size(512);
/// assert_eq!(config.sample_rate, 44_100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Target device buffer in frames, or `None` for auto-latency.
    pub buffer_size: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            buffer_size: None,
        }
    }
}

impl SessionConfig {
    /// Sets the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Sets the channel count.
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels;
        self
    }

    /// Uses a fixed buffer size in frames.
    pub fn with_buffer_size(mut self, frames: u32) -> Self {
        self.buffer_size = Some(frames);
        self
    }

    /// Switches to auto-latency mode.
    pub fn with_auto_latency(mut self) -> Self {
        self.buffer_size = None;
        self
    }

    /// Rejects zero sample rate, channel count, or buffer size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        if self.channels == 0 {
            return Err(ConfigError::ZeroChannels);
        }
        if self.buffer_size == Some(0) {
            return Err(ConfigError::ZeroBufferSize);
        }
        Ok(())
    }
}

/// Errors raised when a session is constructed with unusable parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Sample rate must be positive.
    ZeroSampleRate,
    /// Channel count must be positive.
    ZeroChannels,
    /// A fixed buffer size must be positive.
    ZeroBufferSize,
    /// The device was opened with a different format than the session asks for.
    DeviceMismatch {
        /// Session sample rate.
        sample_rate: u32,
        /// Session channel count.
        channels: u16,
        /// Device sample rate.
        device_sample_rate: u32,
        /// Device channel count.
        device_channels: u16,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ZeroSampleRate => write!(f, "sample rate must be positive"),
            Self::ZeroChannels => write!(f, "channel count must be positive"),
            Self::ZeroBufferSize => write!(f, "buffer size must be positive"),
            Self::DeviceMismatch {
                sample_rate,
                channels,
                device_sample_rate,
                device_channels,
            } => write!(
                f,
                "session wants {channels} ch @ {sample_rate} Hz but device is {device_channels} ch @ {device_sample_rate} Hz"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
