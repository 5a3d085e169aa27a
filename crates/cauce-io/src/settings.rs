//! Serializable output settings.
//!
//! [`OutputSettings`] is the host-facing shape of a session's configuration:
//! every field has a default, so it can be embedded in an application's own
//! TOML or JSON config with only the fields that matter spelled out.
//!
//! ```toml
//! [output]
//! sample_rate = 48000
//! buffer_size = 1024      # omit for auto-latency
//! tick_interval_ms = 10
//! device_name = "USB"
//! ```

use std::time::Duration;

use cauce_core::{DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, SessionConfig};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default tick period in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Default capacity of the cpal ring buffer in milliseconds of audio.
pub const DEFAULT_RING_MS: u32 = 250;

/// Output session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Fixed target buffer in frames; `None` selects auto-latency.
    pub buffer_size: Option<u32>,
    /// Period of the tick timer in milliseconds.
    pub tick_interval_ms: u64,
    /// Capacity of the lock-free ring between the ticker and the cpal
    /// callback, in milliseconds of audio.
    pub ring_ms: u32,
    /// Case-insensitive substring of the output device name; `None` uses the
    /// system default.
    pub device_name: Option<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            buffer_size: None,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            ring_ms: DEFAULT_RING_MS,
            device_name: None,
        }
    }
}

impl OutputSettings {
    /// Validates the settings and extracts the core session config.
    pub fn session_config(&self) -> Result<SessionConfig> {
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidSettings(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if self.ring_ms == 0 {
            return Err(Error::InvalidSettings("ring_ms must be positive".to_string()));
        }
        let config = SessionConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
            buffer_size: self.buffer_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Tick period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Ring capacity in interleaved samples.
    ///
    /// Never smaller than one fixed buffer target, so a configured
    /// `buffer_size` can actually be reached.
    pub fn ring_capacity(&self) -> usize {
        let channels = usize::from(self.channels);
        let from_ms = self.sample_rate as usize * self.ring_ms as usize / 1000 * channels;
        let from_target = self.buffer_size.unwrap_or(0) as usize * channels;
        from_ms.max(from_target).max(channels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cauce_core::ConfigError;

    #[test]
    fn defaults() {
        let settings = OutputSettings::default();
        assert_eq!(settings.sample_rate, 44100);
        assert_eq!(settings.channels, 2);
        assert_eq!(settings.buffer_size, None);
        assert_eq!(settings.tick_interval(), Duration::from_millis(10));
    }

    #[test]
    fn session_config_carries_fields() {
        let settings = OutputSettings {
            sample_rate: 48000,
            channels: 1,
            buffer_size: Some(512),
            ..Default::default()
        };
        let config = settings.session_config().unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.buffer_size, Some(512));
    }

    #[test]
    fn rejects_zero_interval() {
        let settings = OutputSettings {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.session_config(),
            Err(Error::InvalidSettings(_))
        ));
    }

    #[test]
    fn rejects_zero_channels() {
        let settings = OutputSettings {
            channels: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.session_config(),
            Err(Error::Config(ConfigError::ZeroChannels))
        ));
    }

    #[test]
    fn ring_capacity_covers_fixed_target() {
        let settings = OutputSettings {
            sample_rate: 48000,
            ring_ms: 10,
            buffer_size: Some(4096),
            ..Default::default()
        };
        assert_eq!(settings.ring_capacity(), 8192);

        let settings = OutputSettings {
            sample_rate: 48000,
            ring_ms: 100,
            ..Default::default()
        };
        assert_eq!(settings.ring_capacity(), 9600);
    }
}
