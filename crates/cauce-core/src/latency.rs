//! Target buffer size, fixed or estimated at startup.
//!
//! Without a configured buffer size the real output latency is unknown. The
//! estimator lets the target grow with wall-clock time since the session
//! started (`sample_rate * elapsed`) until the device reports its first
//! nonzero playback offset, then freezes it. The first nonzero reading is
//! taken at face value, so a device with a coarse position counter can settle
//! slightly low.

/// Seconds of audio used as the target before the first auto-latency update.
pub const AUTO_LATENCY_SEED_SECS: f64 = 0.02;

/// Buffer size target in frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyEstimator {
    frames: f64,
    sample_rate: f64,
    auto: bool,
}

impl LatencyEstimator {
    /// A fixed target that never changes.
    pub fn fixed(frames: u32) -> Self {
        Self {
            frames: f64::from(frames),
            sample_rate: 0.0,
            auto: false,
        }
    }

    /// An auto-latency target seeded at [`AUTO_LATENCY_SEED_SECS`] of audio.
    pub fn auto(sample_rate: u32) -> Self {
        let sample_rate = f64::from(sample_rate);
        Self {
            frames: sample_rate * AUTO_LATENCY_SEED_SECS,
            sample_rate,
            auto: true,
        }
    }

    /// Current target in frames. Fractional while auto-latency is running.
    #[inline]
    pub fn buffer_size_frames(&self) -> f64 {
        self.frames
    }

    /// True until the first nonzero playback offset has been observed.
    #[inline]
    pub fn is_auto(&self) -> bool {
        self.auto
    }

    /// Feeds one observation. Returns true if this call froze the estimate.
    ///
    /// `elapsed_secs` is time since the session started; `playback_offset` is
    /// the device's consumed-sample count. No-op once frozen or when fixed.
    pub fn observe(&mut self, elapsed_secs: f64, playback_offset: u64) -> bool {
        if !self.auto {
            return false;
        }
        self.frames = self.sample_rate * elapsed_secs.max(0.0);
        if playback_offset != 0 {
            self.auto = false;
            return true;
        }
        false
    }
}
