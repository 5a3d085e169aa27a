//! Property-based tests for the cauce-core tick driver.
//!
//! Random device acceptance scripts and playback advances must never drop,
//! duplicate, or reorder samples, and must never move the write position
//! backwards.

use std::collections::VecDeque;

use cauce_core::{
    ManualClock, OutputDevice, RenderError, Renderer, SampleBuffer, SessionConfig, TickDriver,
};
use proptest::prelude::*;

/// Device that accepts at most the next scripted count per write.
struct Flaky {
    channels: u16,
    limits: VecDeque<usize>,
    accepted: Vec<f32>,
    offset: u64,
}

impl OutputDevice for Flaky {
    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        48000
    }

    fn playback_offset(&self) -> u64 {
        self.offset
    }

    fn write(&mut self, samples: &[f32]) -> usize {
        let n = samples.len().min(self.limits.pop_front().unwrap_or(0));
        self.accepted.extend_from_slice(&samples[..n]);
        n
    }
}

/// Counter renderer: every sample is its own index in the rendered stream.
#[derive(Default)]
struct Counter {
    produced: usize,
}

impl Renderer for Counter {
    fn render(&mut self, _time: f64, buffer: &mut SampleBuffer) -> Result<(), RenderError> {
        for frame in 0..buffer.frames() {
            for channel in 0..buffer.channels() {
                buffer.set(channel, frame, self.produced as f32);
                self.produced += 1;
            }
        }
        Ok(())
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// For any acceptance script (zeros and partials included), the accepted
    /// stream is exactly 0, 1, 2, ... and whatever was rendered but not
    /// accepted is still waiting in the overflow.
    #[test]
    fn accepted_stream_is_gap_free(
        channels in 1u16..=6,
        buffer_size in 1u32..512,
        limits in prop::collection::vec(0usize..700, 1..80),
        advances in prop::collection::vec(0u64..400, 1..80),
    ) {
        let device = Flaky {
            channels,
            limits: limits.iter().copied().collect(),
            accepted: Vec::new(),
            offset: 0,
        };
        let config = SessionConfig::default()
            .with_sample_rate(48000)
            .with_channels(channels)
            .with_buffer_size(buffer_size);
        let mut driver =
            TickDriver::with_clock(config, device, Counter::default(), ManualClock::new()).unwrap();

        let mut last_write_time = 0.0;
        for &advance in advances.iter().cycle().take(limits.len() + 8) {
            driver.tick().unwrap();

            let write_time = driver.write_time();
            prop_assert!(write_time >= last_write_time);
            prop_assert!(write_time >= driver.playback_time());
            last_write_time = write_time;

            let dev = driver.device_mut();
            dev.offset = (dev.offset + advance).min(dev.accepted.len() as u64);
        }

        let accepted = &driver.device().accepted;
        for (i, &sample) in accepted.iter().enumerate() {
            prop_assert_eq!(sample, i as f32, "sample {} out of order", i);
        }
        prop_assert_eq!(
            accepted.len() + driver.pending_overflow(),
            driver.renderer().produced
        );
        prop_assert_eq!(driver.write_position(), accepted.len() as u64);
    }

    /// Every render request is for whole frames and never exceeds the demand
    /// formula's bound of `buffer_size` frames ahead of playback.
    #[test]
    fn write_position_stays_within_target(
        buffer_size in 1u32..2048,
        advances in prop::collection::vec(0u64..1024, 1..60),
    ) {
        let device = Flaky {
            channels: 2,
            limits: VecDeque::from(vec![usize::MAX; advances.len() + 1]),
            accepted: Vec::new(),
            offset: 0,
        };
        let config = SessionConfig::default()
            .with_sample_rate(48000)
            .with_buffer_size(buffer_size);
        let mut driver =
            TickDriver::with_clock(config, device, Counter::default(), ManualClock::new()).unwrap();

        for &advance in &advances {
            driver.tick().unwrap();
            prop_assert_eq!(driver.write_position() % 2, 0);
            let ahead = driver.write_position() - driver.device().offset;
            prop_assert!(ahead <= u64::from(buffer_size) * 2);

            let dev = driver.device_mut();
            dev.offset = (dev.offset + advance).min(dev.accepted.len() as u64);
        }
    }
}
