//! Owned periodic tick session.
//!
//! [`OutputSession`] moves a [`TickDriver`] behind a `parking_lot::Mutex` and
//! drives it from a dedicated `cauce-tick` thread paced by
//! `crossbeam_channel::tick`. Every tick runs on that one thread, so ticks
//! never overlap; other threads only take the lock for queries.
//!
//! The ticker stops when [`OutputSession::stop`] is called, when the session
//! is dropped, or when the renderer fails. A render failure is logged at
//! `error` and handed back from `stop()`.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use cauce_core::{Clock, OutputDevice, RenderError, Renderer, SystemClock, TickDriver};
use crossbeam_channel::{Receiver, Sender, bounded, select, tick};
use parking_lot::Mutex;

use crate::cpal_device::{CpalDevice, StreamHandle};
use crate::settings::OutputSettings;
use crate::{Error, Result};

type SharedDriver<D, R, C> = Arc<Mutex<TickDriver<D, R, C>>>;

/// A running output session.
pub struct OutputSession<D, R, C = SystemClock>
where
    D: OutputDevice + Send + 'static,
    R: Renderer + Send + 'static,
    C: Clock + Send + 'static,
{
    driver: SharedDriver<D, R, C>,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<std::result::Result<(), RenderError>>>,
    // Dropped after the worker is joined; see `Drop`.
    stream: Option<StreamHandle>,
}

impl<R> OutputSession<CpalDevice, R, SystemClock>
where
    R: Renderer + Send + 'static,
{
    /// Opens a cpal output stream per `settings` and starts ticking into it.
    pub fn open(settings: &OutputSettings, renderer: R) -> Result<Self> {
        let config = settings.session_config()?;
        let (device, stream) = CpalDevice::open(settings)?;
        let driver = TickDriver::new(config, device, renderer)?;
        let mut session = Self::start(driver, settings.tick_interval())?;
        session.stream = Some(stream);
        Ok(session)
    }
}

impl<D, R, C> OutputSession<D, R, C>
where
    D: OutputDevice + Send + 'static,
    R: Renderer + Send + 'static,
    C: Clock + Send + 'static,
{
    /// Starts ticking `driver` every `interval`.
    ///
    /// The first tick runs immediately on the ticker thread.
    pub fn start(driver: TickDriver<D, R, C>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::InvalidSettings(
                "tick interval must be positive".to_string(),
            ));
        }

        tracing::info!(
            device = driver.device().name(),
            sample_rate = driver.config().sample_rate,
            channels = driver.config().channels,
            auto_latency = driver.is_auto_latency(),
            interval_ms = interval.as_secs_f64() * 1000.0,
            "output session started"
        );

        let driver = Arc::new(Mutex::new(driver));
        let (stop_tx, stop_rx) = bounded(1);
        let worker = std::thread::Builder::new()
            .name("cauce-tick".to_string())
            .spawn({
                let driver = Arc::clone(&driver);
                move || run_ticker(&driver, &stop_rx, interval)
            })?;

        Ok(Self {
            driver,
            stop_tx: Some(stop_tx),
            worker: Some(worker),
            stream: None,
        })
    }

    /// Stops the ticker and waits for it.
    ///
    /// Returns the render failure that ended the session early, if any.
    pub fn stop(mut self) -> Result<()> {
        self.shutdown()
    }

    /// Whether the ticker thread is still ticking.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    /// Playback position in frames.
    pub fn playback_time(&self) -> f64 {
        self.driver.lock().playback_time()
    }

    /// Write position in frames.
    pub fn write_time(&self) -> f64 {
        self.driver.lock().write_time()
    }

    /// Current target buffer in frames.
    pub fn buffer_size_frames(&self) -> f64 {
        self.driver.lock().buffer_size_frames()
    }

    /// Runs `f` with exclusive access to the driver.
    ///
    /// The ticker is blocked for as long as `f` runs.
    pub fn with_driver<T>(&self, f: impl FnOnce(&mut TickDriver<D, R, C>) -> T) -> T {
        f(&mut self.driver.lock())
    }

    fn shutdown(&mut self) -> Result<()> {
        // Dropping the sender wakes the ticker even if the send is never seen.
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        let outcome = worker.join().map_err(|_| Error::TickerPanicked)?;
        tracing::info!(
            write_position = self.driver.lock().write_position(),
            "output session stopped"
        );
        outcome.map_err(Error::from)
    }
}

impl<D, R, C> Drop for OutputSession<D, R, C>
where
    D: OutputDevice + Send + 'static,
    R: Renderer + Send + 'static,
    C: Clock + Send + 'static,
{
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            tracing::warn!(%err, "output session ended with an error");
        }
        self.stream.take();
    }
}

impl<D, R, C> std::fmt::Debug for OutputSession<D, R, C>
where
    D: OutputDevice + Send + 'static,
    R: Renderer + Send + 'static,
    C: Clock + Send + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputSession")
            .field("running", &self.is_running())
            .field("stream", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

/// Ticker thread body.
fn run_ticker<D, R, C>(
    driver: &Mutex<TickDriver<D, R, C>>,
    stop_rx: &Receiver<()>,
    interval: Duration,
) -> std::result::Result<(), RenderError>
where
    D: OutputDevice,
    R: Renderer,
    C: Clock,
{
    let ticker = tick(interval);
    loop {
        match driver.lock().tick() {
            Ok(outcome) => tracing::trace!(?outcome, "tick"),
            Err(err) => {
                tracing::error!(%err, "render failed, stopping output session");
                return Err(err);
            }
        }

        let keep_going = select! {
            recv(stop_rx) -> _ => false,
            recv(ticker) -> _ => true,
        };
        if !keep_going {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cauce_core::{ManualClock, SessionConfig, Silence, VirtualDevice};

    fn driver() -> TickDriver<VirtualDevice, Silence, ManualClock> {
        let config = SessionConfig::default().with_buffer_size(64);
        let device = VirtualDevice::new(2, 44100, 1024);
        TickDriver::with_clock(config, device, Silence, ManualClock::new()).unwrap()
    }

    #[test]
    fn rejects_zero_interval() {
        let result = OutputSession::start(driver(), Duration::ZERO);
        assert!(matches!(result, Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn first_tick_fills_target() {
        let session = OutputSession::start(driver(), Duration::from_millis(50)).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while session.write_time() < 64.0 && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(session.write_time(), 64.0);
        assert_eq!(session.buffer_size_frames(), 64.0);
        assert!(session.stop().is_ok());
    }

    #[test]
    fn drop_joins_ticker() {
        let session = OutputSession::start(driver(), Duration::from_millis(1)).unwrap();
        assert!(session.is_running());
        drop(session);
    }
}
