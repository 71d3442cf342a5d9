//! Continuous buzzer - plays a tone in short bursts until stopped
//!
//! The buzzer owns a single worker thread per run. The worker alternates
//! between a blocking burst on the [`ToneOutput`] and a short pause, and keeps
//! going for as long as the shared `is_playing` flag is set.
//!
//! The pause is cancellable: `stop` drops the cancel sender, which wakes a
//! pending `recv_timeout` straight away. A burst is not preemptible, so a
//! worker that is mid-burst exits once the tone output returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::EmitterConfig;
use crate::consts;
use crate::error::{CancellationRequested, EmitterError, ToneError};
use crate::tone::ToneOutput;

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle to the running (or finishing) worker thread.
struct Worker {
    handle: JoinHandle<Result<(), ToneError>>,
    /// Dropped to cancel the worker's pause.
    cancel: Option<Sender<()>>,
}

/// A buzzer that keeps playing until [`stop`](Self::stop) is called.
///
/// ```ignore
/// let mut buzzer = ContinuousBuzzer::new(Arc::new(tone));
/// buzzer.start(10_000.0)?;
/// // ...
/// buzzer.stop();
/// buzzer.wait()?;
/// ```
pub struct ContinuousBuzzer {
    output: Arc<dyn ToneOutput>,
    config: EmitterConfig,
    frequency_hz: Option<f64>,
    is_playing: Arc<AtomicBool>,
    worker: Option<Worker>,
    on_play: Option<Listener>,
    on_stop: Option<Listener>,
}

impl ContinuousBuzzer {
    pub fn new(output: Arc<dyn ToneOutput>) -> Self {
        Self::with_config(output, EmitterConfig::default())
    }

    pub fn with_config(output: Arc<dyn ToneOutput>, config: EmitterConfig) -> Self {
        Self {
            output,
            config,
            frequency_hz: None,
            is_playing: Arc::new(AtomicBool::new(false)),
            worker: None,
            on_play: None,
            on_stop: None,
        }
    }

    /// Start playing `frequency_hz` in bursts on a background thread.
    ///
    /// Returns [`EmitterError::AlreadyPlaying`] if a run is in progress; the
    /// running worker is left alone.
    ///
    /// Returns [`EmitterError::StillStopping`] if the previous run was stopped
    /// mid-burst and its worker has not exited yet; `start` never waits for it.
    /// A previous run that ended on a tone failure reports that failure here,
    /// once.
    pub fn start(&mut self, frequency_hz: f64) -> Result<(), EmitterError> {
        if self.is_playing() {
            log::warn!("Buzzer already playing, ignoring start at {}Hz", frequency_hz);
            return Err(EmitterError::AlreadyPlaying);
        }

        if self.is_worker_active() {
            log::warn!(
                "Buzzer still finishing its last burst, ignoring start at {}Hz",
                frequency_hz
            );
            return Err(EmitterError::StillStopping);
        }
        // finished, so this join does not block
        self.reap()?;

        let (cancel_tx, cancel_rx) = mpsc::channel();
        let run = Run {
            output: Arc::clone(&self.output),
            frequency_hz,
            config: self.config,
            is_playing: Arc::clone(&self.is_playing),
            pause: Pause { cancel_rx },
            on_play: self.on_play.clone(),
            on_stop: self.on_stop.clone(),
        };

        self.is_playing.store(true, Ordering::Release);
        let handle = match thread::Builder::new()
            .name(consts::WORKER_THREAD_NAME.to_string())
            .spawn(move || run.execute())
        {
            Ok(handle) => handle,
            Err(e) => {
                self.is_playing.store(false, Ordering::Release);
                return Err(EmitterError::Spawn(e));
            }
        };

        self.frequency_hz = Some(frequency_hz);
        self.worker = Some(Worker {
            handle,
            cancel: Some(cancel_tx),
        });

        log::info!(
            "Buzzer started: {}Hz, {}ms bursts, {}ms pause",
            frequency_hz,
            self.config.burst_duration_ms,
            self.config.pause_duration_ms
        );
        Ok(())
    }

    /// Stop playing. Does not block; does nothing if not playing.
    pub fn stop(&mut self) {
        if !self.is_playing.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(worker) = self.worker.as_mut() {
            worker.cancel.take();
        }
        log::info!("Buzzer stopped");
    }

    /// Block until the current worker exits and return how its run ended.
    ///
    /// Only returns on its own after [`stop`](Self::stop) or a tone failure.
    pub fn wait(&mut self) -> Result<(), EmitterError> {
        self.reap()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing.load(Ordering::Acquire)
    }

    /// True while a worker thread is still running, including one that is
    /// finishing its last burst after `stop`.
    pub fn is_worker_active(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Frequency of the current or most recent run.
    pub fn frequency_hz(&self) -> Option<f64> {
        self.frequency_hz
    }

    pub fn config(&self) -> EmitterConfig {
        self.config
    }

    /// Length of each burst in milliseconds. Takes effect on the next `start`.
    pub fn burst_duration_ms(&self) -> f64 {
        self.config.burst_duration_ms
    }

    pub fn set_burst_duration_ms(&mut self, burst_duration_ms: f64) {
        self.config.burst_duration_ms = burst_duration_ms;
    }

    /// Pause between bursts in milliseconds. Takes effect on the next `start`.
    pub fn pause_duration_ms(&self) -> u32 {
        self.config.pause_duration_ms
    }

    pub fn set_pause_duration_ms(&mut self, pause_duration_ms: u32) {
        self.config.pause_duration_ms = pause_duration_ms;
    }

    /// Called on the worker thread right before the first burst.
    pub fn set_on_play<F>(&mut self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_play = Some(Arc::new(listener));
    }

    /// Called on the worker thread once the run has ended, whatever the reason.
    pub fn set_on_stop<F>(&mut self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_stop = Some(Arc::new(listener));
    }

    fn reap(&mut self) -> Result<(), EmitterError> {
        // a playing worker keeps its cancel sender until it exits on its own
        let Some(Worker {
            handle,
            cancel: _cancel,
        }) = self.worker.take()
        else {
            return Ok(());
        };

        match handle.join() {
            Ok(result) => result.map_err(EmitterError::from),
            Err(_) => Err(EmitterError::WorkerPanicked),
        }
    }
}

impl Drop for ContinuousBuzzer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Cancellable sleep between bursts.
struct Pause {
    cancel_rx: Receiver<()>,
}

impl Pause {
    fn sleep(&self, duration: Duration) -> Result<(), CancellationRequested> {
        match self.cancel_rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => Err(CancellationRequested),
        }
    }
}

/// Clears the playing flag and fires `on_stop` when the worker leaves its loop.
struct Finish<'a> {
    is_playing: &'a AtomicBool,
    on_stop: Option<&'a Listener>,
}

impl Drop for Finish<'_> {
    fn drop(&mut self) {
        self.is_playing.store(false, Ordering::Release);
        if thread::panicking() {
            log::error!("Buzzer worker panicked");
        }
        if let Some(on_stop) = self.on_stop {
            on_stop();
        }
    }
}

/// Everything a worker needs, moved onto its thread.
struct Run {
    output: Arc<dyn ToneOutput>,
    frequency_hz: f64,
    config: EmitterConfig,
    is_playing: Arc<AtomicBool>,
    pause: Pause,
    on_play: Option<Listener>,
    on_stop: Option<Listener>,
}

impl Run {
    fn execute(self) -> Result<(), ToneError> {
        if let Some(on_play) = &self.on_play {
            on_play();
        }

        // runs on unwind too, so a panicking tone output still ends the run
        let _finish = Finish {
            is_playing: &self.is_playing,
            on_stop: self.on_stop.as_ref(),
        };

        let result = self.play_loop();
        match &result {
            Ok(()) => log::debug!("Buzzer worker exited"),
            Err(e) => log::error!("Buzzer stopped unexpectedly: {}", e),
        }
        result
    }

    fn play_loop(&self) -> Result<(), ToneError> {
        let pause = Duration::from_millis(u64::from(self.config.pause_duration_ms));

        while self.is_playing.load(Ordering::Acquire) {
            self.output
                .emit(self.frequency_hz, self.config.burst_duration_ms)?;

            if let Err(CancellationRequested) = self.pause.sleep(pause) {
                log::debug!("Buzzer pause cancelled");
                break;
            }
        }
        Ok(())
    }
}
