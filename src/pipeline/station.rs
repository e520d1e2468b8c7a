//! Core station abstraction and runner for the translation pipeline.

use crate::defaults;
use crate::pipeline::error::{ErrorReporter, StationError};
use crate::pipeline::health::ProcessingStats;
use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// A processing station in the translation pipeline.
///
/// Each station receives input, processes it, and produces zero or more
/// outputs. Stations run in their own threads and are connected by bounded
/// channels; channel wiring happens once, at spawn, and never changes while
/// the station runs.
pub trait Station: Send + 'static {
    /// The input type this station receives.
    type Input: Send + 'static;
    /// The output type this station produces.
    type Output: Send + 'static;

    /// Processes a single input item.
    ///
    /// Returns:
    /// - `Ok(outputs)` - zero or more outputs (empty means filtered)
    /// - `Err(StationError::Recoverable)` - failed, but keep running
    /// - `Err(StationError::Fatal)` - failed, shut the station down
    fn process(&mut self, input: Self::Input) -> Result<Vec<Self::Output>, StationError>;

    /// Returns the name of this station for logging and error reporting.
    fn name(&self) -> &'static str;

    /// Called when the station is shutting down.
    ///
    /// Override this to perform cleanup operations.
    fn shutdown(&mut self) {}
}

/// Runs a station in a dedicated thread.
///
/// The run loop polls the input channel with a bounded timeout rather than
/// blocking indefinitely, so a stop request is observed within one poll
/// interval. An item that has already been dequeued is always processed
/// before the loop exits.
pub struct StationRunner {
    handle: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
    station_name: &'static str,
    stats: Arc<ProcessingStats>,
}

impl StationRunner {
    /// Spawns a station in a dedicated thread.
    pub fn spawn<S: Station>(
        mut station: S,
        input_rx: Receiver<S::Input>,
        output_tx: Sender<S::Output>,
        error_reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let station_name = station.name();
        let stop = Arc::new(AtomicBool::new(false));
        let stats = ProcessingStats::shared();

        let thread_stop = stop.clone();
        let thread_stats = stats.clone();
        let handle = thread::spawn(move || {
            run_station(
                &mut station,
                input_rx,
                output_tx,
                thread_stop,
                error_reporter,
                thread_stats,
            );
        });

        Self {
            handle: Some(handle),
            stop,
            station_name,
            stats,
        }
    }

    /// Signals the run loop to exit after completing any in-flight item.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Returns true while the station thread is alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Returns the name of the station.
    pub fn name(&self) -> &'static str {
        self.station_name
    }

    /// Shared processing-time statistics for this station.
    pub fn stats(&self) -> Arc<ProcessingStats> {
        self.stats.clone()
    }

    /// Waits for the station thread to complete.
    pub fn join(mut self) -> Result<(), String> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| format!("Station '{}' thread panicked", self.station_name)),
            None => Ok(()),
        }
    }

    /// Waits for the station thread to finish until `deadline`.
    ///
    /// On timeout the handle is dropped, detaching the thread; it dies with
    /// the process. Shutdown must never hang on a stuck stage.
    pub fn join_with_deadline(&mut self, deadline: Instant) -> Result<(), String> {
        let poll_interval = Duration::from_millis(defaults::POLL_INTERVAL_MS);

        loop {
            let Some(handle) = self.handle.as_ref() else {
                return Ok(());
            };

            if handle.is_finished() {
                let handle = self.handle.take();
                return match handle {
                    Some(handle) => handle
                        .join()
                        .map_err(|_| format!("Station '{}' thread panicked", self.station_name)),
                    None => Ok(()),
                };
            }

            if Instant::now() >= deadline {
                self.handle = None;
                return Err(format!(
                    "Station '{}' did not stop before the deadline, detaching",
                    self.station_name
                ));
            }

            thread::sleep(poll_interval);
        }
    }
}

/// Main processing loop for a station.
fn run_station<S: Station>(
    station: &mut S,
    input_rx: Receiver<S::Input>,
    output_tx: Sender<S::Output>,
    stop: Arc<AtomicBool>,
    error_reporter: Arc<dyn ErrorReporter>,
    stats: Arc<ProcessingStats>,
) {
    let station_name = station.name();
    let poll_interval = Duration::from_millis(defaults::POLL_INTERVAL_MS);

    'run: while !stop.load(Ordering::SeqCst) {
        let input = match input_rx.recv_timeout(poll_interval) {
            Ok(input) => input,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let started = Instant::now();
        match station.process(input) {
            Ok(outputs) => {
                stats.record(started.elapsed());
                for output in outputs {
                    if !send_until_stopped(&output_tx, output, &stop, poll_interval) {
                        break 'run;
                    }
                }
            }
            Err(StationError::Recoverable(msg)) => {
                stats.record(started.elapsed());
                error_reporter.report(station_name, &StationError::Recoverable(msg));
            }
            Err(StationError::Fatal(msg)) => {
                error_reporter.report(station_name, &StationError::Fatal(msg));
                break;
            }
        }
    }

    // Cleanup on shutdown
    station.shutdown();
}

/// Sends one output, blocking in bounded steps.
///
/// Inter-stage backpressure is blocking by design; the bounded retry only
/// gives up once the stage has been asked to stop, so shutdown cannot
/// deadlock on a full channel whose consumer already exited.
fn send_until_stopped<T>(
    tx: &Sender<T>,
    item: T,
    stop: &AtomicBool,
    poll_interval: Duration,
) -> bool {
    let mut item = item;
    loop {
        match tx.send_timeout(item, poll_interval) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => {
                if stop.load(Ordering::SeqCst) {
                    return false;
                }
                item = returned;
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
