//! Error types and reporting for pipeline stations.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Errors that can occur during station processing.
#[derive(Debug, Clone)]
pub enum StationError {
    /// Recoverable error that allows the station to continue processing.
    Recoverable(String),
    /// Fatal error that requires the station to shut down.
    Fatal(String),
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationError::Recoverable(msg) => write!(f, "Recoverable error: {}", msg),
            StationError::Fatal(msg) => write!(f, "Fatal error: {}", msg),
        }
    }
}

impl std::error::Error for StationError {}

/// Trait for reporting station errors.
pub trait ErrorReporter: Send + Sync {
    /// Reports an error from a station.
    fn report(&self, station: &str, error: &StationError);
}

/// Simple error reporter that logs to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, station: &str, error: &StationError) {
        eprintln!("voxbridge: [{}] {}", station, error);
    }
}

/// Reporter that retains the most recent error per station for health
/// checks, delegating to an inner reporter for logging.
pub struct LastErrorReporter {
    inner: Arc<dyn ErrorReporter>,
    last_errors: Arc<Mutex<HashMap<String, String>>>,
}

impl LastErrorReporter {
    /// Creates a reporter that logs via `inner` and remembers last errors.
    pub fn new(inner: Arc<dyn ErrorReporter>) -> Self {
        Self {
            inner,
            last_errors: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the most recent error reported by the named station, if any.
    pub fn last_error(&self, station: &str) -> Option<String> {
        self.last_errors
            .lock()
            .ok()
            .and_then(|map| map.get(station).cloned())
    }
}

impl ErrorReporter for LastErrorReporter {
    fn report(&self, station: &str, error: &StationError) {
        if let Ok(mut map) = self.last_errors.lock() {
            map.insert(station.to_string(), error.to_string());
        }
        self.inner.report(station, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_station_error_display() {
        let recoverable = StationError::Recoverable("temporary failure".to_string());
        assert_eq!(
            recoverable.to_string(),
            "Recoverable error: temporary failure"
        );

        let fatal = StationError::Fatal("critical failure".to_string());
        assert_eq!(fatal.to_string(), "Fatal error: critical failure");
    }

    #[test]
    fn test_log_reporter() {
        let reporter = LogReporter;
        let error = StationError::Recoverable("test error".to_string());
        // Just ensure it doesn't panic
        reporter.report("TestStation", &error);
    }

    #[test]
    fn test_last_error_reporter_retains_most_recent() {
        let reporter = LastErrorReporter::new(Arc::new(LogReporter));

        assert!(reporter.last_error("segmenter").is_none());

        reporter.report(
            "segmenter",
            &StationError::Recoverable("first".to_string()),
        );
        reporter.report("segmenter", &StationError::Fatal("second".to_string()));

        let last = reporter.last_error("segmenter").unwrap();
        assert!(last.contains("second"));
        assert!(!last.contains("first"));
    }

    #[test]
    fn test_last_error_reporter_tracks_stations_independently() {
        let reporter = LastErrorReporter::new(Arc::new(LogReporter));

        reporter.report("stt", &StationError::Recoverable("timeout".to_string()));

        assert!(reporter.last_error("stt").is_some());
        assert!(reporter.last_error("translator").is_none());
    }
}
