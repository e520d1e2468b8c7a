//! Health and metrics reporting for the pipeline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Point-in-time status of one pipeline stage.
///
/// Recomputed on demand from live state; never persisted.
#[derive(Debug, Clone)]
pub struct StageStatus {
    /// Stage name (e.g. "segmenter").
    pub name: String,
    /// True iff the pipeline is running and the stage's thread is alive.
    pub is_running: bool,
    /// Current depth of the stage's output channel.
    pub queue_depth: usize,
    /// Most recent error reported by the stage, if any.
    pub last_error: Option<String>,
    /// Rolling average of the stage's processing time per item.
    pub avg_processing_time_ms: f64,
}

/// Aggregate pipeline health.
#[derive(Debug, Clone)]
pub struct PipelineHealth {
    /// True iff the pipeline is running and every stage thread is alive.
    pub is_healthy: bool,
    /// Per-stage status keyed by stage name.
    pub stages: HashMap<String, StageStatus>,
    /// Time since the pipeline started.
    pub uptime: Duration,
    /// Number of utterances emitted by the segmenter so far.
    pub utterances_processed: u64,
}

/// Point-in-time channel depths.
///
/// Latency aggregation across stages is a placeholder for future work;
/// the latency fields default to zero.
#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    /// Channel depth per edge, keyed by edge name (e.g. "frames_to_segmenter").
    pub queue_depths: HashMap<String, usize>,
    /// End-to-end latency placeholder.
    pub total_latency_ms: f64,
    /// When this snapshot was taken.
    pub timestamp: Instant,
}

/// Rolling processing-time statistics for one stage.
///
/// Shared between a station runner (writer) and the orchestrator's health
/// check (reader).
#[derive(Debug, Default)]
pub struct ProcessingStats {
    inner: Mutex<StatsInner>,
}

#[derive(Debug, Default)]
struct StatsInner {
    count: u64,
    total: Duration,
}

impl ProcessingStats {
    /// Creates empty stats behind an `Arc` for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Records one processing duration.
    pub fn record(&self, elapsed: Duration) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.count += 1;
            inner.total += elapsed;
        }
    }

    /// Number of items processed so far.
    pub fn count(&self) -> u64 {
        self.inner.lock().map(|inner| inner.count).unwrap_or(0)
    }

    /// Average processing time in milliseconds, 0.0 when nothing was
    /// processed yet.
    pub fn avg_ms(&self) -> f64 {
        self.inner
            .lock()
            .map(|inner| {
                if inner.count == 0 {
                    0.0
                } else {
                    inner.total.as_secs_f64() * 1000.0 / inner.count as f64
                }
            })
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_stats_empty() {
        let stats = ProcessingStats::default();
        assert_eq!(stats.count(), 0);
        assert_eq!(stats.avg_ms(), 0.0);
    }

    #[test]
    fn test_processing_stats_average() {
        let stats = ProcessingStats::default();
        stats.record(Duration::from_millis(10));
        stats.record(Duration::from_millis(30));

        assert_eq!(stats.count(), 2);
        let avg = stats.avg_ms();
        assert!((avg - 20.0).abs() < 0.5, "expected ~20ms, got {avg}");
    }

    #[test]
    fn test_processing_stats_shared_across_threads() {
        let stats = ProcessingStats::shared();
        let writer = stats.clone();

        let handle = std::thread::spawn(move || {
            for _ in 0..5 {
                writer.record(Duration::from_millis(2));
            }
        });
        handle.join().unwrap();

        assert_eq!(stats.count(), 5);
        assert!(stats.avg_ms() > 0.0);
    }

    #[test]
    fn test_stage_status_fields() {
        let status = StageStatus {
            name: "translator".to_string(),
            is_running: true,
            queue_depth: 3,
            last_error: None,
            avg_processing_time_ms: 12.5,
        };
        assert!(status.is_running);
        assert_eq!(status.queue_depth, 3);
        assert!(status.last_error.is_none());
    }

    #[test]
    fn test_pipeline_metrics_defaults_to_zero_latency() {
        let metrics = PipelineMetrics {
            queue_depths: HashMap::new(),
            total_latency_ms: 0.0,
            timestamp: Instant::now(),
        };
        assert_eq!(metrics.total_latency_ms, 0.0);
    }
}
