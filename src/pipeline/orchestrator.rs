//! Pipeline orchestrator: owns the channel graph and every stage's lifecycle.
//!
//! Capture → Segmenter → Transcriber → Translator → Synthesizer → Sink,
//! one thread per stage, connected by bounded crossbeam channels. Every
//! channel has exactly one producer and one consumer; wiring happens once,
//! before any stage starts.

use crate::audio::classifier::SpeechClassifier;
use crate::audio::source::SampleSource;
use crate::defaults;
use crate::error::{Result, VoxbridgeError};
use crate::pipeline::error::{ErrorReporter, LastErrorReporter, LogReporter};
use crate::pipeline::health::{PipelineHealth, PipelineMetrics, StageStatus};
use crate::pipeline::segmenter::{SegmenterConfig, SegmenterStation};
use crate::pipeline::sink::{AudioSink, SinkStation};
use crate::pipeline::station::StationRunner;
use crate::pipeline::synthesizer::SynthesizerStation;
use crate::pipeline::transcriber::TranscriberStation;
use crate::pipeline::translator::TranslatorStation;
use crate::pipeline::types::{Frame, SynthesizedAudio, Transcript, Translation, Utterance};
use crate::services::stt::SpeechToText;
use crate::services::translate::Translator;
use crate::services::tts::Synthesizer;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Segmenter configuration
    pub segmenter: SegmenterConfig,
    /// Capture sample rate
    pub sample_rate: u32,
    /// Capture channel count
    pub channels: u16,
    /// Suppress output messages
    pub quiet: bool,
    /// Verbosity level (0=quiet, 1=stage diagnostics)
    pub verbosity: u8,
    /// Channel buffer sizes
    pub frame_buffer: usize,
    pub utterance_buffer: usize,
    pub transcript_buffer: usize,
    pub translation_buffer: usize,
    pub synthesis_buffer: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            quiet: false,
            verbosity: 0,
            frame_buffer: defaults::FRAME_BUFFER,
            utterance_buffer: defaults::STAGE_BUFFER,
            transcript_buffer: defaults::STAGE_BUFFER,
            translation_buffer: defaults::STAGE_BUFFER,
            synthesis_buffer: defaults::SYNTHESIS_BUFFER,
        }
    }
}

/// Everything the pipeline consumes; supplied at construction, moved into
/// stage threads on start.
pub struct PipelineComponents {
    pub source: Box<dyn SampleSource>,
    pub classifier: Box<dyn SpeechClassifier>,
    pub stt: Arc<dyn SpeechToText>,
    pub translator: Arc<dyn Translator>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub sink: Box<dyn AudioSink>,
}

/// Handle to the capture thread (the sample-source poller).
struct CaptureHandle {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn join_with_deadline(&mut self, deadline: Instant) -> std::result::Result<(), String> {
        let poll_interval = Duration::from_millis(defaults::POLL_INTERVAL_MS);
        loop {
            let Some(handle) = self.handle.as_ref() else {
                return Ok(());
            };
            if handle.is_finished() {
                return match self.handle.take() {
                    Some(handle) => handle
                        .join()
                        .map_err(|_| "Capture thread panicked".to_string()),
                    None => Ok(()),
                };
            }
            if Instant::now() >= deadline {
                self.handle = None;
                return Err("Capture thread did not stop before the deadline".to_string());
            }
            thread::sleep(poll_interval);
        }
    }
}

/// Live state of a started pipeline.
struct RunningPipeline {
    capture: CaptureHandle,
    segmenter: StationRunner,
    transcriber: StationRunner,
    translator: StationRunner,
    synthesizer: StationRunner,
    sink: StationRunner,
    // Producer-side clones kept for depth reporting only
    frame_tx: Sender<Frame>,
    utterance_depth: Sender<Utterance>,
    transcript_depth: Sender<Transcript>,
    translation_depth: Sender<Translation>,
    synthesis_depth: Sender<SynthesizedAudio>,
    // Terminal channel; the sink produces nothing, kept alive regardless
    _sink_out_rx: Receiver<()>,
    result_rx: Receiver<Option<Vec<i16>>>,
    started_at: Instant,
}

/// The pipeline orchestrator.
///
/// A `Pipeline` instance covers one run: `start` is a no-op while running,
/// `stop` is idempotent, and a fresh run means constructing a fresh
/// pipeline (per-stage sequence numbers restart at zero that way).
pub struct Pipeline {
    config: PipelineConfig,
    error_reporter: Arc<LastErrorReporter>,
    components: Option<PipelineComponents>,
    running: Option<RunningPipeline>,
    utterance_counter: Arc<AtomicU64>,
}

impl Pipeline {
    /// Creates a new pipeline with the default stderr error reporter.
    pub fn new(config: PipelineConfig, components: PipelineComponents) -> Self {
        Self {
            config,
            error_reporter: Arc::new(LastErrorReporter::new(Arc::new(LogReporter))),
            components: Some(components),
            running: None,
            utterance_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sets a custom inner error reporter (errors are still retained for
    /// health checks).
    pub fn with_error_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.error_reporter = Arc::new(LastErrorReporter::new(reporter));
        self
    }

    /// Returns true if the pipeline is currently running.
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Starts the pipeline.
    ///
    /// Idempotent: a second call while running is a no-op. Starting a
    /// pipeline whose single run already finished is a lifecycle error.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Ok(());
        }

        let components = self.components.take().ok_or_else(|| VoxbridgeError::Lifecycle {
            message: "pipeline already ran; construct a new Pipeline".to_string(),
        })?;

        let PipelineComponents {
            mut source,
            classifier,
            stt,
            translator,
            synthesizer,
            sink,
        } = components;

        // Create channels between stages
        let (frame_tx, frame_rx) = bounded(self.config.frame_buffer);
        let (utterance_tx, utterance_rx) = bounded(self.config.utterance_buffer);
        let (transcript_tx, transcript_rx) = bounded(self.config.transcript_buffer);
        let (translation_tx, translation_rx) = bounded(self.config.translation_buffer);
        let (synthesis_tx, synthesis_rx) = bounded(self.config.synthesis_buffer);
        let (result_tx, result_rx) = bounded(1);
        let (sink_out_tx, sink_out_rx) = bounded::<()>(1);

        // Create stations
        let segmenter_station = SegmenterStation::new(self.config.segmenter, classifier)
            .with_utterance_counter(self.utterance_counter.clone());
        let transcriber_station =
            TranscriberStation::new(stt).with_verbose(self.config.verbosity >= 1);
        let translator_station = TranslatorStation::new(translator);
        let synthesizer_station = SynthesizerStation::new(synthesizer);
        let sink_station = SinkStation::new(sink, self.config.quiet, result_tx);

        let reporter: Arc<dyn ErrorReporter> = self.error_reporter.clone();

        // Start audio capture before spawning the poller
        source.start()?;
        let source_is_finite = source.is_finite();

        // Spawn the capture thread: polls the source, stamps frames, and
        // hands them off without ever blocking (full channel drops the
        // frame — the one sanctioned loss point).
        let capture_stop = Arc::new(AtomicBool::new(false));
        let capture_handle = {
            let stop = capture_stop.clone();
            let frame_tx = frame_tx.clone();
            let sample_rate = self.config.sample_rate;
            let channels = self.config.channels;
            let quiet = self.config.quiet;

            thread::spawn(move || {
                let poll_interval = Duration::from_millis(16);
                let epoch = Instant::now();
                let mut sequence: u64 = 0;
                let mut consecutive_errors: u32 = 0;
                const MAX_CONSECUTIVE_ERRORS: u32 = 10;

                while !stop.load(Ordering::SeqCst) {
                    let samples = match source.read_samples() {
                        Ok(samples) => {
                            consecutive_errors = 0;
                            samples
                        }
                        Err(e) => {
                            consecutive_errors += 1;
                            if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                                if !quiet {
                                    eprintln!(
                                        "voxbridge: audio capture failed {consecutive_errors} times in a row: {e}"
                                    );
                                    eprintln!(
                                        "voxbridge: check your microphone connection and try again"
                                    );
                                }
                                break;
                            }
                            thread::sleep(poll_interval);
                            continue;
                        }
                    };

                    if samples.is_empty() {
                        if source_is_finite {
                            // File/pipe source exhausted
                            break;
                        }
                        // Live source: empty read is normal at startup
                        thread::sleep(poll_interval);
                        continue;
                    }

                    let duration_ms =
                        (samples.len() as u64 * 1000 / u64::from(sample_rate)) as u32;
                    let frame = Frame::new(
                        samples,
                        epoch.elapsed().as_millis() as u64,
                        sample_rate,
                        channels,
                        duration_ms,
                        sequence,
                    );
                    sequence += 1;

                    // Full channel: drop the frame rather than block
                    let _ = frame_tx.try_send(frame);

                    thread::sleep(poll_interval);
                }

                if let Err(e) = source.stop() {
                    eprintln!("voxbridge: failed to stop audio capture: {e}");
                }
            })
        };

        // Spawn station runners
        let segmenter =
            StationRunner::spawn(segmenter_station, frame_rx, utterance_tx.clone(), reporter.clone());
        let transcriber = StationRunner::spawn(
            transcriber_station,
            utterance_rx,
            transcript_tx.clone(),
            reporter.clone(),
        );
        let translator_runner = StationRunner::spawn(
            translator_station,
            transcript_rx,
            translation_tx.clone(),
            reporter.clone(),
        );
        let synthesizer_runner = StationRunner::spawn(
            synthesizer_station,
            translation_rx,
            synthesis_tx.clone(),
            reporter.clone(),
        );
        let sink_runner =
            StationRunner::spawn(sink_station, synthesis_rx, sink_out_tx, reporter);

        self.running = Some(RunningPipeline {
            capture: CaptureHandle {
                stop: capture_stop,
                handle: Some(capture_handle),
            },
            segmenter,
            transcriber,
            translator: translator_runner,
            synthesizer: synthesizer_runner,
            sink: sink_runner,
            frame_tx,
            utterance_depth: utterance_tx,
            transcript_depth: transcript_tx,
            translation_depth: translation_tx,
            synthesis_depth: synthesis_tx,
            _sink_out_rx: sink_out_rx,
            result_rx,
            started_at: Instant::now(),
        });

        Ok(())
    }

    /// Stops the pipeline and returns the sink's accumulated result, if any.
    ///
    /// Idempotent: stopping a stopped pipeline is a no-op returning `None`.
    /// Stages stop in strict reverse dependency order — sink first, sample
    /// source last — so an upstream stage never writes into a channel whose
    /// consumer has already been told to exit without a bounded escape.
    pub fn stop(&mut self) -> Option<Vec<i16>> {
        let mut running = self.running.take()?;

        let per_stage_wait = Duration::from_secs(1);

        // Sink first: it finishes in-flight audio, then reports its result.
        running.sink.request_stop();
        if let Err(msg) = running
            .sink
            .join_with_deadline(Instant::now() + Duration::from_secs(5))
        {
            eprintln!("voxbridge: {msg}");
        }

        // Collect the sink result; it is sent during sink shutdown.
        let result = running
            .result_rx
            .recv_timeout(Duration::from_secs(1))
            .ok()
            .flatten();

        // Then upstream, one dependency level at a time.
        for runner in [
            &mut running.synthesizer,
            &mut running.translator,
            &mut running.transcriber,
            &mut running.segmenter,
        ] {
            runner.request_stop();
            if let Err(msg) = runner.join_with_deadline(Instant::now() + per_stage_wait) {
                eprintln!("voxbridge: {msg}");
            }
        }

        // Sample source last.
        running.capture.request_stop();
        if let Err(msg) = running
            .capture
            .join_with_deadline(Instant::now() + per_stage_wait)
        {
            eprintln!("voxbridge: {msg}");
        }

        result
    }

    /// Point-in-time health snapshot.
    ///
    /// A stage is running iff the pipeline is running and the stage's
    /// thread is alive; a dead stage (fatal error, panic) therefore shows
    /// up here for an external supervisor to act on.
    pub fn health_check(&self) -> PipelineHealth {
        let mut stages = HashMap::new();

        let (uptime, is_healthy) = match &self.running {
            Some(running) => {
                let stage_entries: [(&str, bool, usize, f64); 6] = [
                    (
                        "capture",
                        running.capture.is_running(),
                        running.frame_tx.len(),
                        0.0,
                    ),
                    (
                        "segmenter",
                        running.segmenter.is_running(),
                        running.utterance_depth.len(),
                        running.segmenter.stats().avg_ms(),
                    ),
                    (
                        "transcriber",
                        running.transcriber.is_running(),
                        running.transcript_depth.len(),
                        running.transcriber.stats().avg_ms(),
                    ),
                    (
                        "translator",
                        running.translator.is_running(),
                        running.translation_depth.len(),
                        running.translator.stats().avg_ms(),
                    ),
                    (
                        "synthesizer",
                        running.synthesizer.is_running(),
                        running.synthesis_depth.len(),
                        running.synthesizer.stats().avg_ms(),
                    ),
                    ("sink", running.sink.is_running(), 0, running.sink.stats().avg_ms()),
                ];

                let mut all_alive = true;
                for (name, alive, depth, avg_ms) in stage_entries {
                    all_alive &= alive;
                    stages.insert(
                        name.to_string(),
                        StageStatus {
                            name: name.to_string(),
                            is_running: alive,
                            queue_depth: depth,
                            last_error: self.error_reporter.last_error(name),
                            avg_processing_time_ms: avg_ms,
                        },
                    );
                }

                (running.started_at.elapsed(), all_alive)
            }
            None => {
                for name in [
                    "capture",
                    "segmenter",
                    "transcriber",
                    "translator",
                    "synthesizer",
                    "sink",
                ] {
                    stages.insert(
                        name.to_string(),
                        StageStatus {
                            name: name.to_string(),
                            is_running: false,
                            queue_depth: 0,
                            last_error: self.error_reporter.last_error(name),
                            avg_processing_time_ms: 0.0,
                        },
                    );
                }
                (Duration::ZERO, false)
            }
        };

        PipelineHealth {
            is_healthy,
            stages,
            uptime,
            utterances_processed: self.utterance_counter.load(Ordering::Relaxed),
        }
    }

    /// Point-in-time channel depths keyed by edge name.
    ///
    /// Latency aggregation is a placeholder; the latency field stays zero.
    pub fn metrics(&self) -> PipelineMetrics {
        let mut queue_depths = HashMap::new();

        if let Some(running) = &self.running {
            queue_depths.insert("frames_to_segmenter".to_string(), running.frame_tx.len());
            queue_depths.insert(
                "utterances_to_transcriber".to_string(),
                running.utterance_depth.len(),
            );
            queue_depths.insert(
                "transcripts_to_translator".to_string(),
                running.transcript_depth.len(),
            );
            queue_depths.insert(
                "translations_to_synthesizer".to_string(),
                running.translation_depth.len(),
            );
            queue_depths.insert(
                "synthesis_to_sink".to_string(),
                running.synthesis_depth.len(),
            );
        }

        PipelineMetrics {
            queue_depths,
            total_latency_ms: 0.0,
            timestamp: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::classifier::{EnergyClassifier, MockClassifier};
    use crate::audio::source::{FramePhase, MockSampleSource};
    use crate::pipeline::sink::CollectorSink;
    use crate::services::stt::MockSpeechToText;
    use crate::services::translate::MockTranslator;
    use crate::services::tts::MockSynthesizer;

    fn test_segmenter_config() -> SegmenterConfig {
        SegmenterConfig {
            threshold: 0.5,
            min_speech_duration_ms: 50,
            min_silence_duration_ms: 200,
            max_utterance_duration_ms: 15000,
        }
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            segmenter: test_segmenter_config(),
            quiet: true,
            ..Default::default()
        }
    }

    fn mock_components(source: MockSampleSource) -> PipelineComponents {
        PipelineComponents {
            source: Box::new(source),
            classifier: Box::new(EnergyClassifier::new()),
            stt: Arc::new(MockSpeechToText::new("es").with_response("hola")),
            translator: Arc::new(MockTranslator::new("en").with_response("hello")),
            synthesizer: Arc::new(MockSynthesizer::new().with_samples_per_chunk(2400)),
            sink: Box::new(CollectorSink::new()),
        }
    }

    fn loud_phase(count: u32) -> FramePhase {
        FramePhase {
            samples: vec![10000i16; 480],
            count,
        }
    }

    fn quiet_phase(count: u32) -> FramePhase {
        FramePhase {
            samples: vec![0i16; 480],
            count,
        }
    }

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.channels, 1);
        assert_eq!(config.frame_buffer, 500);
        assert_eq!(config.utterance_buffer, 10);
        assert_eq!(config.transcript_buffer, 10);
        assert_eq!(config.translation_buffer, 10);
        assert_eq!(config.synthesis_buffer, 100);
        assert_eq!(config.verbosity, 0);
        assert!(!config.quiet);
    }

    #[test]
    fn test_start_and_immediate_stop() {
        let mut pipeline = Pipeline::new(test_config(), mock_components(MockSampleSource::new()));

        pipeline.start().unwrap();
        assert!(pipeline.is_running());

        let result = pipeline.stop();
        assert!(result.is_none(), "no frames flowed, no audio collected");
        assert!(!pipeline.is_running());

        let health = pipeline.health_check();
        assert!(!health.is_healthy);
        assert!(health.stages.values().all(|s| !s.is_running));
    }

    #[test]
    fn test_stop_twice_is_noop() {
        let mut pipeline = Pipeline::new(test_config(), mock_components(MockSampleSource::new()));
        pipeline.start().unwrap();

        let _ = pipeline.stop();
        let second = pipeline.stop();
        assert!(second.is_none());
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut pipeline = Pipeline::new(test_config(), mock_components(MockSampleSource::new()));
        assert!(pipeline.stop().is_none());
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut pipeline = Pipeline::new(
            test_config(),
            mock_components(MockSampleSource::new().as_live_source()),
        );
        pipeline.start().unwrap();
        pipeline.start().unwrap(); // no-op, not an error
        assert!(pipeline.is_running());
        let _ = pipeline.stop();
    }

    #[test]
    fn test_start_after_run_is_lifecycle_error() {
        let mut pipeline = Pipeline::new(test_config(), mock_components(MockSampleSource::new()));
        pipeline.start().unwrap();
        let _ = pipeline.stop();

        let result = pipeline.start();
        assert!(matches!(result, Err(VoxbridgeError::Lifecycle { .. })));
    }

    #[test]
    fn test_start_propagates_source_failure() {
        let mut pipeline = Pipeline::new(
            test_config(),
            mock_components(MockSampleSource::new().with_start_failure()),
        );

        let result = pipeline.start();
        assert!(matches!(
            result,
            Err(VoxbridgeError::AudioCapture { .. })
        ));
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_health_while_running() {
        let mut pipeline = Pipeline::new(
            test_config(),
            mock_components(MockSampleSource::new().as_live_source()),
        );
        pipeline.start().unwrap();
        thread::sleep(Duration::from_millis(20));

        let health = pipeline.health_check();
        assert!(health.is_healthy);
        assert_eq!(health.stages.len(), 6);
        for name in [
            "capture",
            "segmenter",
            "transcriber",
            "translator",
            "synthesizer",
            "sink",
        ] {
            let stage = health.stages.get(name).expect(name);
            assert!(stage.is_running, "{} should be running", name);
            assert!(stage.last_error.is_none());
        }
        assert!(health.uptime > Duration::ZERO);

        let _ = pipeline.stop();
    }

    #[test]
    fn test_metrics_reports_all_edges() {
        let mut pipeline = Pipeline::new(
            test_config(),
            mock_components(MockSampleSource::new().as_live_source()),
        );
        pipeline.start().unwrap();

        let metrics = pipeline.metrics();
        assert_eq!(metrics.queue_depths.len(), 5);
        assert!(metrics.queue_depths.contains_key("frames_to_segmenter"));
        assert!(metrics.queue_depths.contains_key("synthesis_to_sink"));
        assert_eq!(metrics.total_latency_ms, 0.0);

        let _ = pipeline.stop();

        // Stopped pipeline reports no edges
        assert!(pipeline.metrics().queue_depths.is_empty());
    }

    #[test]
    fn test_full_cycle_collects_synthesized_audio() {
        // Loud speech then trailing silence: one utterance flows through
        // STT → translation → TTS and lands in the collector.
        let source = MockSampleSource::new()
            .with_frame_sequence(vec![loud_phase(15), quiet_phase(15)]);
        let mut pipeline = Pipeline::new(test_config(), mock_components(source));

        pipeline.start().unwrap();
        assert!(pipeline.is_running());

        // 30 reads at ~16ms plus service hops
        thread::sleep(Duration::from_millis(1500));

        let result = pipeline.stop();
        let samples = result.expect("pipeline should produce synthesized audio");
        assert_eq!(samples.len(), 2400, "one mock synthesis chunk expected");

        let health = pipeline.health_check();
        assert_eq!(health.utterances_processed, 1);
    }

    #[test]
    fn test_full_cycle_with_chunked_synthesis() {
        let source = MockSampleSource::new()
            .with_frame_sequence(vec![loud_phase(15), quiet_phase(15)]);
        let mut components = mock_components(source);
        components.synthesizer = Arc::new(
            MockSynthesizer::new()
                .with_chunk_count(3)
                .with_samples_per_chunk(800),
        );
        let mut pipeline = Pipeline::new(test_config(), components);

        pipeline.start().unwrap();
        thread::sleep(Duration::from_millis(1500));

        let result = pipeline.stop();
        let samples = result.expect("chunked synthesis should still be collected");
        assert_eq!(samples.len(), 3 * 800);
    }

    #[test]
    fn test_quiet_audio_produces_nothing() {
        let source = MockSampleSource::new().with_frame_sequence(vec![quiet_phase(15)]);
        let mut pipeline = Pipeline::new(test_config(), mock_components(source));

        pipeline.start().unwrap();
        thread::sleep(Duration::from_millis(500));

        let result = pipeline.stop();
        assert!(result.is_none(), "silence must not reach the sink");

        let health = pipeline.health_check();
        assert_eq!(health.utterances_processed, 0);
    }

    #[test]
    fn test_classifier_failure_kills_segmenter_and_health_reports_it() {
        let source = MockSampleSource::new()
            .with_frame_sequence(vec![loud_phase(5)])
            .as_live_source();
        let mut components = mock_components(source);
        components.classifier = Box::new(MockClassifier::new().with_failure());
        let mut pipeline = Pipeline::new(test_config(), components);

        pipeline.start().unwrap();
        // Let one frame reach the segmenter
        thread::sleep(Duration::from_millis(300));

        let health = pipeline.health_check();
        assert!(!health.is_healthy, "dead segmenter must mark unhealthy");
        let segmenter = health.stages.get("segmenter").unwrap();
        assert!(!segmenter.is_running);
        assert!(
            segmenter
                .last_error
                .as_deref()
                .is_some_and(|e| e.contains("Fatal")),
            "last error should record the fatal classification failure"
        );

        let _ = pipeline.stop();
    }

    #[test]
    fn test_capture_read_errors_exit_after_threshold() {
        let source = MockSampleSource::new().with_read_failure();
        let mut pipeline = Pipeline::new(test_config(), mock_components(source));

        pipeline.start().unwrap();
        // 10 errors at ~16ms per poll
        thread::sleep(Duration::from_millis(400));

        let health = pipeline.health_check();
        let capture = health.stages.get("capture").unwrap();
        assert!(!capture.is_running, "capture should give up after repeated errors");

        let result = pipeline.stop();
        assert!(result.is_none());
    }

    #[test]
    fn test_recoverable_service_failure_keeps_pipeline_alive() {
        let source = MockSampleSource::new()
            .with_frame_sequence(vec![loud_phase(15), quiet_phase(15)])
            .as_live_source();
        let mut components = mock_components(source);
        components.stt = Arc::new(MockSpeechToText::new("es").with_failure());
        let mut pipeline = Pipeline::new(test_config(), components);

        pipeline.start().unwrap();
        thread::sleep(Duration::from_millis(1200));

        let health = pipeline.health_check();
        assert!(health.is_healthy, "recoverable STT errors must not kill stages");
        let transcriber = health.stages.get("transcriber").unwrap();
        assert!(transcriber.is_running);
        assert!(transcriber.last_error.is_some());

        let result = pipeline.stop();
        assert!(result.is_none(), "failed transcriptions produce no audio");
    }

    #[test]
    fn test_uptime_is_zero_when_stopped() {
        let pipeline = Pipeline::new(test_config(), mock_components(MockSampleSource::new()));
        let health = pipeline.health_check();
        assert_eq!(health.uptime, Duration::ZERO);
        assert!(!health.is_healthy);
    }
}
