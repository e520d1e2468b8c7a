//! End-to-end pipeline tests: WAV audio through every stage with mock
//! services.

use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use voxbridge::audio::{EnergyClassifier, WavSampleSource};
use voxbridge::pipeline::sink::CollectorSink;
use voxbridge::pipeline::{Pipeline, PipelineComponents, PipelineConfig, SegmenterConfig};
use voxbridge::services::{MockSpeechToText, MockSynthesizer, MockTranslator};

/// Builds an in-memory 16kHz mono WAV: `speech_ms` of loud samples
/// followed by `silence_ms` of silence.
fn make_wav(speech_ms: u32, silence_ms: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buffer, spec).expect("wav writer");
        for _ in 0..(16 * speech_ms) {
            writer.write_sample(10000i16).expect("write sample");
        }
        for _ in 0..(16 * silence_ms) {
            writer.write_sample(0i16).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }
    buffer.into_inner()
}

fn test_pipeline(wav: Vec<u8>) -> Pipeline {
    let source =
        WavSampleSource::from_reader(Box::new(Cursor::new(wav))).expect("parse wav fixture");

    let components = PipelineComponents {
        source: Box::new(source),
        classifier: Box::new(EnergyClassifier::new()),
        stt: Arc::new(MockSpeechToText::new("es").with_response("hola mundo")),
        translator: Arc::new(MockTranslator::new("en").with_response("hello world")),
        synthesizer: Arc::new(MockSynthesizer::new().with_samples_per_chunk(2400)),
        sink: Box::new(CollectorSink::new()),
    };

    let config = PipelineConfig {
        segmenter: SegmenterConfig {
            threshold: 0.5,
            min_speech_duration_ms: 50,
            min_silence_duration_ms: 200,
            max_utterance_duration_ms: 15000,
        },
        quiet: true,
        ..Default::default()
    };

    Pipeline::new(config, components)
}

/// Blocks until the capture stage has drained the finite source.
fn wait_for_capture_exit(pipeline: &Pipeline) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        let capture_running = pipeline
            .health_check()
            .stages
            .get("capture")
            .is_some_and(|stage| stage.is_running);
        if !capture_running {
            return;
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    panic!("capture stage did not drain the WAV source in time");
}

#[test]
fn wav_speech_flows_through_all_stages() {
    let mut pipeline = test_pipeline(make_wav(1000, 700));
    pipeline.start().expect("pipeline start");

    wait_for_capture_exit(&pipeline);
    // Let the in-flight utterance clear transcription, translation, and
    // synthesis before stopping.
    std::thread::sleep(Duration::from_millis(700));

    let collected = pipeline.stop();
    let samples = collected.expect("speech should reach the sink");
    assert_eq!(samples.len(), 2400, "one mock synthesis chunk expected");

    let health = pipeline.health_check();
    assert_eq!(health.utterances_processed, 1);
    assert!(!health.is_healthy, "stopped pipeline reports unhealthy");
}

#[test]
fn wav_silence_produces_no_output() {
    let mut pipeline = test_pipeline(make_wav(0, 1000));
    pipeline.start().expect("pipeline start");

    wait_for_capture_exit(&pipeline);
    std::thread::sleep(Duration::from_millis(300));

    let collected = pipeline.stop();
    assert!(collected.is_none(), "silence must not produce audio");
    assert_eq!(pipeline.health_check().utterances_processed, 0);
}

#[test]
fn stop_before_audio_flows_is_clean() {
    let mut pipeline = test_pipeline(make_wav(1000, 700));
    pipeline.start().expect("pipeline start");

    // Immediate stop: no panic, everything terminates
    let _ = pipeline.stop();

    let health = pipeline.health_check();
    assert!(!health.is_healthy);
    assert!(health.stages.values().all(|stage| !stage.is_running));
}
