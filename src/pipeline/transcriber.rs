//! Transcriber station that converts utterances to text via the STT service.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{Transcript, Utterance};
use crate::services::stt::SpeechToText;
use std::sync::Arc;
use std::time::Instant;

/// Station that transcribes utterances through a speech-to-text service.
///
/// Latency is measured here, from request start to response receipt, and
/// sequence numbers are assigned per emitted transcript.
pub struct TranscriberStation {
    stt: Arc<dyn SpeechToText>,
    sequence: u64,
    verbose: bool,
}

impl TranscriberStation {
    /// Creates a new transcriber station.
    pub fn new(stt: Arc<dyn SpeechToText>) -> Self {
        Self {
            stt,
            sequence: 0,
            verbose: false,
        }
    }

    /// Configure whether to enable diagnostic output to stderr.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl Station for TranscriberStation {
    type Input = Utterance;
    type Output = Transcript;

    fn name(&self) -> &'static str {
        "transcriber"
    }

    fn process(&mut self, utterance: Utterance) -> Result<Vec<Transcript>, StationError> {
        if self.verbose {
            eprintln!(
                "voxbridge: [transcriber] {}ms of audio (partial: {})",
                utterance.duration_ms, utterance.is_partial
            );
        }

        let start = Instant::now();
        let result = self
            .stt
            .transcribe(&utterance.samples, utterance.sample_rate)
            .map_err(|e| StationError::Recoverable(format!("{}", e)))?;
        let latency_ms = start.elapsed().as_millis() as u32;

        // The service may report no speech in the audio; emit nothing.
        let Some(stt_result) = result else {
            return Ok(vec![]);
        };

        let transcript = Transcript {
            text: stt_result.text,
            is_final: stt_result.is_final,
            confidence: stt_result.confidence,
            language: self.stt.language().to_string(),
            processing_latency_ms: latency_ms,
            words: stt_result.words,
            sequence: self.sequence,
        };
        self.sequence += 1;

        Ok(vec![transcript])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stt::MockSpeechToText;

    fn make_utterance(duration_ms: u32) -> Utterance {
        let samples = vec![1000i16; (16 * duration_ms) as usize];
        Utterance {
            samples,
            sample_rate: 16000,
            channels: 1,
            start_timestamp_ms: 0,
            end_timestamp_ms: u64::from(duration_ms),
            duration_ms,
            confidence: 0.9,
            is_partial: false,
            sequence: 0,
        }
    }

    #[test]
    fn test_transcriber_emits_transcript() {
        let stt = Arc::new(MockSpeechToText::new("es").with_response("hola"));
        let mut station = TranscriberStation::new(stt);

        let outputs = station.process(make_utterance(500)).unwrap();
        assert_eq!(outputs.len(), 1);

        let transcript = &outputs[0];
        assert_eq!(transcript.text, "hola");
        assert_eq!(transcript.language, "es");
        assert_eq!(transcript.sequence, 0);
        assert!(transcript.is_final);
    }

    #[test]
    fn test_transcriber_sequence_increments() {
        let stt = Arc::new(MockSpeechToText::new("es"));
        let mut station = TranscriberStation::new(stt);

        for expected in 0..3 {
            let outputs = station.process(make_utterance(500)).unwrap();
            assert_eq!(outputs[0].sequence, expected);
        }
    }

    #[test]
    fn test_transcriber_no_speech_emits_nothing() {
        let stt = Arc::new(MockSpeechToText::new("es").with_no_speech());
        let mut station = TranscriberStation::new(stt);

        let outputs = station.process(make_utterance(500)).unwrap();
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_transcriber_no_speech_does_not_consume_sequence() {
        let stt_silent = Arc::new(MockSpeechToText::new("es").with_no_speech());
        let mut station = TranscriberStation::new(stt_silent);
        assert!(station.process(make_utterance(500)).unwrap().is_empty());

        // Swap in a speaking service by rebuilding the station state
        let stt = Arc::new(MockSpeechToText::new("es"));
        station.stt = stt;
        let outputs = station.process(make_utterance(500)).unwrap();
        assert_eq!(outputs[0].sequence, 0, "dropped results consume no sequence");
    }

    #[test]
    fn test_transcriber_failure_is_recoverable() {
        let stt = Arc::new(MockSpeechToText::new("es").with_failure());
        let mut station = TranscriberStation::new(stt);

        let result = station.process(make_utterance(500));
        match result {
            Err(StationError::Recoverable(msg)) => {
                assert!(msg.contains("Transcription failed"));
            }
            other => panic!("expected recoverable error, got {:?}", other),
        }
    }
}
