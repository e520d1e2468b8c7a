//! Speech-to-text service contract.

use crate::error::{Result, VoxbridgeError};
use crate::pipeline::types::WordInfo;
use std::sync::Arc;

/// A raw transcription result from the service.
///
/// The transcriber stage turns this into a [`Transcript`]
/// (crate::pipeline::types::Transcript), adding the sequence number and the
/// caller-measured request latency.
#[derive(Debug, Clone, PartialEq)]
pub struct SttResult {
    pub text: String,
    pub is_final: bool,
    pub confidence: f32,
    pub words: Option<Vec<WordInfo>>,
}

/// Trait for speech-to-text services.
///
/// This trait allows swapping implementations (remote service vs mock).
pub trait SpeechToText: Send + Sync {
    /// Transcribes one utterance's PCM.
    ///
    /// Returns `Ok(None)` when the service reports no speech in the audio.
    fn transcribe(&self, samples: &[i16], sample_rate: u32) -> Result<Option<SttResult>>;

    /// Source language hint (e.g. "es").
    fn language(&self) -> &str;
}

/// Implement SpeechToText for Arc<T> to allow sharing across stages.
impl<T: SpeechToText> SpeechToText for Arc<T> {
    fn transcribe(&self, samples: &[i16], sample_rate: u32) -> Result<Option<SttResult>> {
        (**self).transcribe(samples, sample_rate)
    }

    fn language(&self) -> &str {
        (**self).language()
    }
}

/// Mock speech-to-text service for testing.
#[derive(Debug, Clone)]
pub struct MockSpeechToText {
    language: String,
    response: String,
    confidence: f32,
    words: Option<Vec<WordInfo>>,
    no_speech: bool,
    should_fail: bool,
}

impl MockSpeechToText {
    /// Creates a new mock with default settings.
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
            response: "mock transcription".to_string(),
            confidence: 1.0,
            words: None,
            no_speech: false,
            should_fail: false,
        }
    }

    /// Configures the mock to return a specific transcript text.
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configures the reported confidence.
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Configures word-level timing metadata.
    pub fn with_words(mut self, words: Vec<WordInfo>) -> Self {
        self.words = Some(words);
        self
    }

    /// Configures the mock to report "no speech" (returns None).
    pub fn with_no_speech(mut self) -> Self {
        self.no_speech = true;
        self
    }

    /// Configures the mock to fail on transcribe.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl SpeechToText for MockSpeechToText {
    fn transcribe(&self, _samples: &[i16], _sample_rate: u32) -> Result<Option<SttResult>> {
        if self.should_fail {
            return Err(VoxbridgeError::Transcription {
                message: "mock transcription failure".to_string(),
            });
        }
        if self.no_speech {
            return Ok(None);
        }
        Ok(Some(SttResult {
            text: self.response.clone(),
            is_final: true,
            confidence: self.confidence,
            words: self.words.clone(),
        }))
    }

    fn language(&self) -> &str {
        &self.language
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_returns_response() {
        let stt = MockSpeechToText::new("es").with_response("hola mundo");

        let audio = vec![0i16; 1000];
        let result = stt.transcribe(&audio, 16000).unwrap().unwrap();

        assert_eq!(result.text, "hola mundo");
        assert!(result.is_final);
        assert_eq!(stt.language(), "es");
    }

    #[test]
    fn test_mock_no_speech_returns_none() {
        let stt = MockSpeechToText::new("es").with_no_speech();
        let result = stt.transcribe(&[0i16; 100], 16000).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_mock_failure() {
        let stt = MockSpeechToText::new("es").with_failure();
        let result = stt.transcribe(&[0i16; 100], 16000);
        match result {
            Err(VoxbridgeError::Transcription { message }) => {
                assert_eq!(message, "mock transcription failure");
            }
            _ => panic!("Expected Transcription error"),
        }
    }

    #[test]
    fn test_mock_word_timing() {
        let words = vec![WordInfo {
            word: "hola".to_string(),
            start_ms: 0,
            end_ms: 350,
            confidence: 0.98,
        }];
        let stt = MockSpeechToText::new("es").with_words(words.clone());

        let result = stt.transcribe(&[0i16; 100], 16000).unwrap().unwrap();
        assert_eq!(result.words, Some(words));
    }

    #[test]
    fn test_trait_is_object_safe() {
        let stt: Box<dyn SpeechToText> =
            Box::new(MockSpeechToText::new("es").with_response("boxed"));
        let result = stt.transcribe(&[0i16; 10], 16000).unwrap().unwrap();
        assert_eq!(result.text, "boxed");
    }

    #[test]
    fn test_arc_impl_delegates() {
        let stt = Arc::new(MockSpeechToText::new("es").with_response("shared"));
        let result = stt.transcribe(&[0i16; 10], 16000).unwrap().unwrap();
        assert_eq!(result.text, "shared");
        assert_eq!(stt.language(), "es");
    }
}
