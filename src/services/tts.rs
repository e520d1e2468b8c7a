//! Text-to-speech service contract.

use crate::defaults;
use crate::error::{Result, VoxbridgeError};
use std::sync::Arc;

/// One chunk of synthesized PCM from the service.
///
/// A synthesis request may stream several chunks; the last carries
/// `is_final = true`.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisChunk {
    pub samples: Vec<i16>,
    pub is_final: bool,
}

/// Trait for text-to-speech services.
pub trait Synthesizer: Send + Sync {
    /// Synthesizes speech for the given text.
    ///
    /// Returns the chunks in playback order; the last chunk must have
    /// `is_final = true` when any chunks are returned at all.
    fn synthesize(&self, text: &str) -> Result<Vec<SynthesisChunk>>;

    /// Output sample rate in Hz.
    fn sample_rate(&self) -> u32;
}

/// Implement Synthesizer for Arc<T> to allow sharing across stages.
impl<T: Synthesizer> Synthesizer for Arc<T> {
    fn synthesize(&self, text: &str) -> Result<Vec<SynthesisChunk>> {
        (**self).synthesize(text)
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }
}

/// Mock synthesizer for testing.
///
/// Produces a configurable number of chunks whose combined length scales
/// with the input text, so tests can assert fan-out and ordering.
#[derive(Debug, Clone)]
pub struct MockSynthesizer {
    sample_rate: u32,
    chunk_count: usize,
    samples_per_chunk: usize,
    should_fail: bool,
}

impl MockSynthesizer {
    /// Creates a new mock synthesizer emitting a single final chunk.
    pub fn new() -> Self {
        Self {
            sample_rate: defaults::TTS_SAMPLE_RATE,
            chunk_count: 1,
            samples_per_chunk: 2400,
            should_fail: false,
        }
    }

    /// Configures how many chunks each synthesis produces.
    pub fn with_chunk_count(mut self, chunk_count: usize) -> Self {
        self.chunk_count = chunk_count.max(1);
        self
    }

    /// Configures the chunk size in samples.
    pub fn with_samples_per_chunk(mut self, samples_per_chunk: usize) -> Self {
        self.samples_per_chunk = samples_per_chunk;
        self
    }

    /// Configures the output sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Configures the mock to fail on synthesize.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Default for MockSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<SynthesisChunk>> {
        if self.should_fail {
            return Err(VoxbridgeError::Synthesis {
                message: "mock synthesis failure".to_string(),
            });
        }

        // Deterministic pseudo-audio derived from the text
        let fill = text.len() as i16;
        let chunks = (0..self.chunk_count)
            .map(|i| SynthesisChunk {
                samples: vec![fill; self.samples_per_chunk],
                is_final: i + 1 == self.chunk_count,
            })
            .collect();
        Ok(chunks)
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_single_final_chunk() {
        let synthesizer = MockSynthesizer::new();
        let chunks = synthesizer.synthesize("hello").unwrap();

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_final);
        assert_eq!(chunks[0].samples.len(), 2400);
    }

    #[test]
    fn test_mock_multiple_chunks_only_last_final() {
        let synthesizer = MockSynthesizer::new().with_chunk_count(3);
        let chunks = synthesizer.synthesize("hello").unwrap();

        assert_eq!(chunks.len(), 3);
        assert!(!chunks[0].is_final);
        assert!(!chunks[1].is_final);
        assert!(chunks[2].is_final);
    }

    #[test]
    fn test_mock_chunk_count_is_at_least_one() {
        let synthesizer = MockSynthesizer::new().with_chunk_count(0);
        let chunks = synthesizer.synthesize("hello").unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_final);
    }

    #[test]
    fn test_mock_failure() {
        let synthesizer = MockSynthesizer::new().with_failure();
        let result = synthesizer.synthesize("hello");
        match result {
            Err(VoxbridgeError::Synthesis { message }) => {
                assert_eq!(message, "mock synthesis failure");
            }
            _ => panic!("Expected Synthesis error"),
        }
    }

    #[test]
    fn test_mock_sample_rate() {
        let synthesizer = MockSynthesizer::new().with_sample_rate(48000);
        assert_eq!(synthesizer.sample_rate(), 48000);
    }

    #[test]
    fn test_trait_is_object_safe() {
        let synthesizer: Box<dyn Synthesizer> = Box::new(MockSynthesizer::new());
        let chunks = synthesizer.synthesize("x").unwrap();
        assert!(chunks.last().is_some_and(|chunk| chunk.is_final));
    }
}
