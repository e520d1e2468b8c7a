//! Data types flowing through the translation pipeline.
//!
//! Every message is an immutable value record with a per-stage sequence
//! number; ownership transfers at each channel boundary.

/// A fixed-duration slice of raw PCM audio with timing metadata.
///
/// Produced by the sample source at capture cadence, consumed exactly once
/// by the segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Capture timestamp in monotonic milliseconds since pipeline start.
    pub timestamp_ms: u64,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of audio channels (1 = mono).
    pub channels: u16,
    /// Nominal frame duration in milliseconds.
    pub duration_ms: u32,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl Frame {
    /// Creates a new audio frame.
    pub fn new(
        samples: Vec<i16>,
        timestamp_ms: u64,
        sample_rate: u32,
        channels: u16,
        duration_ms: u32,
        sequence: u64,
    ) -> Self {
        Self {
            samples,
            timestamp_ms,
            sample_rate,
            channels,
            duration_ms,
            sequence,
        }
    }

    /// End timestamp of this frame (start + nominal duration).
    pub fn end_timestamp_ms(&self) -> u64 {
        self.timestamp_ms + u64::from(self.duration_ms)
    }
}

/// A contiguous speech segment assembled from one or more frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Concatenated PCM of all speech frames (plus trailing silence padding
    /// for final utterances).
    pub samples: Vec<i16>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of audio channels.
    pub channels: u16,
    /// Timestamp of the first speech frame.
    pub start_timestamp_ms: u64,
    /// End of the last speech frame, extended by the trailing padding for
    /// final utterances.
    pub end_timestamp_ms: u64,
    /// Total duration in milliseconds; always `end - start`.
    pub duration_ms: u32,
    /// Mean speech probability over the utterance's speech frames.
    pub confidence: f32,
    /// True when emitted because the duration cap was hit rather than
    /// natural trailing silence.
    pub is_partial: bool,
    /// Sequence number assigned by the segmenter.
    pub sequence: u64,
}

/// Word-level timing and confidence metadata from STT services that
/// support it.
#[derive(Debug, Clone, PartialEq)]
pub struct WordInfo {
    pub word: String,
    pub start_ms: u64,
    pub end_ms: u64,
    pub confidence: f32,
}

/// A speech-to-text result for one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    /// The transcribed text.
    pub text: String,
    /// Whether the service considers this result final.
    pub is_final: bool,
    /// Service-reported confidence (0.0 to 1.0).
    pub confidence: f32,
    /// Source language code (e.g. "es").
    pub language: String,
    /// Request round-trip latency measured by the transcriber stage.
    pub processing_latency_ms: u32,
    /// Optional word-level timing.
    pub words: Option<Vec<WordInfo>>,
    /// Sequence number assigned by the transcriber stage.
    pub sequence: u64,
}

/// A translation of one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// The source text as transcribed.
    pub original_text: String,
    /// The translated text.
    pub translated_text: String,
    /// Request round-trip latency measured by the translator stage.
    pub processing_latency_ms: u32,
    /// Sequence number assigned by the translator stage.
    pub sequence: u64,
}

/// One chunk of synthesized speech.
///
/// A single translation may produce several chunks; the last one carries
/// `is_final = true`.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of audio channels.
    pub channels: u16,
    /// True for the last chunk of a translation.
    pub is_final: bool,
    /// Request round-trip latency measured by the synthesizer stage.
    pub processing_latency_ms: u32,
    /// Sequence number assigned by the synthesizer stage.
    pub sequence: u64,
}
