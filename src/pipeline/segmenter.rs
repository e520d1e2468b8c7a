//! Segmenter station: groups classified frames into utterances.
//!
//! Each incoming frame is scored by the speech classifier; contiguous
//! speech accumulates until enough trailing silence ends the utterance
//! naturally, or the duration cap forces a partial split.

use crate::audio::classifier::SpeechClassifier;
use crate::defaults;
use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{Frame, Utterance};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Configuration for the segmenter.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Speech probability threshold (0.0 to 1.0); a score at or above it
    /// classifies the frame as speech.
    pub threshold: f32,
    /// Minimum buffered speech span before an utterance may be emitted (ms).
    pub min_speech_duration_ms: u32,
    /// Trailing silence required to end an utterance (ms).
    pub min_silence_duration_ms: u32,
    /// Maximum utterance duration before force-split (ms).
    pub max_utterance_duration_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::SPEECH_THRESHOLD,
            min_speech_duration_ms: defaults::MIN_SPEECH_DURATION_MS,
            min_silence_duration_ms: defaults::MIN_SILENCE_DURATION_MS,
            max_utterance_duration_ms: defaults::MAX_UTTERANCE_DURATION_MS,
        }
    }
}

/// Voice-activity segmenter station (Frame → Utterance).
pub struct SegmenterStation {
    config: SegmenterConfig,
    classifier: Box<dyn SpeechClassifier>,
    speech_buffer: Vec<Frame>,
    confidence_samples: Vec<f32>,
    speech_start_ms: u64,
    accumulated_silence_ms: u32,
    sequence: u64,
    utterance_counter: Option<Arc<AtomicU64>>,
}

impl SegmenterStation {
    /// Creates a segmenter with the given configuration and classifier.
    pub fn new(config: SegmenterConfig, classifier: Box<dyn SpeechClassifier>) -> Self {
        Self {
            config,
            classifier,
            speech_buffer: Vec::new(),
            confidence_samples: Vec::new(),
            speech_start_ms: 0,
            accumulated_silence_ms: 0,
            sequence: 0,
            utterance_counter: None,
        }
    }

    /// Shares a counter incremented once per emitted utterance.
    pub fn with_utterance_counter(mut self, counter: Arc<AtomicU64>) -> Self {
        self.utterance_counter = Some(counter);
        self
    }

    /// Number of frames currently buffered (test hook).
    #[cfg(test)]
    fn buffered_frames(&self) -> usize {
        self.speech_buffer.len()
    }

    /// Scores one frame, padding short input with trailing zero samples to
    /// the classifier's minimum window. Padding affects only the score
    /// call; emitted audio is built from the frame's original samples.
    fn classify(&mut self, frame: &Frame) -> Result<f32, StationError> {
        let min_window = self.classifier.min_window(frame.sample_rate);
        let result = if frame.samples.len() < min_window {
            let mut padded = frame.samples.clone();
            padded.resize(min_window, 0);
            self.classifier.score(&padded, frame.sample_rate)
        } else {
            self.classifier.score(&frame.samples, frame.sample_rate)
        };

        // A classification failure corrupts segmentation state; treat it as
        // fatal to the run rather than skipping the frame.
        result.map_err(|e| StationError::Fatal(e.to_string()))
    }

    /// Builds an utterance from the buffered speech frames, then clears
    /// the accumulation state.
    fn emit(&mut self, is_partial: bool) -> Utterance {
        let first = &self.speech_buffer[0];
        let last = &self.speech_buffer[self.speech_buffer.len() - 1];

        let sample_rate = first.sample_rate;
        let channels = first.channels;
        let start_timestamp_ms = first.timestamp_ms;
        let mut end_timestamp_ms = last.end_timestamp_ms();

        let mut samples: Vec<i16> = Vec::with_capacity(
            self.speech_buffer.iter().map(|f| f.samples.len()).sum(),
        );
        for frame in &self.speech_buffer {
            samples.extend_from_slice(&frame.samples);
        }

        // Final utterances get trailing silence to help downstream
        // finalization; partial (force-split) utterances do not.
        if !is_partial {
            let silence_ms = u64::from(self.config.min_silence_duration_ms);
            let silence_samples =
                (u64::from(sample_rate) * silence_ms / 1000) as usize * usize::from(channels);
            samples.extend(std::iter::repeat_n(0i16, silence_samples));
            end_timestamp_ms += silence_ms;
        }

        let confidence = if self.confidence_samples.is_empty() {
            0.0
        } else {
            self.confidence_samples.iter().sum::<f32>() / self.confidence_samples.len() as f32
        };

        let utterance = Utterance {
            samples,
            sample_rate,
            channels,
            start_timestamp_ms,
            end_timestamp_ms,
            duration_ms: (end_timestamp_ms - start_timestamp_ms) as u32,
            confidence,
            is_partial,
            sequence: self.sequence,
        };

        self.sequence += 1;
        if let Some(counter) = &self.utterance_counter {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        self.reset_buffer();

        utterance
    }

    fn reset_buffer(&mut self) {
        self.speech_buffer.clear();
        self.confidence_samples.clear();
        self.accumulated_silence_ms = 0;
    }

    /// The buffered speech span: last frame end minus first frame start.
    fn buffered_speech_span_ms(&self) -> u64 {
        match (self.speech_buffer.first(), self.speech_buffer.last()) {
            (Some(first), Some(last)) => last.end_timestamp_ms() - first.timestamp_ms,
            _ => 0,
        }
    }
}

impl Station for SegmenterStation {
    type Input = Frame;
    type Output = Utterance;

    fn name(&self) -> &'static str {
        "segmenter"
    }

    fn process(&mut self, frame: Frame) -> Result<Vec<Utterance>, StationError> {
        // Skip empty frames
        if frame.samples.is_empty() {
            return Ok(vec![]);
        }

        let probability = self.classify(&frame)?;
        let is_speech = probability >= self.config.threshold;

        if is_speech {
            if self.speech_buffer.is_empty() {
                self.speech_start_ms = frame.timestamp_ms;
            }
            self.accumulated_silence_ms = 0;
            self.confidence_samples.push(probability);

            let frame_timestamp_ms = frame.timestamp_ms;
            self.speech_buffer.push(frame);

            // Force-split at the duration cap; no frame beyond the cap is
            // appended to the same utterance.
            if frame_timestamp_ms - self.speech_start_ms
                >= u64::from(self.config.max_utterance_duration_ms)
            {
                return Ok(vec![self.emit(true)]);
            }

            return Ok(vec![]);
        }

        // Non-speech with nothing buffered: drop the frame.
        if self.speech_buffer.is_empty() {
            return Ok(vec![]);
        }

        // Silence frames are bookkeeping only; they never reach the
        // utterance audio.
        self.accumulated_silence_ms += frame.duration_ms;

        if self.accumulated_silence_ms >= self.config.min_silence_duration_ms
            && self.buffered_speech_span_ms() >= u64::from(self.config.min_speech_duration_ms)
        {
            return Ok(vec![self.emit(false)]);
        }

        Ok(vec![])
    }
}
