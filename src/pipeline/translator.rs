//! Translator station that converts transcripts to target-language text.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{Transcript, Translation};
use crate::services::translate::Translator;
use std::sync::Arc;
use std::time::Instant;

/// Station that translates transcripts through a translation service.
///
/// Empty or whitespace-only transcripts short-circuit: no service call, no
/// output.
pub struct TranslatorStation {
    translator: Arc<dyn Translator>,
    sequence: u64,
}

impl TranslatorStation {
    /// Creates a new translator station.
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            translator,
            sequence: 0,
        }
    }
}

impl Station for TranslatorStation {
    type Input = Transcript;
    type Output = Translation;

    fn name(&self) -> &'static str {
        "translator"
    }

    fn process(&mut self, transcript: Transcript) -> Result<Vec<Translation>, StationError> {
        if transcript.text.trim().is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let translated_text = self
            .translator
            .translate(&transcript.text)
            .map_err(|e| StationError::Recoverable(format!("{}", e)))?;
        let latency_ms = start.elapsed().as_millis() as u32;

        let translation = Translation {
            original_text: transcript.text,
            translated_text,
            processing_latency_ms: latency_ms,
            sequence: self.sequence,
        };
        self.sequence += 1;

        Ok(vec![translation])
    }
}
