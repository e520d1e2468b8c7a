//! Synthesizer station that turns translations into speech audio.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::{SynthesizedAudio, Translation};
use crate::services::tts::Synthesizer;
use std::sync::Arc;
use std::time::Instant;

/// Station that synthesizes speech through a text-to-speech service.
///
/// One translation fans out into zero or more audio chunks; the last chunk
/// of a translation carries `is_final = true`.
pub struct SynthesizerStation {
    synthesizer: Arc<dyn Synthesizer>,
    sequence: u64,
}

impl SynthesizerStation {
    /// Creates a new synthesizer station.
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self {
            synthesizer,
            sequence: 0,
        }
    }
}

impl Station for SynthesizerStation {
    type Input = Translation;
    type Output = SynthesizedAudio;

    fn name(&self) -> &'static str {
        "synthesizer"
    }

    fn process(&mut self, translation: Translation) -> Result<Vec<SynthesizedAudio>, StationError> {
        let start = Instant::now();
        let chunks = self
            .synthesizer
            .synthesize(&translation.translated_text)
            .map_err(|e| StationError::Recoverable(format!("{}", e)))?;
        let latency_ms = start.elapsed().as_millis() as u32;

        let sample_rate = self.synthesizer.sample_rate();
        let outputs = chunks
            .into_iter()
            .map(|chunk| {
                let audio = SynthesizedAudio {
                    samples: chunk.samples,
                    sample_rate,
                    channels: 1,
                    is_final: chunk.is_final,
                    processing_latency_ms: latency_ms,
                    sequence: self.sequence,
                };
                self.sequence += 1;
                audio
            })
            .collect();

        Ok(outputs)
    }
}
