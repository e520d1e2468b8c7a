//! Audio delivery for the end of the pipeline.
//!
//! The delivery mechanism (local speaker, callback into an embedding
//! application, test collector) is chosen at pipeline construction time by
//! picking an [`AudioSink`] implementation.

use crate::pipeline::error::StationError;
use crate::pipeline::station::Station;
use crate::pipeline::types::SynthesizedAudio;

/// Pluggable audio output handler.
///
/// Pairs with `SampleSource` on the input side — this handles synthesized
/// audio leaving the pipeline. `play` must not block longer than the
/// configured output buffering tolerates.
pub trait AudioSink: Send + 'static {
    /// Handle one synthesized audio chunk.
    fn play(&mut self, audio: &SynthesizedAudio) -> crate::error::Result<()>;

    /// Called on pipeline shutdown. Return accumulated PCM if applicable.
    fn finish(&mut self) -> Option<Vec<i16>> {
        None
    }

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Sink that accumulates all PCM in memory.
///
/// Used in tests and for capture-to-buffer runs; the accumulated audio is
/// returned from `finish()`.
#[derive(Debug, Default)]
pub struct CollectorSink {
    samples: Vec<i16>,
    chunks_played: usize,
}

impl CollectorSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of chunks received so far.
    pub fn chunks_played(&self) -> usize {
        self.chunks_played
    }
}

impl AudioSink for CollectorSink {
    fn play(&mut self, audio: &SynthesizedAudio) -> crate::error::Result<()> {
        self.samples.extend_from_slice(&audio.samples);
        self.chunks_played += 1;
        Ok(())
    }

    fn finish(&mut self) -> Option<Vec<i16>> {
        if self.samples.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.samples))
        }
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

/// Sink that invokes a caller-supplied closure per chunk.
///
/// The closure may hand the PCM to a playback engine, a socket, or an
/// embedding application.
pub struct CallbackSink {
    callback: Box<dyn FnMut(&SynthesizedAudio) -> crate::error::Result<()> + Send + 'static>,
}

impl CallbackSink {
    /// Creates a sink around the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnMut(&SynthesizedAudio) -> crate::error::Result<()> + Send + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl AudioSink for CallbackSink {
    fn play(&mut self, audio: &SynthesizedAudio) -> crate::error::Result<()> {
        (self.callback)(audio)
    }

    fn name(&self) -> &'static str {
        "callback"
    }
}

/// Station wrapper for any AudioSink implementation.
///
/// Terminal station: consumes synthesized audio, produces nothing. The
/// sink's `finish()` result is delivered over a dedicated channel on
/// shutdown.
pub struct SinkStation {
    sink: Box<dyn AudioSink>,
    quiet: bool,
    result_tx: Option<crossbeam_channel::Sender<Option<Vec<i16>>>>,
}

impl SinkStation {
    /// Creates a sink station delivering the finish() result over `result_tx`.
    pub fn new(
        sink: Box<dyn AudioSink>,
        quiet: bool,
        result_tx: crossbeam_channel::Sender<Option<Vec<i16>>>,
    ) -> Self {
        Self {
            sink,
            quiet,
            result_tx: Some(result_tx),
        }
    }
}

impl Station for SinkStation {
    type Input = SynthesizedAudio;
    type Output = ();

    fn name(&self) -> &'static str {
        "sink"
    }

    fn process(&mut self, audio: SynthesizedAudio) -> Result<Vec<()>, StationError> {
        // Empty non-final chunks carry nothing worth delivering
        if audio.samples.is_empty() && !audio.is_final {
            return Ok(vec![]);
        }

        match self.sink.play(&audio) {
            Ok(()) => Ok(vec![]),
            Err(e) => {
                if !self.quiet {
                    eprintln!("voxbridge: [{}] playback failed: {}", self.sink.name(), e);
                }
                Err(StationError::Recoverable(e.to_string()))
            }
        }
    }

    fn shutdown(&mut self) {
        let result = self.sink.finish();
        if let Some(tx) = self.result_tx.take()
            && tx.send(result).is_err()
        {
            eprintln!("voxbridge: sink shutdown — result receiver already dropped");
        }
    }
}
