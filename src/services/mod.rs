//! External service contracts.
//!
//! The pipeline reaches transcription, translation, and synthesis services
//! only through these traits; wire protocols, retries, and model choices
//! live behind the implementations.

pub mod stt;
pub mod translate;
pub mod tts;

#[cfg(feature = "remote-services")]
pub mod remote;

pub use stt::{MockSpeechToText, SpeechToText, SttResult};
pub use translate::{MockTranslator, Translator};
pub use tts::{MockSynthesizer, SynthesisChunk, Synthesizer};
