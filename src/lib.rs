//! voxbridge - Real-time speech-to-speech translation pipeline
//!
//! Streams microphone audio through segmentation, transcription,
//! translation, and synthesis stages with bounded buffering.

// Error handling discipline: propagate, don't panic
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
pub mod config;
pub mod defaults;
pub mod error;
pub mod pipeline;
pub mod services;

// Core traits (source → stages → sink)
pub use audio::classifier::{EnergyClassifier, SpeechClassifier};
pub use audio::source::SampleSource;
pub use pipeline::sink::{AudioSink, CallbackSink, CollectorSink};
pub use services::stt::SpeechToText;
pub use services::translate::Translator;
pub use services::tts::Synthesizer;

// Pipeline
pub use pipeline::orchestrator::{Pipeline, PipelineComponents, PipelineConfig};
pub use pipeline::segmenter::SegmenterConfig;

// Error handling
pub use error::{Result, VoxbridgeError};

// Config
pub use config::Config;

// Station framework (for advanced users)
pub use pipeline::error::{ErrorReporter, StationError};
pub use pipeline::station::Station;
