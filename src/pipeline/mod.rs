//! Staged translation pipeline.
//!
//! Implements a multi-station pipeline where each station runs in its own
//! thread, connected by bounded crossbeam channels for backpressure.

pub mod error;
pub mod health;
pub mod orchestrator;
pub mod segmenter;
pub mod sink;
pub mod station;
pub mod synthesizer;
pub mod transcriber;
pub mod translator;
pub mod types;

pub use error::{ErrorReporter, LastErrorReporter, LogReporter, StationError};
pub use health::{PipelineHealth, PipelineMetrics, ProcessingStats, StageStatus};
pub use orchestrator::{Pipeline, PipelineComponents, PipelineConfig};
pub use segmenter::{SegmenterConfig, SegmenterStation};
pub use sink::{AudioSink, CallbackSink, CollectorSink, SinkStation};
pub use station::{Station, StationRunner};
pub use synthesizer::SynthesizerStation;
pub use transcriber::TranscriberStation;
pub use translator::TranslatorStation;
pub use types::{Frame, SynthesizedAudio, Transcript, Translation, Utterance, WordInfo};
