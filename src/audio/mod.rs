//! Audio capture, classification, and file sources.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod classifier;
#[cfg(feature = "cpal-audio")]
pub mod playback;
pub mod source;
pub mod wav;

pub use classifier::{EnergyClassifier, MockClassifier, SpeechClassifier, calculate_rms};
pub use source::{FramePhase, MockSampleSource, SampleSource};
pub use wav::WavSampleSource;

#[cfg(feature = "cpal-audio")]
pub use capture::{CpalSampleSource, list_devices};
#[cfg(feature = "cpal-audio")]
pub use playback::SpeakerSink;
