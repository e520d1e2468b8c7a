//! Sample source abstraction.

use crate::error::{Result, VoxbridgeError};

/// Trait for audio sample sources.
///
/// This trait allows swapping implementations (real microphone vs mock vs
/// WAV file). The pipeline's capture thread polls `read_samples` and stamps
/// the returned PCM into frames.
pub trait SampleSource: Send + Sync {
    /// Start producing samples.
    fn start(&mut self) -> Result<()>;

    /// Stop producing samples and release the device.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever samples are available right now.
    ///
    /// Returns an empty vector when nothing is buffered; for finite
    /// sources an empty read means the source is exhausted.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// True for finite sources (files, pipes) that eventually run dry.
    fn is_finite(&self) -> bool {
        false
    }
}

/// One scripted phase of mock audio: the same frame repeated `count` times.
#[derive(Debug, Clone)]
pub struct FramePhase {
    pub samples: Vec<i16>,
    pub count: u32,
}

/// Mock sample source for testing.
///
/// Plays through its scripted phases, then returns empty reads. Finite by
/// default; `as_live_source` makes empty reads mean "not ready yet" as a
/// microphone would at startup.
#[derive(Debug, Clone)]
pub struct MockSampleSource {
    phases: Vec<FramePhase>,
    phase_index: usize,
    emitted_in_phase: u32,
    is_started: bool,
    live: bool,
    should_fail_start: bool,
    should_fail_read: bool,
    error_message: String,
}

impl MockSampleSource {
    /// Creates a mock source with no scripted audio.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            phase_index: 0,
            emitted_in_phase: 0,
            is_started: false,
            live: false,
            should_fail_start: false,
            should_fail_read: false,
            error_message: "mock audio error".to_string(),
        }
    }

    /// Scripts the frame sequence to play.
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = phases;
        self
    }

    /// Scripts a single repeated frame.
    pub fn with_samples(self, samples: Vec<i16>) -> Self {
        self.with_frame_sequence(vec![FramePhase {
            samples,
            count: u32::MAX,
        }])
    }

    /// Marks the source as live (infinite); empty reads are normal.
    pub fn as_live_source(mut self) -> Self {
        self.live = true;
        self
    }

    /// Configures the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.should_fail_start = true;
        self
    }

    /// Configures the mock to fail on read.
    pub fn with_read_failure(mut self) -> Self {
        self.should_fail_read = true;
        self
    }

    /// Configures the error message for failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = message.to_string();
        self
    }

    /// Check if the source is started.
    pub fn is_started(&self) -> bool {
        self.is_started
    }
}

impl Default for MockSampleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for MockSampleSource {
    fn start(&mut self) -> Result<()> {
        if self.should_fail_start {
            return Err(VoxbridgeError::AudioCapture {
                message: self.error_message.clone(),
            });
        }
        self.is_started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.is_started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.should_fail_read {
            return Err(VoxbridgeError::AudioCapture {
                message: self.error_message.clone(),
            });
        }

        while let Some(phase) = self.phases.get(self.phase_index) {
            if self.emitted_in_phase < phase.count {
                self.emitted_in_phase += 1;
                return Ok(phase.samples.clone());
            }
            self.phase_index += 1;
            self.emitted_in_phase = 0;
        }

        Ok(Vec::new())
    }

    fn is_finite(&self) -> bool {
        !self.live
    }
}
