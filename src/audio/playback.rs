//! Local speaker playback using CPAL.

use crate::error::{Result, VoxbridgeError};
use crate::pipeline::sink::AudioSink;
use crate::pipeline::types::SynthesizedAudio;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is created and dropped on the sink's owning thread;
/// the playback callback itself only touches the shared queue.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Audio sink that plays synthesized speech on the local output device.
///
/// `play` appends PCM to a shared queue that the output callback drains;
/// it never blocks. If the queue exceeds its cap (a stalled device), the
/// oldest audio is discarded.
pub struct SpeakerSink {
    queue: Arc<Mutex<VecDeque<i16>>>,
    stream: Option<SendableStream>,
    sample_rate: u32,
    max_queued_samples: usize,
    overflow_warned: bool,
}

impl SpeakerSink {
    /// Creates a speaker sink on the default output device.
    ///
    /// `sample_rate` must match the synthesizer's output rate.
    pub fn new(sample_rate: u32) -> Result<Self> {
        let mut sink = Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            stream: None,
            sample_rate,
            // Two seconds of buffered audio before overflow trimming
            max_queued_samples: sample_rate as usize * 2,
            overflow_warned: false,
        };
        sink.open_stream()?;
        Ok(sink)
    }

    fn open_stream(&mut self) -> Result<()> {
        let host = cpal::default_host();
        let device =
            host.default_output_device()
                .ok_or_else(|| VoxbridgeError::AudioDeviceNotFound {
                    device: "default output".to_string(),
                })?;

        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let queue = self.queue.clone();
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let mut queue = match queue.lock() {
                        Ok(queue) => queue,
                        Err(_) => {
                            data.fill(0);
                            return;
                        }
                    };
                    for slot in data.iter_mut() {
                        *slot = queue.pop_front().unwrap_or(0);
                    }
                },
                |err| {
                    eprintln!("voxbridge: audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| VoxbridgeError::AudioPlayback {
                message: format!("Failed to build output stream: {}", e),
            })?;

        stream.play().map_err(|e| VoxbridgeError::AudioPlayback {
            message: format!("Failed to start output stream: {}", e),
        })?;

        self.stream = Some(SendableStream(stream));
        Ok(())
    }
}

impl AudioSink for SpeakerSink {
    fn play(&mut self, audio: &SynthesizedAudio) -> Result<()> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|_| VoxbridgeError::AudioPlayback {
                message: "playback queue poisoned".to_string(),
            })?;

        queue.extend(audio.samples.iter().copied());

        // A stalled device must not grow the queue unbounded
        if queue.len() > self.max_queued_samples {
            let excess = queue.len() - self.max_queued_samples;
            queue.drain(..excess);
            if !self.overflow_warned {
                eprintln!("voxbridge: speaker queue overflow, discarding oldest audio");
                self.overflow_warned = true;
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "speaker"
    }
}

impl Drop for SpeakerSink {
    fn drop(&mut self) {
        self.stream = None;
    }
}
