//! Real audio capture using CPAL (Cross-Platform Audio Library).
//!
//! The hardware callback runs on a platform audio thread and must never
//! block: it hands PCM to the pipeline through a bounded channel with
//! `try_send`, dropping the block when the channel is full. This is the
//! one place in the pipeline where audio loss is sanctioned.

use crate::audio::source::SampleSource;
use crate::defaults;
use crate::error::{Result, VoxbridgeError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Mutex;

/// Run a closure with stderr temporarily redirected to /dev/null.
///
/// This suppresses noisy ALSA/JACK/PipeWire messages that CPAL triggers
/// when probing audio backends. The messages are harmless but confusing to users.
///
/// # Safety
/// Uses `libc::dup`/`libc::dup2` to save and restore file descriptor 2 (stderr).
/// Safe as long as no other thread is concurrently manipulating fd 2.
fn with_suppressed_stderr<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    unsafe {
        let saved_fd = libc::dup(2);
        let devnull = libc::open(c"/dev/null".as_ptr(), libc::O_WRONLY);
        if saved_fd >= 0 && devnull >= 0 {
            libc::dup2(devnull, 2);
            libc::close(devnull);
        }

        let result = f();

        if saved_fd >= 0 {
            libc::dup2(saved_fd, 2);
            libc::close(saved_fd);
        }

        result
    }
}

/// Preferred device names for desktop PipeWire/PulseAudio environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for voice input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// Preferred devices are marked with "\[recommended\]"; obviously unusable
/// devices (surround channels, HDMI, etc.) are filtered out.
pub fn list_devices() -> Result<Vec<String>> {
    let (host, devices) = with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host.input_devices();
        (host, devices)
    });
    let _ = host; // keep host alive while iterating devices
    let devices = devices.map_err(|e| VoxbridgeError::AudioCapture {
        message: format!("Failed to enumerate input devices: {}", e),
    })?;

    let mut device_names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            if should_filter_device(&name) {
                continue;
            }

            if is_preferred_device(&name) {
                device_names.push(format!("{} [recommended]", name));
            } else {
                device_names.push(name);
            }
        }
    }

    Ok(device_names)
}

/// Get the best default input device, preferring PipeWire/PulseAudio so the
/// desktop's device selection is respected.
fn get_best_default_device() -> Result<cpal::Device> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();

        if let Ok(devices) = host.input_devices() {
            for device in devices {
                if let Ok(name) = device.name()
                    && is_preferred_device(&name)
                {
                    return Ok(device);
                }
            }
        }

        host.default_input_device()
            .ok_or_else(|| VoxbridgeError::AudioDeviceNotFound {
                device: "default".to_string(),
            })
    })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: the stream is only accessed from one thread at a time through
/// the Mutex in CpalSampleSource.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Microphone capture implementation using CPAL.
///
/// Captures 16-bit PCM at 16kHz mono. Tries the preferred format first
/// (i16/16kHz/mono), then f32 with conversion for devices that only expose
/// float formats.
pub struct CpalSampleSource {
    device: cpal::Device,
    stream: Mutex<Option<SendableStream>>,
    handoff_tx: Sender<Vec<i16>>,
    handoff_rx: Receiver<Vec<i16>>,
    sample_rate: u32,
}

impl CpalSampleSource {
    /// Create a new CPAL sample source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the best default.
    pub fn new(device_name: Option<&str>) -> Result<Self> {
        let device = with_suppressed_stderr(|| {
            let host = cpal::default_host();

            if let Some(name) = device_name {
                let devices = host
                    .input_devices()
                    .map_err(|e| VoxbridgeError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| VoxbridgeError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        // Bounded handoff from the hardware callback; sized like the frame
        // channel so several seconds of audio survive a stalled consumer.
        let (handoff_tx, handoff_rx) = bounded(defaults::FRAME_BUFFER);

        Ok(Self {
            device,
            stream: Mutex::new(None),
            handoff_tx,
            handoff_rx,
            sample_rate: defaults::SAMPLE_RATE,
        })
    }

    /// Build the input stream with the configured format.
    ///
    /// Tries i16/16kHz/mono first (PipeWire/PulseAudio convert
    /// transparently), then f32/16kHz/mono with software conversion.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: defaults::CHANNELS,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("voxbridge: audio stream error: {}", err);
        };

        // The callback must never block: try_send drops the block when the
        // handoff channel is full.
        let tx = self.handoff_tx.clone();
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let _ = tx.try_send(data.to_vec());
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let tx = self.handoff_tx.clone();
        self.device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let converted: Vec<i16> = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    let _ = tx.try_send(converted);
                },
                err_callback,
                None,
            )
            .map_err(|e| VoxbridgeError::AudioCapture {
                message: format!("Failed to build input stream: {}", e),
            })
    }
}

impl SampleSource for CpalSampleSource {
    fn start(&mut self) -> Result<()> {
        let stream = self.build_stream()?;
        stream.play().map_err(|e| VoxbridgeError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        if let Ok(mut guard) = self.stream.lock() {
            *guard = Some(SendableStream(stream));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Ok(mut guard) = self.stream.lock() {
            *guard = None; // dropping the stream stops capture
        }
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        // Drain everything the callback has queued since the last poll.
        let mut samples = Vec::new();
        while let Ok(block) = self.handoff_rx.try_recv() {
            samples.extend(block);
        }
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_filter_device() {
        assert!(should_filter_device("HDA Intel surround51"));
        assert!(should_filter_device("HDMI Output"));
        assert!(should_filter_device("front:CARD=PCH"));
        assert!(!should_filter_device("pipewire"));
        assert!(!should_filter_device("USB Microphone"));
    }

    #[test]
    fn test_is_preferred_device() {
        assert!(is_preferred_device("pipewire"));
        assert!(is_preferred_device("PulseAudio Sound Server"));
        assert!(is_preferred_device("pulse"));
        assert!(!is_preferred_device("hw:CARD=PCH,DEV=0"));
    }

    #[test]
    fn test_handoff_drops_when_full_without_blocking() {
        // The callback-side contract: try_send never blocks, overflow drops.
        let (tx, rx) = bounded::<Vec<i16>>(2);
        assert!(tx.try_send(vec![1]).is_ok());
        assert!(tx.try_send(vec![2]).is_ok());
        assert!(tx.try_send(vec![3]).is_err(), "overflow must not block");

        assert_eq!(rx.try_recv().unwrap(), vec![1]);
        assert_eq!(rx.try_recv().unwrap(), vec![2]);
        assert!(rx.try_recv().is_err());
    }
}
