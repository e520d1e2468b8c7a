use crate::defaults;
use crate::pipeline::segmenter::SegmenterConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub segmenter: SegmenterSettings,
    pub services: ServicesConfig,
}

/// Audio capture configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub input_device: Option<String>,
    pub sample_rate: u32,
    pub channels: u16,
    pub frame_duration_ms: u32,
}

/// Speech segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterSettings {
    pub threshold: f32,
    pub min_speech_duration_ms: u32,
    pub min_silence_duration_ms: u32,
    pub max_utterance_duration_ms: u32,
}

/// External service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServicesConfig {
    pub source_language: String,
    pub target_language: String,
    pub stt_url: Option<String>,
    pub translation_url: Option<String>,
    pub tts_url: Option<String>,
    pub api_key: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: None,
            sample_rate: defaults::SAMPLE_RATE,
            channels: defaults::CHANNELS,
            frame_duration_ms: defaults::FRAME_DURATION_MS,
        }
    }
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            threshold: defaults::SPEECH_THRESHOLD,
            min_speech_duration_ms: defaults::MIN_SPEECH_DURATION_MS,
            min_silence_duration_ms: defaults::MIN_SILENCE_DURATION_MS,
            max_utterance_duration_ms: defaults::MAX_UTTERANCE_DURATION_MS,
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            source_language: defaults::SOURCE_LANGUAGE.to_string(),
            target_language: defaults::TARGET_LANGUAGE.to_string(),
            stt_url: None,
            translation_url: None,
            tts_url: None,
            api_key: None,
        }
    }
}

impl SegmenterSettings {
    /// Converts to the pipeline's segmenter configuration.
    pub fn to_segmenter_config(&self) -> SegmenterConfig {
        SegmenterConfig {
            threshold: self.threshold,
            min_speech_duration_ms: self.min_speech_duration_ms,
            min_silence_duration_ms: self.min_silence_duration_ms,
            max_utterance_duration_ms: self.max_utterance_duration_ms,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML or invalid values.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Checks value ranges that TOML typing alone cannot enforce.
    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.segmenter.threshold) {
            anyhow::bail!(
                "segmenter.threshold must be between 0.0 and 1.0, got {}",
                self.segmenter.threshold
            );
        }
        if self.audio.sample_rate == 0 {
            anyhow::bail!("audio.sample_rate must be positive");
        }
        if self.segmenter.max_utterance_duration_ms < self.segmenter.min_speech_duration_ms {
            anyhow::bail!(
                "segmenter.max_utterance_duration_ms must not be below min_speech_duration_ms"
            );
        }
        Ok(())
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXBRIDGE_SOURCE_LANGUAGE → services.source_language
    /// - VOXBRIDGE_TARGET_LANGUAGE → services.target_language
    /// - VOXBRIDGE_AUDIO_DEVICE → audio.input_device
    /// - VOXBRIDGE_API_KEY → services.api_key
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(language) = std::env::var("VOXBRIDGE_SOURCE_LANGUAGE")
            && !language.is_empty()
        {
            self.services.source_language = language;
        }

        if let Ok(language) = std::env::var("VOXBRIDGE_TARGET_LANGUAGE")
            && !language.is_empty()
        {
            self.services.target_language = language;
        }

        if let Ok(device) = std::env::var("VOXBRIDGE_AUDIO_DEVICE")
            && !device.is_empty()
        {
            self.audio.input_device = Some(device);
        }

        if let Ok(api_key) = std::env::var("VOXBRIDGE_API_KEY")
            && !api_key.is_empty()
        {
            self.services.api_key = Some(api_key);
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxbridge/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> std::path::PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("voxbridge")
            .join("config.toml")
    }
}
