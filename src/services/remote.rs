//! HTTP adapters for remote STT, translation, and TTS services.
//!
//! Thin request/response clients: PCM goes out as little-endian bytes,
//! results come back as JSON. Retry policy and wire details beyond that
//! belong to the services themselves.

use crate::error::{Result, VoxbridgeError};
use crate::services::stt::{SpeechToText, SttResult};
use crate::services::translate::Translator;
use crate::services::tts::{SynthesisChunk, Synthesizer};
use crate::pipeline::types::WordInfo;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout for all service calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn build_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| VoxbridgeError::Other(format!("Failed to build HTTP client: {}", e)))
}

/// Serializes PCM samples as little-endian bytes for request bodies.
fn pcm_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    bytes
}

/// Deserializes little-endian bytes back into PCM samples.
fn bytes_to_pcm(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[derive(Debug, Deserialize)]
struct SttResponse {
    text: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    words: Option<Vec<SttWord>>,
}

#[derive(Debug, Deserialize)]
struct SttWord {
    word: String,
    start_ms: u64,
    end_ms: u64,
    #[serde(default)]
    confidence: f32,
}

/// Speech-to-text over HTTP.
///
/// Sends raw PCM with the format described in query parameters; expects a
/// JSON transcript back. An empty transcript means "no speech".
pub struct HttpSpeechToText {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    language: String,
}

impl HttpSpeechToText {
    pub fn new(url: &str, language: &str, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.to_string(),
            api_key,
            language: language.to_string(),
        })
    }
}

impl SpeechToText for HttpSpeechToText {
    fn transcribe(&self, samples: &[i16], sample_rate: u32) -> Result<Option<SttResult>> {
        let sample_rate = sample_rate.to_string();
        let mut request = self
            .client
            .post(&self.url)
            .query(&[
                ("language", self.language.as_str()),
                ("sample_rate", sample_rate.as_str()),
                ("encoding", "linear16"),
            ])
            .header("content-type", "application/octet-stream")
            .body(pcm_to_bytes(samples));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| VoxbridgeError::Transcription {
            message: format!("request failed: {}", e),
        })?;

        if !response.status().is_success() {
            return Err(VoxbridgeError::Transcription {
                message: format!("service returned {}", response.status()),
            });
        }

        let parsed: SttResponse =
            response.json().map_err(|e| VoxbridgeError::Transcription {
                message: format!("invalid response: {}", e),
            })?;

        if parsed.text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(SttResult {
            text: parsed.text,
            is_final: true,
            confidence: parsed.confidence,
            words: parsed.words.map(|words| {
                words
                    .into_iter()
                    .map(|w| WordInfo {
                        word: w.word,
                        start_ms: w.start_ms,
                        end_ms: w.end_ms,
                        confidence: w.confidence,
                    })
                    .collect()
            }),
        }))
    }

    fn language(&self) -> &str {
        &self.language
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
    source_language: &'a str,
    target_language: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

/// Translation over HTTP.
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    source_language: String,
    target_language: String,
}

impl HttpTranslator {
    pub fn new(
        url: &str,
        source_language: &str,
        target_language: &str,
        api_key: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.to_string(),
            api_key,
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str) -> Result<String> {
        let mut request = self.client.post(&self.url).json(&TranslateRequest {
            text,
            source_language: &self.source_language,
            target_language: &self.target_language,
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| VoxbridgeError::Translation {
            message: format!("request failed: {}", e),
        })?;

        if !response.status().is_success() {
            return Err(VoxbridgeError::Translation {
                message: format!("service returned {}", response.status()),
            });
        }

        let parsed: TranslateResponse =
            response.json().map_err(|e| VoxbridgeError::Translation {
                message: format!("invalid response: {}", e),
            })?;

        Ok(parsed.translated_text)
    }

    fn target_language(&self) -> &str {
        &self.target_language
    }
}

#[derive(Debug, Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    sample_rate: u32,
}

/// Text-to-speech over HTTP.
///
/// Expects raw little-endian PCM back; the whole response body becomes a
/// single final chunk.
pub struct HttpSynthesizer {
    client: reqwest::blocking::Client,
    url: String,
    api_key: Option<String>,
    sample_rate: u32,
}

impl HttpSynthesizer {
    pub fn new(url: &str, sample_rate: u32, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.to_string(),
            api_key,
            sample_rate,
        })
    }
}

impl Synthesizer for HttpSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<SynthesisChunk>> {
        let mut request = self.client.post(&self.url).json(&SynthesizeRequest {
            text,
            sample_rate: self.sample_rate,
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| VoxbridgeError::Synthesis {
            message: format!("request failed: {}", e),
        })?;

        if !response.status().is_success() {
            return Err(VoxbridgeError::Synthesis {
                message: format!("service returned {}", response.status()),
            });
        }

        let bytes = response.bytes().map_err(|e| VoxbridgeError::Synthesis {
            message: format!("invalid response: {}", e),
        })?;

        let samples = bytes_to_pcm(&bytes);
        if samples.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![SynthesisChunk {
            samples,
            is_final: true,
        }])
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}
