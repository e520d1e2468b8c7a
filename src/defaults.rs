//! Default configuration constants for voxbridge.
//!
//! This module provides shared constants used across different configuration types
//! to ensure consistency and eliminate duplication.

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and provides a good balance
/// between quality and computational efficiency for voice applications.
pub const SAMPLE_RATE: u32 = 16000;

/// Default channel count (mono).
pub const CHANNELS: u16 = 1;

/// Default capture frame duration in milliseconds.
///
/// 30ms frames match the granularity the speech classifier scores well at
/// while keeping the segmenter responsive to short pauses.
pub const FRAME_DURATION_MS: u32 = 30;

/// Default speech probability threshold (0.0 to 1.0).
///
/// A frame whose classifier score reaches this value counts as speech.
pub const SPEECH_THRESHOLD: f32 = 0.5;

/// Default minimum speech duration in milliseconds.
///
/// Buffered speech shorter than this is never emitted; it filters out
/// coughs, clicks and other sub-word noises.
pub const MIN_SPEECH_DURATION_MS: u32 = 250;

/// Default minimum silence duration in milliseconds before an utterance ends.
pub const MIN_SILENCE_DURATION_MS: u32 = 300;

/// Default maximum utterance duration in milliseconds before force-split.
///
/// Long monologues are split at this cap so downstream services never wait
/// for an unbounded amount of audio.
pub const MAX_UTTERANCE_DURATION_MS: u32 = 15000;

/// The classifier's minimum scoring window, as a divisor of the sample rate.
///
/// 16000 / 31.25 = 512 samples, the smallest window the reference speech
/// model accepts. Shorter input is zero-padded before scoring.
pub const CLASSIFIER_WINDOW_DIVISOR: f32 = 31.25;

/// Frame channel capacity (capture → segmenter).
///
/// ~15 seconds of 30ms frames, enough to absorb STT/TTS round-trip jitter
/// without dropping microphone audio.
pub const FRAME_BUFFER: usize = 500;

/// Inter-stage channel capacity (one in flight plus headroom).
pub const STAGE_BUFFER: usize = 10;

/// Synthesis output channel capacity.
///
/// Larger than the other inter-stage channels because one translation can
/// fan out into many audio chunks.
pub const SYNTHESIS_BUFFER: usize = 100;

/// Idle backoff for station polling in milliseconds.
///
/// Also bounds how long a stop request can go unobserved.
pub const POLL_INTERVAL_MS: u64 = 10;

/// Default TTS output sample rate in Hz.
pub const TTS_SAMPLE_RATE: u32 = 24000;

/// Default source language for transcription.
pub const SOURCE_LANGUAGE: &str = "es";

/// Default target language for translation.
pub const TARGET_LANGUAGE: &str = "en";
