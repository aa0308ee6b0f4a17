//! hanzi-spk: pronunciation playback
//!
//! - Cloud synthesis (Google Cloud Text-to-Speech) with retry and caching
//! - Local synthesis through the platform speech program
//! - 16-bit PCM decoding and audio sinks
//! - A single-flight orchestrator tying them together

pub mod error;
pub mod config;
pub mod decoder;
pub mod engines;
pub mod voices;
pub mod cache;
pub mod playback;
pub mod orchestrator;

pub use error::SpeechError;
pub use config::{SpeechBackend, SpeechConfig, VoiceProfile};
pub use decoder::{decode_payload, decode_pcm16, AudioBuffer, DecodeError};
pub use engines::{DeviceVoice, LocalSpeechEngine, SpeechEngine, Utterance};
pub use voices::select_voice;
pub use cache::SpeechCache;
pub use playback::{AudioSink, NullSink, WavFileSink};
pub use orchestrator::{PlaybackOrchestrator, PronounceFailure, PronounceOutcome, SkipReason};

#[cfg(feature = "audio-output")]
pub use playback::DeviceSink;
