//! Speech engine implementations

pub mod api;
pub mod native;

use crate::config::VoiceProfile;
use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use hanzi_core::ApiCredential;

pub use api::GoogleCloudTts;
pub use native::{CommandSpeechEngine, DeviceVoice, SpeechProgram, Utterance};

/// Remote synthesis returning encoded audio
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Synthesize `text` with the given voice and speaking rate
    async fn synthesize(
        &self,
        api_key: &ApiCredential,
        text: &str,
        voice: &VoiceProfile,
        rate: f32,
    ) -> Result<Bytes, SpeechError>;

    /// Get engine name
    fn name(&self) -> &str;
}

/// Platform speech engine that plays an utterance itself
#[async_trait]
pub trait LocalSpeechEngine: Send + Sync {
    /// Speak and resolve once playback has finished or failed
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;

    /// Voices installed on the device
    async fn list_voices(&self) -> Result<Vec<DeviceVoice>, SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}
