//! Pronunciation requests: one at a time, cloud or local

use crate::cache::SpeechCache;
use crate::config::{SpeechBackend, SpeechConfig};
use crate::decoder::{decode_payload, AudioBuffer};
use crate::engines::{
    CommandSpeechEngine, DeviceVoice, GoogleCloudTts, LocalSpeechEngine, SpeechEngine, Utterance,
};
use crate::error::SpeechError;
use crate::playback::AudioSink;
use crate::voices::select_voice;
use hanzi_core::{ApiCredential, ScriptVariant};
use hanzi_llm::retry_with_backoff;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result of one `pronounce` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PronounceOutcome {
    Spoken,
    Skipped(SkipReason),
    Failed(PronounceFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadySpeaking,
    EmptyCharacter,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PronounceFailure {
    #[error("Cloud speech needs an API key. Set GEMINI_API_KEY or switch to local speech.")]
    MissingCredential,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Could not decode audio: {0}")]
    Decode(String),

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Clears the speaking flag when the request ends, however it ends
struct SpeakingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for SpeakingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Drives cloud or local speech for the active character
pub struct PlaybackOrchestrator {
    config: SpeechConfig,
    backend: RwLock<SpeechBackend>,
    credential: Option<ApiCredential>,
    cloud: Arc<dyn SpeechEngine>,
    local: Arc<dyn LocalSpeechEngine>,
    sink: Arc<dyn AudioSink>,
    cache: Arc<SpeechCache>,
    speaking: AtomicBool,
    selected_voice: RwLock<Option<(ScriptVariant, DeviceVoice)>>,
}

impl PlaybackOrchestrator {
    pub fn new(
        config: SpeechConfig,
        credential: Option<ApiCredential>,
        cloud: Arc<dyn SpeechEngine>,
        local: Arc<dyn LocalSpeechEngine>,
        sink: Arc<dyn AudioSink>,
        cache: Arc<SpeechCache>,
    ) -> Self {
        Self {
            backend: RwLock::new(config.backend),
            config,
            credential,
            cloud,
            local,
            sink,
            cache,
            speaking: AtomicBool::new(false),
            selected_voice: RwLock::new(None),
        }
    }

    /// Google Cloud TTS for the cloud path, the platform synthesizer locally
    pub fn from_config(
        config: SpeechConfig,
        credential: Option<ApiCredential>,
        sink: Arc<dyn AudioSink>,
    ) -> Result<Self, SpeechError> {
        let cloud = Arc::new(GoogleCloudTts::new(&config)?);
        let local = Arc::new(CommandSpeechEngine::new());
        Ok(Self::new(
            config,
            credential,
            cloud,
            local,
            sink,
            Arc::new(SpeechCache::new()),
        ))
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Acquire)
    }

    pub fn backend(&self) -> SpeechBackend {
        *self.backend.read()
    }

    pub fn set_backend(&self, backend: SpeechBackend) {
        info!("Speech backend set to {}", backend.as_str());
        *self.backend.write() = backend;
    }

    pub fn speech_cache(&self) -> &Arc<SpeechCache> {
        &self.cache
    }

    /// Voice chosen by the last `refresh_voices` for `variant`
    pub fn selected_voice(&self, variant: ScriptVariant) -> Option<DeviceVoice> {
        self.selected_voice
            .read()
            .as_ref()
            .filter(|(chosen_for, _)| *chosen_for == variant)
            .map(|(_, voice)| voice.clone())
    }

    /// List device voices and remember the best match for `variant`
    pub async fn refresh_voices(&self, variant: ScriptVariant) -> Option<DeviceVoice> {
        let voices = match self.local.list_voices().await {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Could not list device voices: {}", e);
                Vec::new()
            }
        };

        let chosen = select_voice(&voices, variant, self.config.preferred_voice_names(variant));
        match &chosen {
            Some(voice) => info!("Selected voice {} ({}) for {}", voice.name, voice.lang, variant),
            None => debug!("No matching device voice for {} among {}", variant, voices.len()),
        }

        *self.selected_voice.write() = chosen.clone().map(|voice| (variant, voice));
        chosen
    }

    /// Speak `character`.
    ///
    /// Skipped while another request is in flight or for empty input. The
    /// speaking flag is set before any work and cleared exactly once when
    /// this future completes or is dropped.
    pub async fn pronounce(&self, character: &str, variant: ScriptVariant) -> PronounceOutcome {
        let character = character.trim();
        if character.is_empty() {
            return PronounceOutcome::Skipped(SkipReason::EmptyCharacter);
        }

        let _guard = match self.try_begin() {
            Some(guard) => guard,
            None => {
                debug!("Already speaking, ignoring request for {}", character);
                return PronounceOutcome::Skipped(SkipReason::AlreadySpeaking);
            }
        };

        let result = match self.backend() {
            SpeechBackend::Cloud => self.pronounce_cloud(character, variant).await,
            SpeechBackend::Local => self.pronounce_local(character, variant).await,
        };

        match result {
            Ok(()) => PronounceOutcome::Spoken,
            Err(failure) => {
                warn!("Pronouncing {} failed: {}", character, failure);
                PronounceOutcome::Failed(failure)
            }
        }
    }

    fn try_begin(&self) -> Option<SpeakingGuard<'_>> {
        self.speaking
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SpeakingGuard {
                flag: &self.speaking,
            })
    }

    async fn pronounce_cloud(
        &self,
        character: &str,
        variant: ScriptVariant,
    ) -> Result<(), PronounceFailure> {
        let api_key = self
            .credential
            .as_ref()
            .ok_or(PronounceFailure::MissingCredential)?;

        let buffer = match self.cache.get(character, variant) {
            Some(payload) => {
                debug!("Speech cache hit for {} ({})", character, variant);
                self.decode(&payload)?
            }
            None => {
                let voice = self.config.voice_for(variant);
                let rate = self.config.cloud_rate;
                let cloud = self.cloud.clone();
                let payload = retry_with_backoff(self.config.retry, || {
                    let cloud = cloud.clone();
                    async move { cloud.synthesize(api_key, character, voice, rate).await }
                })
                .await
                .map_err(|e| PronounceFailure::Synthesis(e.to_string()))?;

                info!(
                    "Synthesized {} bytes for {} via {}",
                    payload.len(),
                    character,
                    self.cloud.name()
                );

                // Only audio that decodes is worth keeping
                let buffer = self.decode(&payload)?;
                self.cache.insert(character, variant, payload);
                buffer
            }
        };

        self.sink
            .play(&buffer)
            .await
            .map_err(|e| PronounceFailure::Playback(e.to_string()))
    }

    fn decode(&self, payload: &[u8]) -> Result<AudioBuffer, PronounceFailure> {
        decode_payload(payload, self.config.sample_rate, self.config.channels)
            .map_err(|e| PronounceFailure::Decode(e.to_string()))
    }

    async fn pronounce_local(
        &self,
        character: &str,
        variant: ScriptVariant,
    ) -> Result<(), PronounceFailure> {
        let utterance = Utterance {
            text: character.to_string(),
            language_tag: variant.language_tag().to_string(),
            rate: self.config.local_rate,
            voice: self.selected_voice(variant),
        };

        self.local
            .speak(&utterance)
            .await
            .map_err(|e| PronounceFailure::Synthesis(e.to_string()))
    }
}
