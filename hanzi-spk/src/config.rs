//! Configuration for pronunciation playback

use hanzi_core::ScriptVariant;
use hanzi_llm::RetryPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLOUD_TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com";

/// Speech configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Backend used by `pronounce` until changed at runtime
    pub backend: SpeechBackend,

    /// Cloud Text-to-Speech endpoint (without trailing slash)
    pub endpoint: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Cloud voice for Traditional characters
    pub traditional_voice: VoiceProfile,

    /// Cloud voice for Simplified characters
    pub simplified_voice: VoiceProfile,

    /// Cloud speaking-rate multiplier (below 1.0 for learners)
    pub cloud_rate: f32,

    /// Local speaking-rate multiplier
    pub local_rate: f32,

    /// Sample rate requested from the cloud and assumed for raw PCM
    pub sample_rate: u32,

    /// Channel count assumed for raw PCM
    pub channels: u16,

    /// Backoff for rate-limited synthesis requests
    pub retry: RetryPolicy,

    /// Device voice names tried first for Traditional, in priority order
    pub traditional_voice_names: Vec<String>,

    /// Device voice names tried first for Simplified, in priority order
    pub simplified_voice_names: Vec<String>,
}

/// Where speech comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Remote synthesis, decoded and played through an audio sink
    Cloud,
    /// Platform speech engine
    #[default]
    Local,
}

impl SpeechBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeechBackend::Cloud => "cloud",
            SpeechBackend::Local => "local",
        }
    }
}

/// Cloud voice selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    /// e.g. "cmn-TW"
    pub language_code: String,
    /// e.g. "cmn-TW-Wavenet-A"
    pub voice_name: String,
}

impl VoiceProfile {
    pub fn new(language_code: impl Into<String>, voice_name: impl Into<String>) -> Self {
        Self {
            language_code: language_code.into(),
            voice_name: voice_name.into(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::default(),
            endpoint: DEFAULT_CLOUD_TTS_ENDPOINT.to_string(),
            timeout_secs: 30,
            traditional_voice: VoiceProfile::new("cmn-TW", "cmn-TW-Wavenet-A"),
            simplified_voice: VoiceProfile::new("cmn-CN", "cmn-CN-Wavenet-A"),
            cloud_rate: 0.8,
            local_rate: 0.7,
            sample_rate: 24_000,
            channels: 1,
            retry: RetryPolicy::default(),
            traditional_voice_names: vec![
                "Mei-Jia".to_string(),
                "Google 國語（臺灣）".to_string(),
                "Microsoft HsiaoChen".to_string(),
            ],
            simplified_voice_names: vec![
                "Ting-Ting".to_string(),
                "Google 普通话（中国大陆）".to_string(),
                "Microsoft Xiaoxiao".to_string(),
            ],
        }
    }
}

impl SpeechConfig {
    pub fn voice_for(&self, variant: ScriptVariant) -> &VoiceProfile {
        match variant {
            ScriptVariant::Traditional => &self.traditional_voice,
            ScriptVariant::Simplified => &self.simplified_voice,
        }
    }

    pub fn preferred_voice_names(&self, variant: ScriptVariant) -> &[String] {
        match variant {
            ScriptVariant::Traditional => &self.traditional_voice_names,
            ScriptVariant::Simplified => &self.simplified_voice_names,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            return Err("Speech endpoint must be an http(s) URL".to_string());
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err("Speech timeout must be between 1 and 300 seconds".to_string());
        }

        // Cloud TTS accepts 0.25..=4.0
        for (name, rate) in [("cloud_rate", self.cloud_rate), ("local_rate", self.local_rate)] {
            if !rate.is_finite() || !(0.25..=4.0).contains(&rate) {
                return Err(format!("{} must be between 0.25 and 4.0", name));
            }
        }

        if self.sample_rate < 8_000 || self.sample_rate > 48_000 {
            return Err("Sample rate must be between 8000 and 48000 Hz".to_string());
        }

        if self.channels == 0 || self.channels > 8 {
            return Err("Channel count must be between 1 and 8".to_string());
        }

        for voice in [&self.traditional_voice, &self.simplified_voice] {
            if voice.language_code.is_empty() || voice.voice_name.is_empty() {
                return Err("Voice profile needs a language code and a voice name".to_string());
            }
        }

        self.retry.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_config_default() {
        let config = SpeechConfig::default();
        assert_eq!(config.backend, SpeechBackend::Local);
        assert!(config.cloud_rate < 1.0);
        assert!(config.local_rate < 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_voice_per_variant() {
        let config = SpeechConfig::default();
        assert_eq!(config.voice_for(ScriptVariant::Traditional).language_code, "cmn-TW");
        assert_eq!(config.voice_for(ScriptVariant::Simplified).language_code, "cmn-CN");
        assert_eq!(config.preferred_voice_names(ScriptVariant::Traditional)[0], "Mei-Jia");
    }

    #[test]
    fn test_speech_config_rejects_rate_out_of_range() {
        let mut config = SpeechConfig::default();
        config.cloud_rate = 0.1;
        assert!(config.validate().is_err());

        let mut config = SpeechConfig::default();
        config.local_rate = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_speech_config_rejects_zero_channels() {
        let mut config = SpeechConfig::default();
        config.channels = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let backend: SpeechBackend = serde_json::from_str("\"cloud\"").unwrap();
        assert_eq!(backend, SpeechBackend::Cloud);
    }
}
