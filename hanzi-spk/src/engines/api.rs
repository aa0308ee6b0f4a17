//! Google Cloud Text-to-Speech engine

use crate::config::{SpeechConfig, VoiceProfile};
use crate::engines::SpeechEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use hanzi_core::ApiCredential;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Cloud TTS client requesting LINEAR16 audio
pub struct GoogleCloudTts {
    client: Client,
    endpoint: String,
    sample_rate: u32,
}

impl GoogleCloudTts {
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Config)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SpeechError::Engine(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            sample_rate: config.sample_rate,
        })
    }

    pub fn build_body(&self, text: &str, voice: &VoiceProfile, rate: f32) -> Value {
        json!({
            "input": { "text": text },
            "voice": {
                "languageCode": voice.language_code,
                "name": voice.voice_name,
            },
            "audioConfig": {
                "audioEncoding": "LINEAR16",
                "speakingRate": rate,
                "sampleRateHertz": self.sample_rate,
            }
        })
    }

    /// Pull the base64 `audioContent` out of a synthesize response
    pub fn parse_response(json: &Value) -> Result<Bytes, SpeechError> {
        let encoded = json["audioContent"]
            .as_str()
            .ok_or_else(|| SpeechError::Api("No audioContent in response".to_string()))?;

        let audio = STANDARD
            .decode(encoded)
            .map_err(|e| SpeechError::Api(format!("Invalid base64 audio: {}", e)))?;

        if audio.is_empty() {
            return Err(SpeechError::Api("Empty audio payload".to_string()));
        }

        Ok(Bytes::from(audio))
    }
}

#[async_trait]
impl SpeechEngine for GoogleCloudTts {
    async fn synthesize(
        &self,
        api_key: &ApiCredential,
        text: &str,
        voice: &VoiceProfile,
        rate: f32,
    ) -> Result<Bytes, SpeechError> {
        let url = format!("{}/v1/text:synthesize", self.endpoint);

        debug!("Synthesizing {} with {} (key {})", text, voice.voice_name, api_key);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, api_key.expose())
            .json(&self.build_body(text, voice, rate))
            .send()
            .await
            .map_err(|e| SpeechError::HttpRequest(e.without_url()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(SpeechError::RateLimit);
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(SpeechError::AuthenticationFailed);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let cut = (0..=text.len().min(500))
                .rev()
                .find(|i| text.is_char_boundary(*i))
                .unwrap_or(0);
            return Err(SpeechError::Api(format!("HTTP {}: {}", status, &text[..cut])));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| SpeechError::HttpRequest(e.without_url()))?;
        Self::parse_response(&json)
    }

    fn name(&self) -> &str {
        "Google Cloud TTS"
    }
}
