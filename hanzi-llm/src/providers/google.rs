use async_trait::async_trait;
use crate::config::InsightConfig;
use crate::error::{LLMError, Result};
use crate::providers::trait_impl::InsightProvider;
use hanzi_core::{ApiCredential, CharacterInfo, ScriptVariant};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Keeps the key out of request URLs, which reqwest echoes in its errors
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini structured-generation client
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiProvider {
    pub fn new(config: &InsightConfig) -> Result<Self> {
        config.validate().map_err(LLMError::Provider)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// JSON schema sent as `responseSchema`
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "character": { "type": "STRING" },
                "meaning": { "type": "STRING", "description": "Concise English meaning" },
                "pinyin": { "type": "STRING", "description": "Pinyin with tone marks" },
                "zhuyin": { "type": "STRING", "description": "Zhuyin (Bopomofo)" },
                "radical": { "type": "STRING" },
                "strokeCount": { "type": "INTEGER" },
                "examples": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Common words using the character"
                }
            },
            "required": ["character", "meaning", "pinyin", "zhuyin"]
        })
    }

    pub fn build_prompt(character: &str, variant: ScriptVariant) -> String {
        let framing = match variant {
            ScriptVariant::Traditional => {
                "Answer for a learner of Traditional Chinese as used in Taiwan. \
                 Use Traditional characters in examples and give the Taiwan reading."
            }
            ScriptVariant::Simplified => {
                "Answer for a learner of Simplified Chinese as used in Mainland China. \
                 Use Simplified characters in examples and give the Mainland reading."
            }
        };

        format!(
            "Provide linguistic details for the Chinese character \"{}\". {} \
             Include its meaning, pinyin, zhuyin, radical, stroke count and up to three example words.",
            character, framing
        )
    }

    fn build_body(&self, character: &str, variant: ScriptVariant) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": Self::build_prompt(character, variant) }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema(),
                "temperature": self.temperature,
            }
        })
    }

    /// Extract and validate the structured record from a `generateContent` response
    pub fn parse_response(json: &Value) -> Result<CharacterInfo> {
        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| LLMError::InvalidResponse("No candidate text in response".to_string()))?;

        let value: Value = serde_json::from_str(text)?;
        let info: CharacterInfo =
            serde_json::from_value(value).map_err(|e| LLMError::Schema(e.to_string()))?;
        info.validate().map_err(LLMError::Schema)?;

        Ok(info)
    }
}

#[async_trait]
impl InsightProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_insight(
        &self,
        api_key: &ApiCredential,
        character: &str,
        variant: ScriptVariant,
    ) -> Result<CharacterInfo> {
        let model_encoded = urlencoding::encode(&self.model);
        let url = format!("{}/models/{}:generateContent", self.base_url, model_encoded);

        tracing::debug!("Requesting insight for {} from {} (key {})", character, self.model, api_key);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, api_key.expose())
            .json(&self.build_body(character, variant))
            .send()
            .await
            .map_err(|e| LLMError::HttpRequest(e.without_url()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(LLMError::RateLimit);
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(LLMError::AuthenticationFailed);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error_msg = if text.len() > 500 {
                let cut = (0..=500).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
                format!("HTTP {}: {}", status, &text[..cut])
            } else {
                format!("HTTP {}: {}", status, text)
            };
            return Err(LLMError::InvalidResponse(error_msg));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| LLMError::HttpRequest(e.without_url()))?;
        Self::parse_response(&json)
    }
}
