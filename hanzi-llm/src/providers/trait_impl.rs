use async_trait::async_trait;
use hanzi_core::{ApiCredential, CharacterInfo, ScriptVariant};
use crate::error::Result;

#[async_trait]
pub trait InsightProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Generate structured insight for one character.
    ///
    /// Implementations make exactly one remote request and return
    /// `LLMError::RateLimit` for HTTP 429 so callers can back off.
    async fn generate_insight(
        &self,
        api_key: &ApiCredential,
        character: &str,
        variant: ScriptVariant,
    ) -> Result<CharacterInfo>;
}
