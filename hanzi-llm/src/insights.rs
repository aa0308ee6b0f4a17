//! Cached, retry-guarded insight lookups

use crate::cache::InsightCache;
use crate::config::InsightConfig;
use crate::providers::{GeminiProvider, InsightProvider};
use crate::retry::{retry_with_backoff, RetryPolicy};
use hanzi_core::{ApiCredential, CharacterInfo, ScriptVariant};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fetches character insights through a provider, memoizing results.
pub struct InsightService {
    provider: Arc<dyn InsightProvider>,
    cache: Arc<InsightCache>,
    credential: Option<ApiCredential>,
    retry: RetryPolicy,
}

impl InsightService {
    pub fn new(
        provider: Arc<dyn InsightProvider>,
        cache: Arc<InsightCache>,
        credential: Option<ApiCredential>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            provider,
            cache,
            credential,
            retry,
        }
    }

    /// Build a service backed by Gemini
    pub fn gemini(
        config: &InsightConfig,
        cache: Arc<InsightCache>,
        credential: Option<ApiCredential>,
    ) -> crate::error::Result<Self> {
        let provider = GeminiProvider::new(config)?;
        Ok(Self::new(Arc::new(provider), cache, credential, config.retry))
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn cache(&self) -> &Arc<InsightCache> {
        &self.cache
    }

    /// Cached value for `character`, without any network access
    pub fn cached(&self, character: &str) -> Option<Arc<CharacterInfo>> {
        self.cache.get(character.trim())
    }

    /// Insight for `character`, or `None` when unavailable.
    ///
    /// Never fails: missing credential, empty input and every remote or
    /// parse failure yield `None` (failures are logged).
    pub async fn get_insights(
        &self,
        character: &str,
        variant: ScriptVariant,
    ) -> Option<Arc<CharacterInfo>> {
        let character = character.trim();
        if character.is_empty() {
            return None;
        }

        let api_key = match &self.credential {
            Some(key) => key,
            None => {
                debug!("No API credential configured, skipping insight for {}", character);
                return None;
            }
        };

        if let Some(cached) = self.cache.get(character) {
            debug!("Insight cache hit for {}", character);
            return Some(cached);
        }

        let provider = self.provider.clone();
        let result = retry_with_backoff(self.retry, || {
            let provider = provider.clone();
            async move { provider.generate_insight(api_key, character, variant).await }
        })
        .await;

        match result {
            Ok(info) => {
                info!("Fetched insight for {} via {}", character, self.provider.name());
                Some(self.cache.insert(character, info))
            }
            Err(e) => {
                warn!("Failed to fetch insight for {}: {}", character, e);
                None
            }
        }
    }
}
