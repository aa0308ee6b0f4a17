//! Practice session: navigation, script variant, insight and speech

use hanzi_core::{CharacterInfo, NavigationState, ScriptConverter, ScriptVariant};
use hanzi_llm::InsightService;
use hanzi_spk::{PlaybackOrchestrator, PronounceOutcome, SpeechBackend};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// What happened to an insight fetch for the active character
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightApplied {
    /// Fetched and now displayed
    Applied(Arc<CharacterInfo>),
    /// Resolved after the user moved on, so it was discarded
    Stale,
    /// No active character
    Empty,
    /// No credential, or the fetch failed
    Unavailable,
}

/// One learner's session.
///
/// Methods take `&self` so navigation stays responsive while an insight
/// fetch or a pronunciation is awaiting.
pub struct PracticeSession {
    navigation: RwLock<NavigationState>,
    raw_text: RwLock<String>,
    variant: RwLock<ScriptVariant>,
    displayed: RwLock<Option<(String, Arc<CharacterInfo>)>>,
    insights: Arc<InsightService>,
    speech: Arc<PlaybackOrchestrator>,
    converter: Arc<dyn ScriptConverter>,
}

impl PracticeSession {
    pub fn new(
        variant: ScriptVariant,
        insights: Arc<InsightService>,
        speech: Arc<PlaybackOrchestrator>,
        converter: Arc<dyn ScriptConverter>,
    ) -> Self {
        Self {
            navigation: RwLock::new(NavigationState::new()),
            raw_text: RwLock::new(String::new()),
            variant: RwLock::new(variant),
            displayed: RwLock::new(None),
            insights,
            speech,
            converter,
        }
    }

    /// Replace the practice text, shown in the current variant, at position 0
    pub fn set_text(&self, raw: &str) {
        let variant = self.variant();
        let converted = self.converter.convert(raw, variant);
        *self.raw_text.write() = raw.to_string();
        self.navigation.write().set_text(&converted);
        debug!("Practice text set to {} characters", self.len());
    }

    pub fn next(&self) -> bool {
        self.navigation.write().next()
    }

    pub fn prev(&self) -> bool {
        self.navigation.write().prev()
    }

    pub fn go_to(&self, index: usize) -> bool {
        self.navigation.write().go_to(index)
    }

    pub fn current(&self) -> Option<String> {
        self.navigation.read().current().map(str::to_string)
    }

    pub fn current_index(&self) -> usize {
        self.navigation.read().current_index()
    }

    pub fn len(&self) -> usize {
        self.navigation.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.navigation.read().is_empty()
    }

    pub fn sequence(&self) -> Vec<String> {
        self.navigation.read().sequence().to_vec()
    }

    pub fn variant(&self) -> ScriptVariant {
        *self.variant.read()
    }

    pub fn speech(&self) -> &Arc<PlaybackOrchestrator> {
        &self.speech
    }

    /// Switch Traditional/Simplified, keeping the position when it still exists.
    ///
    /// The device voice is re-selected for the new variant.
    pub async fn toggle_variant(&self) -> ScriptVariant {
        let target = {
            let mut variant = self.variant.write();
            *variant = variant.toggled();
            *variant
        };

        let raw = self.raw_text.read().clone();
        let converted = self.converter.convert(&raw, target);
        {
            let mut navigation = self.navigation.write();
            let index = navigation.current_index();
            navigation.set_text(&converted);
            navigation.go_to(index);
        }

        info!("Script variant switched to {}", target);
        if self.speech.backend() == SpeechBackend::Local {
            self.speech.refresh_voices(target).await;
        }
        target
    }

    /// Fetch the insight for the current character.
    ///
    /// The result is applied only if that character is still current when
    /// the fetch resolves; otherwise it is dropped as stale.
    pub async fn refresh_insight(&self) -> InsightApplied {
        let character = match self.current() {
            Some(character) => character,
            None => return InsightApplied::Empty,
        };
        let variant = self.variant();

        let info = match self.insights.get_insights(&character, variant).await {
            Some(info) => info,
            None => return InsightApplied::Unavailable,
        };

        let navigation = self.navigation.read();
        if navigation.current() != Some(character.as_str()) {
            debug!(
                "Discarding insight for {}, active character is now {:?}",
                character,
                navigation.current()
            );
            return InsightApplied::Stale;
        }

        *self.displayed.write() = Some((character, info.clone()));
        InsightApplied::Applied(info)
    }

    /// The insight on display, if it belongs to the current character
    pub fn displayed_insight(&self) -> Option<Arc<CharacterInfo>> {
        let current = self.current()?;
        self.displayed
            .read()
            .as_ref()
            .filter(|(character, _)| *character == current)
            .map(|(_, info)| info.clone())
    }

    pub async fn pronounce_current(&self) -> PronounceOutcome {
        let character = self.current().unwrap_or_default();
        self.speech.pronounce(&character, self.variant()).await
    }
}
