//! Practice session behaviour across navigation, insight and speech

use async_trait::async_trait;
use hanzi_core::{ApiCredential, CharacterInfo, ScriptVariant, TableConverter};
use hanzi_llm::{InsightCache, InsightProvider, InsightService, LLMError, RetryPolicy};
use hanzi_session::{InsightApplied, PracticeSession};
use hanzi_spk::engines::{DeviceVoice, LocalSpeechEngine, Utterance};
use hanzi_spk::{
    NullSink, PlaybackOrchestrator, PronounceOutcome, SkipReason, SpeechCache, SpeechConfig,
    SpeechEngine, SpeechError, VoiceProfile,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Insight provider whose answers can be held back per character
#[derive(Default)]
struct GatedProvider {
    gates: HashMap<String, Arc<Notify>>,
    requests: Mutex<Vec<(String, ScriptVariant)>>,
}

#[async_trait]
impl InsightProvider for GatedProvider {
    fn name(&self) -> &'static str {
        "gated"
    }

    async fn generate_insight(
        &self,
        _api_key: &ApiCredential,
        character: &str,
        variant: ScriptVariant,
    ) -> hanzi_llm::Result<CharacterInfo> {
        self.requests.lock().push((character.to_string(), variant));
        if let Some(gate) = self.gates.get(character) {
            gate.notified().await;
        }
        if character == "?" {
            return Err(LLMError::Schema("missing field `zhuyin`".to_string()));
        }
        Ok(CharacterInfo {
            character: character.to_string(),
            meaning: format!("meaning of {}", character),
            pinyin: "pīnyīn".to_string(),
            zhuyin: "ㄓㄨˋ".to_string(),
            radical: None,
            stroke_count: None,
            examples: Vec::new(),
        })
    }
}

struct UnusedCloud;

#[async_trait]
impl SpeechEngine for UnusedCloud {
    async fn synthesize(
        &self,
        _api_key: &ApiCredential,
        _text: &str,
        _voice: &VoiceProfile,
        _rate: f32,
    ) -> Result<bytes::Bytes, SpeechError> {
        Err(SpeechError::Api("cloud not expected".to_string()))
    }

    fn name(&self) -> &str {
        "unused"
    }
}

#[derive(Default)]
struct RecordingLocal {
    spoken: Mutex<Vec<Utterance>>,
    voices: Vec<DeviceVoice>,
}

#[async_trait]
impl LocalSpeechEngine for RecordingLocal {
    async fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        self.spoken.lock().push(utterance.clone());
        Ok(())
    }

    async fn list_voices(&self) -> Result<Vec<DeviceVoice>, SpeechError> {
        Ok(self.voices.clone())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "recording"
    }
}

struct Fixture {
    session: Arc<PracticeSession>,
    provider: Arc<GatedProvider>,
    local: Arc<RecordingLocal>,
}

fn fixture(provider: GatedProvider, local: RecordingLocal) -> Fixture {
    let provider = Arc::new(provider);
    let local = Arc::new(local);

    let insights = Arc::new(InsightService::new(
        provider.clone(),
        Arc::new(InsightCache::new()),
        ApiCredential::new("key"),
        RetryPolicy::new(0, Duration::from_millis(1)),
    ));
    let speech = Arc::new(PlaybackOrchestrator::new(
        SpeechConfig::default(),
        None,
        Arc::new(UnusedCloud),
        local.clone(),
        Arc::new(NullSink),
        Arc::new(SpeechCache::new()),
    ));
    let session = Arc::new(PracticeSession::new(
        ScriptVariant::Simplified,
        insights,
        speech,
        Arc::new(TableConverter::new()),
    ));

    Fixture {
        session,
        provider,
        local,
    }
}

async fn wait_for_request(provider: &GatedProvider, character: &str) {
    for _ in 0..1000 {
        if provider.requests.lock().iter().any(|(c, _)| c == character) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("no request for {}", character);
}

#[tokio::test]
async fn test_stale_insight_is_discarded() {
    let gate = Arc::new(Notify::new());
    let mut provider = GatedProvider::default();
    provider.gates.insert("永".to_string(), gate.clone());

    let f = fixture(provider, RecordingLocal::default());
    f.session.set_text("永和");
    assert_eq!(f.session.current().as_deref(), Some("永"));

    // Slow fetch for 永 is still pending when the learner moves to 和
    let slow = {
        let session = f.session.clone();
        tokio::spawn(async move { session.refresh_insight().await })
    };
    wait_for_request(&f.provider, "永").await;

    assert!(f.session.next());
    let fast = f.session.refresh_insight().await;
    match fast {
        InsightApplied::Applied(info) => assert_eq!(info.character, "和"),
        other => panic!("expected 和 to apply, got {:?}", other),
    }

    gate.notify_one();
    assert_eq!(slow.await.unwrap(), InsightApplied::Stale);

    let shown = f.session.displayed_insight().unwrap();
    assert_eq!(shown.character, "和");
}

#[tokio::test]
async fn test_insight_applies_when_still_current() {
    let f = fixture(GatedProvider::default(), RecordingLocal::default());
    f.session.set_text("永");

    assert!(matches!(f.session.refresh_insight().await, InsightApplied::Applied(_)));
    assert_eq!(f.session.displayed_insight().unwrap().character, "永");
}

#[tokio::test]
async fn test_displayed_insight_follows_navigation() {
    let f = fixture(GatedProvider::default(), RecordingLocal::default());
    f.session.set_text("永和");
    f.session.refresh_insight().await;

    f.session.next();
    assert!(f.session.displayed_insight().is_none());

    f.session.prev();
    assert_eq!(f.session.displayed_insight().unwrap().character, "永");
}

#[tokio::test]
async fn test_empty_session_is_noop() {
    let f = fixture(GatedProvider::default(), RecordingLocal::default());
    f.session.set_text("   ");

    assert!(f.session.is_empty());
    assert_eq!(f.session.refresh_insight().await, InsightApplied::Empty);
    assert_eq!(
        f.session.pronounce_current().await,
        PronounceOutcome::Skipped(SkipReason::EmptyCharacter)
    );
    assert!(f.provider.requests.lock().is_empty());
}

#[tokio::test]
async fn test_failed_insight_is_unavailable() {
    let f = fixture(GatedProvider::default(), RecordingLocal::default());
    f.session.set_text("?");

    assert_eq!(f.session.refresh_insight().await, InsightApplied::Unavailable);
    assert!(f.session.displayed_insight().is_none());
}

#[tokio::test]
async fn test_toggle_variant_converts_and_keeps_position() {
    let local = RecordingLocal {
        voices: vec![DeviceVoice::new("Mei-Jia", "zh_TW")],
        ..RecordingLocal::default()
    };
    let f = fixture(GatedProvider::default(), local);
    f.session.set_text("學漢語");
    assert_eq!(f.session.sequence(), vec!["学", "汉", "语"]);

    f.session.go_to(1);
    let variant = f.session.toggle_variant().await;

    assert_eq!(variant, ScriptVariant::Traditional);
    assert_eq!(f.session.sequence(), vec!["學", "漢", "語"]);
    assert_eq!(f.session.current_index(), 1);
    assert_eq!(
        f.session.speech().selected_voice(ScriptVariant::Traditional).unwrap().name,
        "Mei-Jia"
    );

    // Insight requests carry the new variant
    f.session.refresh_insight().await;
    assert_eq!(
        f.provider.requests.lock().last().cloned(),
        Some(("漢".to_string(), ScriptVariant::Traditional))
    );
}

#[tokio::test]
async fn test_pronounce_current_uses_variant_tag() {
    let f = fixture(GatedProvider::default(), RecordingLocal::default());
    f.session.set_text("永和");
    f.session.next();

    assert_eq!(f.session.pronounce_current().await, PronounceOutcome::Spoken);

    let spoken = f.local.spoken.lock();
    assert_eq!(spoken[0].text, "和");
    assert_eq!(spoken[0].language_tag, "zh-CN");
}
