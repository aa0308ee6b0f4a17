//! Synthesized audio memoized per character and script variant

use bytes::Bytes;
use hanzi_core::ScriptVariant;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Append-only audio payload cache.
///
/// Keyed by variant too, because each variant is spoken by a different voice.
#[derive(Default)]
pub struct SpeechCache {
    entries: RwLock<HashMap<(String, ScriptVariant), Bytes>>,
}

impl SpeechCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, character: &str, variant: ScriptVariant) -> Option<Bytes> {
        self.entries
            .read()
            .get(&(character.to_string(), variant))
            .cloned()
    }

    /// Store a payload; the first payload stored for a key is kept
    pub fn insert(&self, character: &str, variant: ScriptVariant, audio: Bytes) -> Bytes {
        self.entries
            .write()
            .entry((character.to_string(), variant))
            .or_insert(audio)
            .clone()
    }

    pub fn contains(&self, character: &str, variant: ScriptVariant) -> bool {
        self.entries
            .read()
            .contains_key(&(character.to_string(), variant))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Total cached payload size
    pub fn size_bytes(&self) -> usize {
        self.entries.read().values().map(Bytes::len).sum()
    }
}
