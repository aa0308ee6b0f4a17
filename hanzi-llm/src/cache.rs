use hanzi_core::CharacterInfo;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Per-character memo of fetched insights.
///
/// Grows for the lifetime of the process and is never evicted. The first
/// value stored for a key is kept, so concurrent fetches of the same
/// character all observe one shared value.
#[derive(Default)]
pub struct InsightCache {
    entries: RwLock<HashMap<String, Arc<CharacterInfo>>>,
}

impl InsightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, character: &str) -> Option<Arc<CharacterInfo>> {
        self.entries.read().get(character).cloned()
    }

    /// Store `info` under `character` and return the value now cached
    pub fn insert(&self, character: &str, info: CharacterInfo) -> Arc<CharacterInfo> {
        let mut entries = self.entries.write();
        entries
            .entry(character.to_string())
            .or_insert_with(|| Arc::new(info))
            .clone()
    }

    pub fn contains(&self, character: &str) -> bool {
        self.entries.read().contains_key(character)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
