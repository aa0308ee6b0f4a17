//! Device voice auto-selection

use crate::engines::DeviceVoice;
use hanzi_core::ScriptVariant;

/// Pick a device voice for `variant`.
///
/// Priority: a preferred name (earlier entries win, matched
/// case-insensitively as a substring so vendor suffixes still match), then
/// an exact language tag, then any `zh` voice.
pub fn select_voice(
    voices: &[DeviceVoice],
    variant: ScriptVariant,
    preferred_names: &[String],
) -> Option<DeviceVoice> {
    for preferred in preferred_names {
        let preferred = preferred.to_lowercase();
        if preferred.is_empty() {
            continue;
        }
        if let Some(voice) = voices
            .iter()
            .find(|v| v.name.to_lowercase().contains(&preferred))
        {
            return Some(voice.clone());
        }
    }

    let target = normalize_tag(variant.language_tag());
    if let Some(voice) = voices.iter().find(|v| normalize_tag(&v.lang) == target) {
        return Some(voice.clone());
    }

    voices
        .iter()
        .find(|v| {
            let lang = normalize_tag(&v.lang);
            lang == "zh" || lang.starts_with("zh-")
        })
        .cloned()
}

// `zh_TW` and `zh-tw` name the same locale
fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_lowercase()
}
