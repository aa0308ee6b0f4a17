use serde::{Deserialize, Serialize};
use std::fmt;

/// Linguistic metadata for one character, as produced by the insight service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterInfo {
    pub character: String,
    pub meaning: String,
    pub pinyin: String,
    pub zhuyin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

impl CharacterInfo {
    /// Check the required fields are present and non-blank
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("character", &self.character),
            ("meaning", &self.meaning),
            ("pinyin", &self.pinyin),
            ("zhuyin", &self.zhuyin),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("Required field '{}' is empty", name));
            }
        }

        Ok(())
    }
}

/// Traditional vs. Simplified orthography
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptVariant {
    Traditional,
    #[default]
    Simplified,
}

impl ScriptVariant {
    pub fn toggled(self) -> Self {
        match self {
            ScriptVariant::Traditional => ScriptVariant::Simplified,
            ScriptVariant::Simplified => ScriptVariant::Traditional,
        }
    }

    /// BCP-47 tag used for prompts and local speech
    pub fn language_tag(self) -> &'static str {
        match self {
            ScriptVariant::Traditional => "zh-TW",
            ScriptVariant::Simplified => "zh-CN",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptVariant::Traditional => "traditional",
            ScriptVariant::Simplified => "simplified",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "traditional" | "trad" | "zh-tw" | "tw" => Some(ScriptVariant::Traditional),
            "simplified" | "simp" | "zh-cn" | "cn" => Some(ScriptVariant::Simplified),
            _ => None,
        }
    }
}

impl fmt::Display for ScriptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptVariant::Traditional => write!(f, "Traditional (繁體)"),
            ScriptVariant::Simplified => write!(f, "Simplified (简体)"),
        }
    }
}
