//! Application configuration file

use crate::stroke::WidgetConfig;
use hanzi_core::{resolve_credential, ApiCredential, ScriptVariant};
use hanzi_llm::InsightConfig;
use hanzi_spk::SpeechConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for hanzi_core::Error {
    fn from(err: ConfigError) -> Self {
        hanzi_core::Error::Configuration(err.to_string())
    }
}

/// Everything the practice tool can be configured with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// API key; falls back to the environment when unset
    pub api_key: Option<String>,

    /// Variant the session starts in
    pub variant: ScriptVariant,

    /// Text loaded when none is given on the command line
    pub default_text: Option<String>,

    pub insight: InsightConfig,

    pub speech: SpeechConfig,

    pub widget: WidgetConfig,

    /// Pause between demonstration loops, in milliseconds
    pub demo_pause_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            variant: ScriptVariant::default(),
            default_text: None,
            insight: InsightConfig::default(),
            speech: SpeechConfig::default(),
            widget: WidgetConfig::default(),
            demo_pause_ms: 1000,
        }
    }
}

impl AppConfig {
    /// `<config dir>/hanzi/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hanzi").join("config.toml"))
    }

    /// Load from `path`, or from the default location.
    ///
    /// A missing file yields defaults; a present but broken file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_str(&content)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.insight.validate()?;
        self.speech.validate()?;
        self.widget.validate()?;
        if self.demo_pause_ms > 60_000 {
            return Err("Demo pause too large (max 60000 ms)".to_string());
        }
        Ok(())
    }

    /// Configured key, else `GEMINI_API_KEY`, else `GOOGLE_API_KEY`
    pub fn credential(&self) -> Option<ApiCredential> {
        resolve_credential(self.api_key.as_deref())
    }

    pub fn demo_pause(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.demo_pause_ms)
    }
}
