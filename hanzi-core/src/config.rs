//! Credential resolution shared by the remote backends

use serde::{Deserialize, Serialize};
use std::fmt;

/// Environment variables consulted, in order, when no key is configured
pub const CREDENTIAL_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// API key for the generative-AI and cloud speech backends.
/// `Debug` and `Display` never print the key itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiCredential(String);

impl ApiCredential {
    /// Returns `None` for blank keys
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{}***", prefix)
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiCredential({})", self.redacted())
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Resolve the credential: explicit value first, then the environment.
pub fn resolve_credential(explicit: Option<&str>) -> Option<ApiCredential> {
    if let Some(credential) = explicit.and_then(|key| ApiCredential::new(key)) {
        return Some(credential);
    }

    for var in CREDENTIAL_ENV_VARS {
        if let Ok(value) = std::env::var(var) {
            if let Some(credential) = ApiCredential::new(value) {
                tracing::debug!("Using API credential from {}", var);
                return Some(credential);
            }
        }
    }

    None
}
