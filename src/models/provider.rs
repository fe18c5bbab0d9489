use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    OpenAI,
    Gemini,
    Local,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Anthropic,
        Provider::OpenAI,
        Provider::Gemini,
        Provider::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
            Provider::Local => "local",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown provider '{}' (expected anthropic, openai, gemini or local)",
                    s
                )
            })
    }
}

/// API keys for the remote generation services. `local` needs none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub anthropic: Option<String>,
    pub openai: Option<String>,
    pub gemini: Option<String>,
}

impl Credentials {
    /// The non-empty secret stored for `provider`, if any.
    pub fn get(&self, provider: Provider) -> Option<&str> {
        let key = match provider {
            Provider::Anthropic => self.anthropic.as_deref(),
            Provider::OpenAI => self.openai.as_deref(),
            Provider::Gemini => self.gemini.as_deref(),
            Provider::Local => None,
        };
        key.filter(|k| !k.trim().is_empty())
    }
}
