use crate::error::Result;
use crate::llm::{ClaudeProvider, GeminiProvider, LLMProvider, LocalProvider, OpenAIProvider};
use crate::models::{Credentials, Provider};

/// Order in which remote providers are tried when the requested one has no key.
pub const FALLBACK_ORDER: [Provider; 3] = [Provider::Gemini, Provider::OpenAI, Provider::Anthropic];

/// Picks the provider to use for `requested`. Never fails: ends at
/// [`Provider::Local`] when no remote provider has a key.
pub fn select(requested: &str, credentials: &Credentials) -> Provider {
    if let Ok(provider) = requested.parse::<Provider>() {
        if provider != Provider::Local && credentials.get(provider).is_some() {
            return provider;
        }
    }

    FALLBACK_ORDER
        .into_iter()
        .find(|p| credentials.get(*p).is_some())
        .unwrap_or(Provider::Local)
}

/// Builds the backend for an already selected provider.
pub fn build_backend(provider: Provider, credentials: &Credentials) -> Result<Box<dyn LLMProvider>> {
    let key = |p: Provider| credentials.get(p).unwrap_or_default().to_string();

    Ok(match provider {
        Provider::Anthropic => Box::new(ClaudeProvider::new(key(provider), None)?),
        Provider::OpenAI => Box::new(OpenAIProvider::new(key(provider), None)?),
        Provider::Gemini => Box::new(GeminiProvider::new(key(provider))?),
        Provider::Local => Box::new(LocalProvider::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(anthropic: &str, openai: &str, gemini: &str) -> Credentials {
        Credentials {
            anthropic: Some(anthropic.to_string()),
            openai: Some(openai.to_string()),
            gemini: Some(gemini.to_string()),
        }
    }

    #[test]
    fn test_requested_provider_with_key_wins() {
        let credentials = creds("k1", "k2", "k3");
        assert_eq!(select("anthropic", &credentials), Provider::Anthropic);
        assert_eq!(select("openai", &credentials), Provider::OpenAI);
    }

    #[test]
    fn test_missing_key_falls_back_in_fixed_order() {
        assert_eq!(select("openai", &creds("k1", "", "")), Provider::Anthropic);
        assert_eq!(select("anthropic", &creds("", "k2", "k3")), Provider::Gemini);
        assert_eq!(select("gemini", &creds("k1", "k2", "")), Provider::OpenAI);
    }

    #[test]
    fn test_no_keys_selects_local() {
        for requested in ["anthropic", "openai", "gemini", "local", "", "bogus"] {
            assert_eq!(select(requested, &Credentials::default()), Provider::Local);
            assert_eq!(select(requested, &creds("", "", "")), Provider::Local);
        }
    }

    #[test]
    fn test_local_request_still_uses_available_keys() {
        assert_eq!(select("local", &creds("", "k2", "")), Provider::OpenAI);
    }

    #[test]
    fn test_unknown_request_uses_fallback_order() {
        assert_eq!(select("claude", &creds("k1", "", "")), Provider::Anthropic);
    }
}
