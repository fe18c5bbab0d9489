use crate::llm::{build_backend, select, LLMProvider, StandupRequest};
use crate::models::{Commit, Credentials};
use crate::standup::renderer::{self, NO_COMMITS_MESSAGE};

/// Produces the standup text for `commits` with the best available provider.
///
/// Always returns text: an empty commit list yields the fixed "no commits"
/// message, and any backend failure falls back to the local renderer.
pub async fn generate_standup(commits: &[Commit], requested: &str, credentials: &Credentials) -> String {
    if commits.is_empty() {
        return NO_COMMITS_MESSAGE.to_string();
    }

    let provider = select(requested, credentials);
    if provider.as_str() != requested {
        tracing::info!(
            "Requested provider '{}' is unavailable, falling back to {}",
            requested,
            provider
        );
    }

    match build_backend(provider, credentials) {
        Ok(backend) => generate_with(backend.as_ref(), commits).await,
        Err(e) => {
            tracing::warn!("Could not set up {} backend: {}", provider, e);
            renderer::render(commits)
        }
    }
}

/// Runs one backend and substitutes the local rendering if it produces nothing.
pub async fn generate_with(backend: &dyn LLMProvider, commits: &[Commit]) -> String {
    if commits.is_empty() {
        return NO_COMMITS_MESSAGE.to_string();
    }

    tracing::info!("Using {} for standup generation...", backend.name());
    let request = StandupRequest::new(commits);

    match backend.generate(&request).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!("{} returned an empty standup, falling back to local template", backend.name());
            renderer::render(commits)
        }
        Err(e) => {
            tracing::warn!("{} generation failed: {}. Falling back to local template", backend.name(), e);
            renderer::render(commits)
        }
    }
}
