use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("GitHub rejected the token for {0}")]
    Unauthorized(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("Empty response from {0}")]
    EmptyResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;
