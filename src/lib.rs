pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod llm;
pub mod standup;
pub mod output;
pub mod interactive;

pub use config::{CliOverrides, Config, ConfigStore, EnvOverrides, StoredConfig};
pub use error::{Error, Result};
pub use github::{CommitCollector, CommitSource, GitHubClient};
pub use llm::{LLMProvider, StandupRequest};
pub use models::{Commit, CommitSet, Credentials, Provider};
pub use output::OutputFormat;
pub use standup::{generate_standup, render};
