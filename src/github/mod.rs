pub mod client;
pub mod collector;
pub mod paginator;
pub mod source;

pub use client::GitHubClient;
pub use collector::{normalize, CommitCollector};
pub use paginator::Paginator;
pub use source::CommitSource;
