use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::RepoCommits;

/// Anything that can list the commits of one repository since a point in time.
///
/// `branch` is `None` when the repository's default branch should be used; the
/// returned [`RepoCommits::branch`] is then the resolved default branch name.
#[async_trait]
pub trait CommitSource: Send + Sync {
    async fn fetch_commits(
        &self,
        repo: &str,
        since: DateTime<Utc>,
        branch: Option<&str>,
    ) -> Result<RepoCommits>;
}
