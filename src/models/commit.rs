use std::collections::HashMap;
use std::ops::Deref;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Author login recorded when GitHub could not link the commit to an account.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Branch value meaning "whatever the repository's default branch is".
pub const DEFAULT_BRANCH: &str = "default";

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommit {
    pub sha: String,
    #[serde(default)]
    pub html_url: String,
    pub commit: CommitDetails,
    pub author: Option<CommitAuthorInfo>,
    #[serde(default)]
    pub parents: Vec<ParentRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetails {
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitAuthorInfo {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentRef {
    pub sha: String,
}

impl GitHubCommit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }
}

/// Subset of `GET /repos/{owner}/{repo}` needed to resolve the default branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub default_branch: String,
}

/// Raw commits fetched for one repository together with the branch they came from.
#[derive(Debug, Clone)]
pub struct RepoCommits {
    pub branch: String,
    pub commits: Vec<GitHubCommit>,
}

/// Canonical commit record shared by the renderer, the prompts and the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub repo: String,
    pub sha: String,
    pub message: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: DateTime<Utc>,
    pub author: String,
    pub url: String,
    #[serde(default)]
    pub branch: String,
}

impl Commit {
    pub fn has_branch(&self) -> bool {
        !self.branch.is_empty()
    }
}

/// Commits ordered newest first. Commits sharing a timestamp keep the order
/// in which they were collected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitSet(Vec<Commit>);

impl CommitSet {
    pub fn new(mut commits: Vec<Commit>) -> Self {
        // sort_by is stable
        commits.sort_by(|a, b| b.date.cmp(&a.date));
        Self(commits)
    }
}

impl Deref for CommitSet {
    type Target = [Commit];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Reads an RFC 3339 timestamp, or an ISO 8601 one without an offset taken as UTC.
pub(crate) fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Groups commits by repository, keeping repositories (and the commits within
/// each) in the order they are first encountered.
pub fn group_by_repo(commits: &[Commit]) -> Vec<(&str, Vec<&Commit>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&Commit>)> = Vec::new();

    for commit in commits {
        let slot = *index.entry(commit.repo.as_str()).or_insert_with(|| {
            groups.push((commit.repo.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(commit);
    }

    groups
}
