use std::collections::HashMap;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use crate::github::source::CommitSource;
use crate::models::{Commit, CommitSet, GitHubCommit, DEFAULT_BRANCH, UNKNOWN_AUTHOR};

/// Turns the raw commits of one repository into canonical [`Commit`]s.
///
/// Merge commits are dropped. With a non-empty `username`, commits by other
/// known authors are dropped; commits whose author GitHub could not resolve
/// are kept.
pub fn normalize(
    repo: &str,
    branch: &str,
    raw_commits: Vec<GitHubCommit>,
    username: Option<&str>,
) -> Vec<Commit> {
    let username = username.filter(|u| !u.is_empty());

    raw_commits
        .into_iter()
        .filter(|raw| !raw.is_merge())
        .filter(|raw| match (username, raw.author_login()) {
            (Some(wanted), Some(login)) => login == wanted,
            _ => true,
        })
        .map(|raw| Commit {
            repo: repo.to_string(),
            sha: raw.sha.chars().take(7).collect(),
            author: raw
                .author_login()
                .unwrap_or(UNKNOWN_AUTHOR)
                .to_string(),
            message: raw.commit.message,
            date: raw.commit.author.date,
            url: raw.html_url,
            branch: branch.to_string(),
        })
        .collect()
}

/// Walks the configured repositories one at a time and gathers their commits.
pub struct CommitCollector<S> {
    source: S,
}

impl<S: CommitSource> CommitCollector<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Collects commits from every repository in `repos` since `since`.
    ///
    /// A repository that fails to load is logged and contributes nothing, so
    /// this never fails; if every repository fails the set is empty.
    pub async fn collect(
        &self,
        repos: &[String],
        branches: &HashMap<String, String>,
        since: DateTime<Utc>,
        username: Option<&str>,
    ) -> CommitSet {
        let pb = ProgressBar::new(repos.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repos")
        {
            pb.set_style(style.progress_chars("#>-"));
        }

        let mut all_commits = Vec::new();

        for repo in repos {
            tracing::info!("Fetching commits from {}...", repo);
            let requested = branches
                .get(repo)
                .map(String::as_str)
                .filter(|b| !b.is_empty() && *b != DEFAULT_BRANCH);

            match self.source.fetch_commits(repo, since, requested).await {
                Ok(fetched) => {
                    let commits = normalize(repo, &fetched.branch, fetched.commits, username);
                    tracing::info!("Found {} commits in {}", commits.len(), repo);
                    all_commits.extend(commits);
                }
                Err(e) => {
                    tracing::warn!("Error fetching commits from {}: {}", repo, e);
                }
            }

            pb.inc(1);
        }

        pb.finish_and_clear();
        CommitSet::new(all_commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::models::{CommitAuthor, CommitAuthorInfo, CommitDetails, ParentRef, RepoCommits};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn raw(sha: &str, message: &str, login: Option<&str>, parents: usize, hour: u32) -> GitHubCommit {
        GitHubCommit {
            sha: sha.to_string(),
            html_url: format!("https://github.com/a/b/commit/{}", sha),
            commit: CommitDetails {
                message: message.to_string(),
                author: CommitAuthor {
                    name: "Octo".to_string(),
                    email: "octo@example.com".to_string(),
                    date: Utc.with_ymd_and_hms(2024, 1, 2, hour, 0, 0).unwrap(),
                },
            },
            author: login.map(|l| CommitAuthorInfo {
                login: l.to_string(),
            }),
            parents: (0..parents)
                .map(|i| ParentRef {
                    sha: format!("parent{}", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_normalize_drops_merge_commits() {
        let commits = normalize(
            "a/b",
            "main",
            vec![
                raw("aaaaaaaaaa", "Add feature", Some("octo"), 1, 10),
                raw("bbbbbbbbbb", "Merge pull request #1", Some("octo"), 2, 11),
                raw("cccccccccc", "Initial commit", Some("octo"), 0, 9),
            ],
            None,
        );
        let shas: Vec<_> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["aaaaaaa", "ccccccc"]);
    }

    #[test]
    fn test_normalize_username_filter_keeps_unknown_authors() {
        let commits = normalize(
            "a/b",
            "main",
            vec![
                raw("1111111aaa", "Mine", Some("octo"), 1, 10),
                raw("2222222bbb", "Someone else", Some("hubot"), 1, 11),
                raw("3333333ccc", "No account", None, 1, 12),
            ],
            Some("octo"),
        );
        let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["Mine", "No account"]);
        assert_eq!(commits[1].author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_normalize_empty_username_disables_filter() {
        let commits = normalize(
            "a/b",
            "dev",
            vec![raw("1111111aaa", "Theirs", Some("hubot"), 1, 10)],
            Some(""),
        );
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].branch, "dev");
        assert_eq!(commits[0].sha, "1111111");
    }

    struct FakeSource {
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait]
    impl CommitSource for FakeSource {
        async fn fetch_commits(
            &self,
            repo: &str,
            _since: DateTime<Utc>,
            branch: Option<&str>,
        ) -> Result<RepoCommits> {
            self.calls
                .lock()
                .unwrap()
                .push((repo.to_string(), branch.map(str::to_string)));

            match repo {
                "a/b" => Ok(RepoCommits {
                    branch: branch.unwrap_or("main").to_string(),
                    commits: vec![
                        raw("old0000000", "Older", Some("octo"), 1, 8),
                        raw("merge00000", "Merge branch", Some("octo"), 2, 13),
                    ],
                }),
                "c/d" => Ok(RepoCommits {
                    branch: branch.unwrap_or("trunk").to_string(),
                    commits: vec![raw("new0000000", "Newer", Some("octo"), 1, 12)],
                }),
                _ => Err(Error::RepoNotFound(repo.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_collect_skips_failing_repositories() {
        let collector = CommitCollector::new(FakeSource {
            calls: Mutex::new(Vec::new()),
        });
        let repos = vec!["a/b".to_string(), "missing/repo".to_string(), "c/d".to_string()];
        let mut branches = HashMap::new();
        branches.insert("a/b".to_string(), "release".to_string());
        branches.insert("c/d".to_string(), DEFAULT_BRANCH.to_string());

        let set = collector
            .collect(&repos, &branches, Utc::now(), None)
            .await;

        let summary: Vec<_> = set
            .iter()
            .map(|c| (c.sha.as_str(), c.branch.as_str()))
            .collect();
        assert_eq!(summary, vec![("new0000", "trunk"), ("old0000", "release")]);

        let calls = collector.source.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                ("a/b".to_string(), Some("release".to_string())),
                ("missing/repo".to_string(), None),
                ("c/d".to_string(), None),
            ]
        );
    }

    #[tokio::test]
    async fn test_collect_all_failures_yield_empty_set() {
        let collector = CommitCollector::new(FakeSource {
            calls: Mutex::new(Vec::new()),
        });
        let repos = vec!["x/y".to_string(), "z/w".to_string()];
        let set = collector
            .collect(&repos, &HashMap::new(), Utc::now(), Some("octo"))
            .await;
        assert!(set.is_empty());
    }
}
