//! Template-based standup summary that needs no network access.
//!
//! The output depends only on the commits passed in, so the same input always
//! renders the same text.

use std::collections::HashMap;

use crate::models::{group_by_repo, Commit};

pub const NO_COMMITS_MESSAGE: &str = "No commits found for the specified time period.";

pub fn render(commits: &[Commit]) -> String {
    let (Some(min_date), Some(max_date)) = (
        commits.iter().map(|c| c.date).min(),
        commits.iter().map(|c| c.date).max(),
    ) else {
        return NO_COMMITS_MESSAGE.to_string();
    };

    let repos = group_by_repo(commits);
    let mut summary = String::new();

    summary.push_str(&format!(
        "# Daily Standup Summary from {} to {}\n\n",
        min_date.format("%Y-%m-%d"),
        max_date.format("%Y-%m-%d")
    ));

    summary.push_str("## Work Summary\n\n");
    summary.push_str(&format!(
        "- Made {} commits across {} repositories\n",
        commits.len(),
        repos.len()
    ));

    summary.push_str("\n## Work by Repository\n\n");
    for (repo, repo_commits) in &repos {
        summary.push_str(&format!("### {}\n", repo));
        summary.push_str(&format!("- Made {} commits\n", repo_commits.len()));

        for (bucket, messages) in bucket_messages(repo_commits) {
            if messages.len() > 1 {
                summary.push_str(&format!(
                    "- Made {} commits to {} changes\n",
                    messages.len(),
                    capitalize(bucket)
                ));
            } else {
                summary.push_str(&format!("- {}\n", messages[0]));
            }
        }

        summary.push('\n');
    }

    summary.push_str("## Plan for Today\n\n");
    summary.push_str("- Continue work on active repositories\n");
    summary.push_str("- Address any feedback or issues that arise\n");

    summary
}

/// Buckets trimmed messages by their lower-cased first word, in first-seen order.
fn bucket_messages<'a>(commits: &[&'a Commit]) -> Vec<(String, Vec<&'a str>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, Vec<&'a str>)> = Vec::new();

    for commit in commits {
        let message = commit.message.trim();
        let key = message
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_lowercase();

        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(message),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![message]));
            }
        }
    }

    buckets
}

fn capitalize(word: String) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => word,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn commit(repo: &str, message: &str, sha: &str, day: u32, hour: u32) -> Commit {
        Commit {
            repo: repo.to_string(),
            sha: sha.to_string(),
            message: message.to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap(),
            author: "octo".to_string(),
            url: format!("https://github.com/{}/commit/{}", repo, sha),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_empty_commits_render_sentinel() {
        assert_eq!(render(&[]), NO_COMMITS_MESSAGE);
    }

    #[test]
    fn test_same_first_word_is_counted() {
        let commits = vec![
            commit("a/b", "Fix login bug", "abc1234", 2, 10),
            commit("a/b", "Fix signup bug", "def5678", 1, 9),
        ];
        let summary = render(&commits);

        assert!(summary.starts_with("# Daily Standup Summary from 2024-01-01 to 2024-01-02\n"));
        assert!(summary.contains("### a/b\n- Made 2 commits\n- Made 2 commits to Fix changes\n"));
    }

    #[test]
    fn test_single_message_is_emitted_verbatim() {
        let commits = vec![commit("a/b", "Add metrics endpoint", "abc1234", 2, 10)];
        let summary = render(&commits);

        assert!(summary.contains("- Add metrics endpoint\n"));
        assert!(!summary.contains("commits to Add changes"));
    }

    #[test]
    fn test_full_layout() {
        let commits = vec![
            commit("svc/api", "  fix timeout in client ", "1111111", 3, 12),
            commit("web/ui", "Update styles", "2222222", 3, 11),
            commit("svc/api", "Add retry", "3333333", 2, 10),
            commit("svc/api", "Fix flaky test", "4444444", 2, 9),
            commit("svc/api", "Fixed typo", "5555555", 1, 8),
        ];

        let expected = "\
# Daily Standup Summary from 2024-01-01 to 2024-01-03

## Work Summary

- Made 5 commits across 2 repositories

## Work by Repository

### svc/api
- Made 4 commits
- Made 2 commits to Fix changes
- Add retry
- Fixed typo

### web/ui
- Made 1 commits
- Update styles

## Plan for Today

- Continue work on active repositories
- Address any feedback or issues that arise
";
        assert_eq!(render(&commits), expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let commits = vec![
            commit("a/b", "Refactor parser", "1111111", 2, 10),
            commit("c/d", "Refactor lexer", "2222222", 1, 9),
        ];
        let first = render(&commits);
        for _ in 0..5 {
            assert_eq!(render(&commits), first);
        }
    }
}
