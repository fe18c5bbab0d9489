use crate::models::{group_by_repo, Commit, DEFAULT_BRANCH};

const SEPARATOR_WIDTH: usize = 40;

/// The speech followed by a per-repository listing of the commits it covers.
pub fn format_text(speech: &str, commits: &[Commit]) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut output = String::from(speech);

    output.push_str(&format!("\n\n{}\n", separator));
    output.push_str(&format!("COMMIT DETAILS:\n{}\n\n", separator));

    for (repo, repo_commits) in group_by_repo(commits) {
        output.push_str(&format!("Repository: {}\n", repo));

        let show_branch = repo_commits.iter().any(|c| c.has_branch());
        for commit in repo_commits {
            if show_branch {
                let branch = if commit.has_branch() {
                    commit.branch.as_str()
                } else {
                    DEFAULT_BRANCH
                };
                output.push_str(&format!(
                    "  [{}] {} (sha: {})\n",
                    branch, commit.message, commit.sha
                ));
            } else {
                output.push_str(&format!("  {} (sha: {})\n", commit.message, commit.sha));
            }
        }

        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn commit(repo: &str, branch: &str, message: &str, sha: &str) -> Commit {
        Commit {
            repo: repo.to_string(),
            sha: sha.to_string(),
            message: message.to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
            author: "octo".to_string(),
            url: String::new(),
            branch: branch.to_string(),
        }
    }

    #[test]
    fn test_text_layout() {
        let commits = vec![
            commit("a/b", "main", "Fix login bug", "abc1234"),
            commit("c/d", "", "Add metrics endpoint", "def5678"),
            commit("a/b", "main", "Fix signup bug", "9876543"),
        ];

        let expected = "\
Speech body

----------------------------------------
COMMIT DETAILS:
----------------------------------------

Repository: a/b
  [main] Fix login bug (sha: abc1234)
  [main] Fix signup bug (sha: 9876543)

Repository: c/d
  Add metrics endpoint (sha: def5678)

";
        assert_eq!(format_text("Speech body", &commits), expected);
    }

    #[test]
    fn test_missing_branch_shown_as_default_next_to_known_ones() {
        let commits = vec![
            commit("a/b", "main", "Fix login bug", "abc1234"),
            commit("a/b", "", "Fix signup bug", "9876543"),
        ];

        let text = format_text("Speech body", &commits);
        assert!(text.contains("  [main] Fix login bug (sha: abc1234)\n"));
        assert!(text.contains("  [default] Fix signup bug (sha: 9876543)\n"));
        assert!(!text.contains("[]"));
    }
}
