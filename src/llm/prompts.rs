use crate::models::Commit;

pub const SYSTEM_PROMPT: &str = "You are an assistant that helps developers create concise and informative standup speeches based on their GitHub commits.";

const INSTRUCTIONS: &str = r#"Please generate a concise and professional standup speech that:
1. Summarizes what I accomplished based on these commits
2. Groups related work together
3. Explains the impact of the changes where possible
4. Mentions any challenges I faced if they're apparent from the commit messages
5. Includes what I plan to work on next (you can infer this from the commits)

Keep it under 2 minutes when spoken aloud.
"#;

#[derive(Debug, Clone)]
pub struct StandupRequest<'a> {
    pub commits: &'a [Commit],
}

impl<'a> StandupRequest<'a> {
    pub fn new(commits: &'a [Commit]) -> Self {
        Self { commits }
    }

    pub fn to_prompt(&self) -> String {
        let mut prompt = String::from(
            "I need to give a daily standup speech based on my GitHub commits.\nHere are the commits:\n\n",
        );

        for (i, commit) in self.commits.iter().enumerate() {
            prompt.push_str(&format!("{}. [{}", i + 1, commit.repo));
            if commit.has_branch() {
                prompt.push_str(&format!(" [{}]", commit.branch));
            }
            prompt.push_str(&format!("] {} (sha: {})\n", commit.message, commit.sha));
        }

        prompt.push('\n');
        prompt.push_str(INSTRUCTIONS);
        prompt
    }

    pub fn estimate_tokens(&self) -> usize {
        let char_count: usize = self
            .commits
            .iter()
            .map(|c| c.repo.len() + c.branch.len() + c.message.len() + c.sha.len())
            .sum();
        // Rough estimate: ~4 characters per token
        char_count / 4 + INSTRUCTIONS.len() / 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

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
    fn test_prompt_lists_commits_in_order() {
        let commits = vec![
            commit("a/b", "main", "Fix login bug", "abc1234"),
            commit("c/d", "", "Add metrics endpoint", "def5678"),
        ];
        let prompt = StandupRequest::new(&commits).to_prompt();

        assert!(prompt.contains("1. [a/b [main]] Fix login bug (sha: abc1234)\n"));
        assert!(prompt.contains("2. [c/d] Add metrics endpoint (sha: def5678)\n"));
        assert!(prompt.contains("Groups related work together"));
        assert!(prompt.ends_with("Keep it under 2 minutes when spoken aloud.\n"));
    }
}
