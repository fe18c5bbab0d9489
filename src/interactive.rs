//! Line-based questionnaire behind `--interactive`.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::config::{EnvOverrides, StoredConfig};
use crate::error::{Error, Result};
use crate::models::{Provider, DEFAULT_BRANCH};
use crate::output::OutputFormat;

const PROVIDER_MENU: &str = "\
Select AI provider for generating standup speech:
1. Gemini (Google's AI - free tier available)
2. OpenAI (GPT models - free tier available for new accounts)
3. Anthropic (Claude models - requires paid API access)
4. Local (Basic template, no AI - completely free)";

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Asks for everything a run needs, starting from the saved answers.
    ///
    /// A first run is decided by the saved file alone. Secrets from the
    /// environment are layered on afterwards so they are not asked for again.
    pub fn run(&mut self, saved: StoredConfig, env: &EnvOverrides) -> Result<StoredConfig> {
        self.say("\n--- GitHub Standup Speech Generator ---\n")?;
        let first_run = saved.is_empty();
        let saved = env.apply_to(saved);

        let github_token = match saved.github_token.clone().filter(|t| !t.is_empty()) {
            Some(token) => token,
            None => {
                self.say("Your GitHub token will be saved locally for future use.")?;
                self.say("Note: The token will be visible while typing/pasting")?;
                self.ask("Enter your GitHub Personal Access Token: ")?
            }
        };

        let ai_provider = self.choose_provider(&saved, first_run)?;
        let mut answers = StoredConfig {
            github_token: Some(github_token),
            anthropic_api_key: saved.anthropic_api_key.clone(),
            openai_api_key: saved.openai_api_key.clone(),
            gemini_api_key: saved.gemini_api_key.clone(),
            ai_provider: Some(ai_provider),
            ..Default::default()
        };
        self.ask_missing_key(&mut answers, ai_provider)?;

        answers.username = Some(self.ask_username(&saved, first_run)?);

        let (repos, branches) = self.ask_repos(&saved)?;
        answers.repos = repos;
        answers.branches = branches;

        answers.days = Some(self.ask_days()?);

        answers.output = Some(if first_run {
            let choice = self.ask("\nOutput format (text/json) [text]: ")?;
            choice.parse().unwrap_or(OutputFormat::Text)
        } else {
            saved.output.unwrap_or_default()
        });

        answers.save = Some(if first_run {
            let choice = self.ask("\nSave output to file? (y/n) [n]: ")?;
            choice.to_lowercase().starts_with('y')
        } else {
            saved.save.unwrap_or(false)
        });

        Ok(answers)
    }

    fn choose_provider(&mut self, saved: &StoredConfig, first_run: bool) -> Result<Provider> {
        let saved_provider = saved.ai_provider.unwrap_or(Provider::Gemini);
        if !first_run {
            self.say(&format!("\nUsing saved AI provider: {}", saved_provider))?;
            let change = self.ask("Would you like to change the AI provider? (y/n) [n]: ")?;
            if !change.to_lowercase().starts_with('y') {
                return Ok(saved_provider);
            }
        }

        self.say(&format!("\n{}", PROVIDER_MENU))?;
        let choice = self.ask("Choose provider [1-4, default: 1]: ")?;
        Ok(match choice.as_str() {
            "2" => Provider::OpenAI,
            "3" => Provider::Anthropic,
            "4" => Provider::Local,
            _ => Provider::Gemini,
        })
    }

    fn ask_missing_key(&mut self, answers: &mut StoredConfig, provider: Provider) -> Result<()> {
        let (slot, label) = match provider {
            Provider::Anthropic => (&mut answers.anthropic_api_key, "Anthropic API Key"),
            Provider::OpenAI => (&mut answers.openai_api_key, "OpenAI API Key"),
            Provider::Gemini => (&mut answers.gemini_api_key, "Google Gemini API Key"),
            Provider::Local => return Ok(()),
        };
        if slot.as_deref().is_some_and(|k| !k.is_empty()) {
            return Ok(());
        }

        writeln!(self.output, "Your {} will be saved locally for future use.", label)?;
        writeln!(self.output, "Note: The API key will be visible while typing/pasting")?;
        let key = self.ask(&format!("Enter your {}: ", label))?;
        if provider == Provider::Gemini {
            writeln!(
                self.output,
                "You can get a free API key from https://aistudio.google.com/app/apikey"
            )?;
        }
        *slot = Some(key);
        Ok(())
    }

    fn ask_username(&mut self, saved: &StoredConfig, first_run: bool) -> Result<String> {
        let saved_username = saved.username.clone().unwrap_or_default();
        if first_run || saved_username.is_empty() {
            return self.ask("\nEnter your GitHub username to filter commits (optional): ");
        }

        let reuse = self.ask(&format!("\nUse saved username '{}'? (y/n) [y]: ", saved_username))?;
        if reuse.is_empty() || reuse.to_lowercase().starts_with('y') {
            Ok(saved_username)
        } else {
            self.ask("Enter your GitHub username: ")
        }
    }

    fn ask_repos(&mut self, saved: &StoredConfig) -> Result<(Vec<String>, HashMap<String, String>)> {
        let mut repos = Vec::new();
        let mut branches = HashMap::new();

        if !saved.repos.is_empty() {
            self.say("\nPreviously used repositories:")?;
            for (i, repo) in saved.repos.iter().enumerate() {
                let branch = saved.branches.get(repo).map(String::as_str).unwrap_or(DEFAULT_BRANCH);
                if branch == DEFAULT_BRANCH {
                    writeln!(self.output, "{}. {}", i + 1, repo)?;
                } else {
                    writeln!(self.output, "{}. {} (branch: {})", i + 1, repo, branch)?;
                }
            }

            let reuse = self.ask("\nUse these repositories? (y/n/select) [y]: ")?.to_lowercase();
            if reuse.is_empty() || reuse.starts_with('y') {
                return Ok((saved.repos.clone(), saved.branches.clone()));
            }
            if reuse == "select" {
                let indices = self.ask("Enter the numbers of repos to use (comma-separated): ")?;
                match parse_selection(&indices, saved.repos.len()) {
                    Some(selected) => {
                        for i in selected {
                            let repo = saved.repos[i].clone();
                            let branch = saved
                                .branches
                                .get(&repo)
                                .cloned()
                                .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
                            branches.insert(repo.clone(), branch);
                            repos.push(repo);
                        }
                    }
                    None => {
                        self.say("Invalid selection. Please enter repository information manually.")?;
                    }
                }
            }
        }

        while repos.is_empty() {
            self.say("\nEnter the repositories to fetch commits from (format: owner/repo)")?;
            self.say("Enter a blank line when done")?;

            loop {
                let repo = self.ask("Repository (owner/repo): ")?;
                if repo.is_empty() {
                    break;
                }
                if !repo.contains('/') {
                    self.say("Invalid format. Please use format 'owner/repo'")?;
                    continue;
                }

                let branch = self.ask(&format!(
                    "Branch for {} (leave empty for default branch): ",
                    repo
                ))?;
                let branch = if branch.is_empty() {
                    DEFAULT_BRANCH.to_string()
                } else {
                    branch
                };
                branches.insert(repo.clone(), branch);
                repos.push(repo);
            }

            if repos.is_empty() {
                self.say("You must enter at least one repository.")?;
            }
        }

        Ok((repos, branches))
    }

    fn ask_days(&mut self) -> Result<u32> {
        loop {
            let days = self.ask("\nNumber of days to look back for commits [1]: ")?;
            if days.is_empty() {
                return Ok(1);
            }
            match days.parse::<u32>() {
                Ok(n) if n >= 1 => return Ok(n),
                _ => self.say("Please enter a whole number of days (1 or more).")?,
            }
        }
    }

    fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Prints `question` and reads one trimmed line. End of input is an error.
    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(Error::Config("Input ended before setup was complete".to_string()));
        }
        Ok(line.trim().to_string())
    }
}

/// Parses "1, 3" into zero-based indices below `len`, dropping out-of-range ones.
fn parse_selection(input: &str, len: usize) -> Option<Vec<usize>> {
    let mut selected = Vec::new();
    for part in input.split(',') {
        let n: usize = part.trim().parse().ok()?;
        if (1..=len).contains(&n) {
            selected.push(n - 1);
        }
    }
    Some(selected)
}
