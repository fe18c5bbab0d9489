use std::collections::HashMap;
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Credentials, Provider, DEFAULT_BRANCH};
use crate::output::{OutputFormat, RunParams};

/// Settings for one run, assembled once from defaults, the saved file, the
/// environment and the command line (later layers win).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub github_token: String,
    pub credentials: Credentials,
    pub ai_provider: Provider,
    pub username: Option<String>,
    pub repos: Vec<String>,
    pub branches: HashMap<String, String>,
    pub output: OutputFormat,
    pub save: bool,
    pub days: u32,
}

/// The record persisted between runs. Every field is optional on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub repos: Vec<String>,
    pub branches: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl StoredConfig {
    pub fn is_empty(&self) -> bool {
        *self == StoredConfig::default()
    }
}

/// Secrets read from `GITHUB_TOKEN`, `ANTHROPIC_API_KEY`, `OPENAI_API_KEY`
/// and `GEMINI_API_KEY`.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub github_token: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            github_token: var("GITHUB_TOKEN"),
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            gemini_api_key: var("GEMINI_API_KEY"),
        }
    }

    /// Overlays the environment secrets on a stored record.
    pub fn apply_to(&self, mut stored: StoredConfig) -> StoredConfig {
        if self.github_token.is_some() {
            stored.github_token = self.github_token.clone();
        }
        if self.anthropic_api_key.is_some() {
            stored.anthropic_api_key = self.anthropic_api_key.clone();
        }
        if self.openai_api_key.is_some() {
            stored.openai_api_key = self.openai_api_key.clone();
        }
        if self.gemini_api_key.is_some() {
            stored.gemini_api_key = self.gemini_api_key.clone();
        }
        stored
    }
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub github_token: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub ai_provider: Option<Provider>,
    pub repos: Option<Vec<String>>,
    pub branches: Option<Vec<String>>,
    pub days: Option<u32>,
    pub username: Option<String>,
    pub output: Option<OutputFormat>,
    pub save: bool,
    pub local: bool,
}

impl Config {
    pub fn resolve(stored: StoredConfig, env: &EnvOverrides, cli: CliOverrides) -> Result<Self> {
        let stored = env.apply_to(stored);
        let pick = |cli: Option<String>, stored: Option<String>| {
            cli.filter(|v| !v.is_empty()).or(stored.filter(|v| !v.is_empty()))
        };

        let github_token = pick(cli.github_token, stored.github_token).ok_or_else(|| {
            Error::Config(
                "GitHub token is required. Set GITHUB_TOKEN environment variable, use --github-token, or run with --interactive"
                    .to_string(),
            )
        })?;

        let credentials = Credentials {
            anthropic: pick(cli.anthropic_api_key, stored.anthropic_api_key),
            openai: pick(cli.openai_api_key, stored.openai_api_key),
            gemini: pick(cli.gemini_api_key, stored.gemini_api_key),
        };

        let branches = match (&cli.branches, &cli.repos) {
            (Some(branches), Some(repos)) if branches.len() == repos.len() => repos
                .iter()
                .cloned()
                .zip(branches.iter().cloned())
                .collect(),
            (Some(branches), repos) => {
                return Err(Error::Config(format!(
                    "Number of branches ({}) must match number of repos ({})",
                    branches.len(),
                    repos.as_ref().map(Vec::len).unwrap_or(0)
                )));
            }
            (None, _) => stored.branches,
        };

        let repos = cli.repos.unwrap_or(stored.repos);
        if repos.is_empty() {
            return Err(Error::Config(
                "At least one repository is required. Use --repos owner/repo1 owner/repo2 or run with --interactive"
                    .to_string(),
            ));
        }
        if let Some(bad) = repos.iter().find(|r| !is_repo_name(r)) {
            return Err(Error::Config(format!(
                "Invalid repository '{}', expected owner/repo",
                bad
            )));
        }

        let days = cli.days.or(stored.days).unwrap_or(1);
        if days < 1 {
            return Err(Error::Config("--days must be at least 1".to_string()));
        }

        // --local means no API calls, so the remote keys are dropped as well
        let (ai_provider, credentials) = if cli.local {
            (Provider::Local, Credentials::default())
        } else {
            (
                cli.ai_provider.or(stored.ai_provider).unwrap_or(Provider::Gemini),
                credentials,
            )
        };

        Ok(Self {
            github_token,
            credentials,
            ai_provider,
            username: pick(cli.username, stored.username),
            repos,
            branches,
            output: cli.output.or(stored.output).unwrap_or_default(),
            save: cli.save || stored.save.unwrap_or(false),
            days,
        })
    }

    pub fn branch_for(&self, repo: &str) -> &str {
        self.branches
            .get(repo)
            .map(String::as_str)
            .unwrap_or(DEFAULT_BRANCH)
    }

    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.days))
    }
}

impl From<&Config> for RunParams {
    fn from(config: &Config) -> Self {
        Self {
            repos: config.repos.clone(),
            days: config.days,
            username: config.username.clone().unwrap_or_default(),
        }
    }
}

fn is_repo_name(name: &str) -> bool {
    matches!(name.split_once('/'), Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
}

/// Reads and writes the [`StoredConfig`] JSON file.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub const FILE_NAME: &'static str = ".github_standup_config.json";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$GITSTANDUP_CONFIG` if set, otherwise the file in the home directory.
    pub fn default_location() -> Result<Self> {
        if let Some(path) = env::var_os("GITSTANDUP_CONFIG").filter(|p| !p.is_empty()) {
            return Ok(Self::new(path));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Ok(Self::new(home.join(Self::FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the saved record. A missing or unreadable file yields an empty one.
    pub fn load(&self) -> StoredConfig {
        if !self.path.exists() {
            return StoredConfig::default();
        }

        let parsed: Result<StoredConfig> = std::fs::read_to_string(&self.path)
            .map_err(Error::from)
            .and_then(|contents| Ok(serde_json::from_str(&contents)?));

        match parsed {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Error loading config file {}: {}", self.path.display(), e);
                StoredConfig::default()
            }
        }
    }

    /// Writes the record, readable and writable by the owner only.
    pub fn save(&self, config: &StoredConfig) -> Result<()> {
        let contents = serde_json::to_string_pretty(config)?;

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // mode() only applies on creation, so tighten a file that already existed
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(contents.as_bytes())?;

        tracing::debug!("Saved configuration to {}", self.path.display());
        Ok(())
    }

    pub fn reset(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
