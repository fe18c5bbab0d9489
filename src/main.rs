use std::io;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitstandup::interactive::Prompter;
use gitstandup::output::{format_output, save_output, RunParams};
use gitstandup::standup::NO_COMMITS_MESSAGE;
use gitstandup::{
    generate_standup, CliOverrides, CommitCollector, Config, ConfigStore, EnvOverrides,
    GitHubClient, OutputFormat, Provider, StoredConfig,
};

#[derive(Parser, Debug)]
#[command(name = "gitstandup")]
#[command(version = "0.1.0")]
#[command(about = "Generate a daily standup from your recent GitHub commits")]
struct Args {
    /// GitHub Personal Access Token
    #[arg(long)]
    github_token: Option<String>,

    /// Anthropic API key
    #[arg(long)]
    anthropic_api_key: Option<String>,

    /// OpenAI API key
    #[arg(long)]
    openai_api_key: Option<String>,

    /// Google Gemini API key
    #[arg(long)]
    gemini_api_key: Option<String>,

    /// Provider used to write the standup (anthropic, openai, gemini, local)
    #[arg(long)]
    ai_provider: Option<Provider>,

    /// Repositories to fetch commits from (owner/repo)
    #[arg(long, num_args = 1..)]
    repos: Option<Vec<String>>,

    /// Branch for each repository, in the same order as --repos ("default" for the default branch)
    #[arg(long, num_args = 1..)]
    branches: Option<Vec<String>>,

    /// Number of days to look back for commits [default: 1]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    days: Option<u32>,

    /// Only include commits by this GitHub user
    #[arg(long)]
    username: Option<String>,

    /// Output format (text, json) [default: text]
    #[arg(long)]
    output: Option<OutputFormat>,

    /// Save the output to standup_YYYYMMDD.<format>
    #[arg(long)]
    save: bool,

    /// Prompt for settings instead of reading them from flags
    #[arg(long)]
    interactive: bool,

    /// Forget the saved configuration before running
    #[arg(long)]
    reset_config: bool,

    /// Use the local template (no API calls)
    #[arg(long)]
    local: bool,

    /// Location of the saved configuration file [default: ~/.github_standup_config.json]
    #[arg(long)]
    config_path: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            github_token: self.github_token.clone(),
            anthropic_api_key: self.anthropic_api_key.clone(),
            openai_api_key: self.openai_api_key.clone(),
            gemini_api_key: self.gemini_api_key.clone(),
            ai_provider: self.ai_provider,
            repos: self.repos.clone(),
            branches: self.branches.clone(),
            days: self.days,
            username: self.username.clone(),
            output: self.output,
            save: self.save,
            local: self.local,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout only carries the standup
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gitstandup=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();
    let env = EnvOverrides::from_env();

    let store = match &args.config_path {
        Some(path) => Some(ConfigStore::new(path)),
        None => ConfigStore::default_location()
            .map_err(|e| tracing::warn!("Saved configuration unavailable: {}", e))
            .ok(),
    };

    if args.reset_config {
        if let Some(store) = &store {
            match store.reset() {
                Ok(()) => tracing::info!("Configuration reset. You'll need to enter your credentials again."),
                Err(e) => tracing::warn!("Could not reset configuration: {}", e),
            }
        }
    }

    let stored = store.as_ref().map(ConfigStore::load).unwrap_or_default();
    let stored = if args.interactive {
        let stdin = io::stdin();
        let answers = Prompter::new(stdin.lock(), io::stdout()).run(stored, &env)?;
        persist(store.as_ref(), &answers);
        answers
    } else {
        stored
    };

    let config = Config::resolve(stored, &env, args.overrides())?;

    let since = config.since(Utc::now());
    tracing::info!("Fetching commits since {}", since.format("%Y-%m-%d"));

    let github = GitHubClient::new(&config.github_token)?;
    let commits = CommitCollector::new(github)
        .collect(&config.repos, &config.branches, since, config.username.as_deref())
        .await;

    if commits.is_empty() {
        println!("{}", NO_COMMITS_MESSAGE);
        return Ok(());
    }
    tracing::info!("Found a total of {} commits", commits.len());

    let speech = generate_standup(&commits, config.ai_provider.as_str(), &config.credentials).await;

    let params = RunParams::from(&config);
    let output = format_output(config.output, &speech, &commits, Utc::now(), Some(&params))?;

    if config.save {
        match save_output(Path::new("."), &output, config.output, Local::now().date_naive()) {
            Ok(path) => tracing::info!("Standup saved to {}", path.display()),
            Err(e) => tracing::warn!("Could not save standup: {}", e),
        }
    }

    println!("\n--- GENERATED STANDUP ---\n");
    println!("{}", output);
    println!("\n------------------------\n");

    Ok(())
}

fn persist(store: Option<&ConfigStore>, answers: &StoredConfig) {
    let Some(store) = store else {
        return;
    };
    if let Err(e) = store.save(answers) {
        tracing::warn!("Error saving config to {}: {}", store.path().display(), e);
    }
}
