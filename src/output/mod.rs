pub mod json;
pub mod text;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::Commit;

pub use json::{format_json, parse_envelope, RunParams, StandupEnvelope};
pub use text::format_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}' (expected text or json)", other)),
        }
    }
}

pub fn format_output(
    format: OutputFormat,
    speech: &str,
    commits: &[Commit],
    generated_at: DateTime<Utc>,
    params: Option<&RunParams>,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_text(speech, commits)),
        OutputFormat::Json => format_json(speech, commits, generated_at, params),
    }
}

/// Writes `content` to `standup_YYYYMMDD.<ext>` inside `dir`, adding a `_N`
/// suffix instead of overwriting an existing file.
pub fn save_output(dir: &Path, content: &str, format: OutputFormat, date: NaiveDate) -> Result<PathBuf> {
    let base = format!("standup_{}", date.format("%Y%m%d"));
    let ext = format.extension();

    let mut path = dir.join(format!("{}.{}", base, ext));
    let mut count = 1;
    while path.exists() {
        path = dir.join(format!("{}_{}.{}", base, count, ext));
        count += 1;
    }

    std::fs::write(&path, content)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_save_output_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let first = save_output(dir.path(), "one", OutputFormat::Text, date).unwrap();
        let second = save_output(dir.path(), "two", OutputFormat::Text, date).unwrap();
        let json = save_output(dir.path(), "{}", OutputFormat::Json, date).unwrap();

        assert_eq!(first.file_name().unwrap(), "standup_20240102.text");
        assert_eq!(second.file_name().unwrap(), "standup_20240102_1.text");
        assert_eq!(json.file_name().unwrap(), "standup_20240102.json");
        assert_eq!(std::fs::read_to_string(first).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(second).unwrap(), "two");
    }
}
