use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::commit::deserialize_timestamp;
use crate::models::Commit;

/// JSON document written in `--output json` mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandupEnvelope {
    pub speech: String,
    pub commits: Vec<Commit>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<RunParams>,
}

/// Echo of the run parameters in the extended envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    pub repos: Vec<String>,
    pub days: u32,
    #[serde(default)]
    pub username: String,
}

pub fn format_json(
    speech: &str,
    commits: &[Commit],
    generated_at: DateTime<Utc>,
    params: Option<&RunParams>,
) -> Result<String> {
    let envelope = StandupEnvelope {
        speech: speech.to_string(),
        commits: commits.to_vec(),
        generated_at,
        params: params.cloned(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parses either the plain or the extended (`params`) envelope.
pub fn parse_envelope(json: &str) -> Result<StandupEnvelope> {
    Ok(serde_json::from_str(json)?)
}
