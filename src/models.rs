// Wire types for the conversion service. Field names follow the JSON the
// server sends; a couple of aliases cover older server builds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a conversion. Only `Success` and `Error` end polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Created => "CREATED",
            JobStatus::Success => "SUCCESS",
            JobStatus::Error => "ERROR",
            JobStatus::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Podcast {
    pub id: String,
    #[serde(alias = "title")]
    pub name: String,
}

/// A URL attached to a podcast, as returned by add-url and poll-item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub url: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Storage used by the account, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UsageBody")]
pub struct Usage {
    pub used: u64,
    pub limit: u64,
}

/// Servers send `{used, limit}`, `{used, usage}` with `usage` as the limit,
/// or `{usage, limit}` with `usage` as the amount used.
#[derive(Deserialize)]
struct UsageBody {
    used: Option<u64>,
    usage: Option<u64>,
    limit: Option<u64>,
}

impl From<UsageBody> for Usage {
    fn from(body: UsageBody) -> Self {
        match body.limit {
            Some(limit) => Usage {
                used: body.used.or(body.usage).unwrap_or(0),
                limit,
            },
            None => Usage {
                used: body.used.unwrap_or(0),
                limit: body.usage.unwrap_or(0),
            },
        }
    }
}

impl Usage {
    /// Fraction of the limit in use, clamped to `0.0..=1.0`.
    pub fn ratio(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        (self.used as f64 / self.limit as f64).min(1.0)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AddUrlRequest<'a> {
    pub podcast_id: &'a str,
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConvertRequest<'a> {
    pub urls: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobList {
    #[serde(default)]
    pub jobs: Vec<Job>,
}
