// Text helpers for the terminal views: byte sizes, timestamps, status labels.

use crate::models::{Job, JobStatus, Usage};
use chrono::{DateTime, Local, NaiveDateTime, Utc};

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

pub fn format_bytes(bytes: u64) -> String {
    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// `Usage: 1.50 MB / 10.00 MB (15%)`
pub fn format_usage(usage: &Usage) -> String {
    format!(
        "Usage: {} / {} ({:.0}%)",
        format_bytes(usage.used),
        format_bytes(usage.limit),
        usage.ratio() * 100.0
    )
}

/// Parse the server's `created` timestamp. Accepts RFC 3339 and the
/// space-separated `2006-01-02 15:04:05.999Z` form.
pub fn parse_created(created: &str) -> Option<DateTime<Utc>> {
    let created = created.trim();
    if created.is_empty() {
        return None;
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(created) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(created, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(t.with_timezone(&Utc));
    }
    let naive = created.strip_suffix('Z')?;
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|t| t.and_utc())
}

/// Local time like `Jan 2, 2006 3:04 PM`; `-` when missing. Unparseable
/// values are shown as sent.
pub fn format_created(created: Option<&str>) -> String {
    match created {
        None => "-".to_string(),
        Some(raw) if raw.trim().is_empty() => "-".to_string(),
        Some(raw) => match parse_created(raw) {
            Some(t) => t
                .with_timezone(&Local)
                .format("%b %-d, %Y %-I:%M %p")
                .to_string(),
            None => raw.to_string(),
        },
    }
}

pub fn status_label(status: JobStatus) -> &'static str {
    match status {
        JobStatus::Created => "PROCESSING",
        JobStatus::Success => "✓ SUCCESS",
        JobStatus::Error => "❌ ERROR",
        JobStatus::Unknown => "UNKNOWN",
    }
}

pub fn display_title(title: Option<&str>, status: JobStatus) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ if status == JobStatus::Created => "Processing...".to_string(),
        _ => "(No title)".to_string(),
    }
}

/// One line per job for list views.
pub fn job_row(job: &Job) -> String {
    format!(
        "{:<50}  {:<12}  {}",
        display_title(job.title.as_deref(), job.status),
        status_label(job.status),
        format_created(job.created.as_deref())
    )
}

/// Newest first; jobs without a parseable timestamp go last, keeping
/// their relative order.
pub fn sort_newest_first(jobs: &mut [Job]) {
    jobs.sort_by(|a, b| {
        let ta = a.created.as_deref().and_then(parse_created);
        let tb = b.created.as_deref().and_then(parse_created);
        match (ta, tb) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}
