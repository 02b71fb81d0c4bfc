//! Append-only history of sent emails and the duplicate-send rule over it.
//!
//! The rule (`has_recent_match`) only sees parsed [`SendRecord`]s; how rows
//! are laid out on disk is up to each [`SendLog`] backend.

mod file;
mod sqlite;

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

pub use file::CsvSendLog;
pub use sqlite::SqliteSendLog;

/// The fields two sends must share to count as the same send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendCriteria {
    pub recipient: String,
    pub subject: String,
    pub sender: String,
    pub template_version: String,
}

impl SendCriteria {
    pub fn matches(&self, record: &SendRecord) -> bool {
        record.recipient == self.recipient
            && record.subject == self.subject
            && record.sender == self.sender
            && record.template_version == self.template_version
    }
}

/// One logged send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRecord {
    pub timestamp: DateTime<Utc>,
    pub recipient: String,
    pub subject: String,
    pub sender: String,
    pub message_id: String,
    pub template_version: String,
}

impl SendRecord {
    pub fn new(criteria: &SendCriteria, message_id: &str, timestamp: DateTime<Utc>) -> Self {
        SendRecord {
            timestamp,
            recipient: criteria.recipient.clone(),
            subject: criteria.subject.clone(),
            sender: criteria.sender.clone(),
            message_id: message_id.to_string(),
            template_version: criteria.template_version.clone(),
        }
    }
}

pub trait SendLog {
    /// Every readable record. Rows whose timestamp does not parse are left out;
    /// a store that does not exist yet has no records.
    fn records(&self) -> Result<Vec<SendRecord>>;

    fn append(&mut self, record: &SendRecord) -> Result<()>;

    /// Whether a matching send was logged within the trailing `window`.
    fn recent_matches(&self, criteria: &SendCriteria, window: Duration) -> Result<bool> {
        self.recent_matches_at(criteria, window, Utc::now())
    }

    fn recent_matches_at(
        &self,
        criteria: &SendCriteria,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(has_recent_match(&self.records()?, criteria, window, now))
    }
}

/// True when some record matches `criteria` and falls within `[now - window, now]`.
pub fn has_recent_match(
    records: &[SendRecord],
    criteria: &SendCriteria,
    window: Duration,
    now: DateTime<Utc>,
) -> bool {
    let cutoff = now - window;
    records
        .iter()
        .any(|r| r.timestamp >= cutoff && r.timestamp <= now && criteria.matches(r))
}

/// ISO-8601 timestamp; values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Open the store at `path`: SQLite for `.sqlite`/`.sqlite3`/`.db`, CSV otherwise.
pub fn open(path: &Path) -> Result<Box<dyn SendLog>> {
    let is_sqlite = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext, "sqlite" | "sqlite3" | "db"));
    if is_sqlite {
        Ok(Box::new(SqliteSendLog::open(path)?))
    } else {
        Ok(Box::new(CsvSendLog::new(path)))
    }
}
