use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{parse_timestamp, SendLog, SendRecord};

/// Send history kept as a CSV file with a header row.
pub struct CsvSendLog {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct SendRow {
    timestamp_utc: String,
    recipient: String,
    subject: String,
    sender: String,
    message_id: String,
    template_version: String,
}

impl From<&SendRecord> for SendRow {
    fn from(record: &SendRecord) -> Self {
        SendRow {
            timestamp_utc: record.timestamp.to_rfc3339(),
            recipient: record.recipient.clone(),
            subject: record.subject.clone(),
            sender: record.sender.clone(),
            message_id: record.message_id.clone(),
            template_version: record.template_version.clone(),
        }
    }
}

impl CsvSendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSendLog { path: path.into() }
    }
}

impl SendLog for CsvSendLog {
    fn records(&self) -> Result<Vec<SendRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("Failed to open send log {:?}", self.path))?;

        let mut records = Vec::new();
        for (i, row) in reader.deserialize::<SendRow>().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    debug!("Skipping send log row {}: {}", i + 1, e);
                    continue;
                }
            };
            let Some(timestamp) = parse_timestamp(&row.timestamp_utc) else {
                debug!("Skipping send log row {}: bad timestamp {:?}", i + 1, row.timestamp_utc);
                continue;
            };
            records.push(SendRecord {
                timestamp,
                recipient: row.recipient,
                subject: row.subject,
                sender: row.sender,
                message_id: row.message_id,
                template_version: row.template_version,
            });
        }
        Ok(records)
    }

    fn append(&mut self, record: &SendRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        // An empty file still needs its header.
        let is_new = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open send log {:?}", self.path))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer.serialize(SendRow::from(record))?;
        writer.flush()?;
        Ok(())
    }
}
