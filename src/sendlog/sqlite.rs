use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use tracing::debug;

use super::{parse_timestamp, SendLog, SendRecord};

/// Send history kept in a single SQLite table.
pub struct SqliteSendLog {
    conn: Connection,
}

impl SqliteSendLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open send log {:?}", path))?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let log = SqliteSendLog { conn };
        log.init_schema()?;
        Ok(log)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS send_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp_utc TEXT NOT NULL,
                recipient TEXT NOT NULL,
                subject TEXT NOT NULL,
                sender TEXT NOT NULL,
                message_id TEXT NOT NULL,
                template_version TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_send_log_recipient ON send_log(recipient);
            ",
        )?;
        Ok(())
    }
}

impl SendLog for SqliteSendLog {
    fn records(&self) -> Result<Vec<SendRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT timestamp_utc, recipient, subject, sender, message_id, template_version
             FROM send_log ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(ts, recipient, subject, sender, message_id, template_version)| {
                let Some(timestamp) = parse_timestamp(&ts) else {
                    debug!("Skipping send log row with bad timestamp {:?}", ts);
                    return None;
                };
                Some(SendRecord {
                    timestamp,
                    recipient,
                    subject,
                    sender,
                    message_id,
                    template_version,
                })
            })
            .collect())
    }

    fn append(&mut self, record: &SendRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO send_log
             (timestamp_utc, recipient, subject, sender, message_id, template_version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.timestamp.to_rfc3339(),
                record.recipient,
                record.subject,
                record.sender,
                record.message_id,
                record.template_version,
            ],
        )?;
        Ok(())
    }
}
