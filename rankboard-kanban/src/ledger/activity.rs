//! Activity log storage

use super::Ledger;
use crate::error::Result;
use chrono::{DateTime, Utc};
use rankboard_operations::LogEntry;
use rusqlite::params;

impl Ledger {
    /// Append an entry to the activity log
    pub fn append_activity(&self, entry: &LogEntry) -> Result<()> {
        self.conn().execute(
            "INSERT INTO activity (id, timestamp, op, input, output, actor, duration_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                entry.id,
                entry.timestamp,
                entry.op,
                serde_json::to_string(&entry.input)?,
                serde_json::to_string(&entry.output)?,
                entry.actor,
                i64::try_from(entry.duration_ms).unwrap_or(i64::MAX)
            ],
        )?;
        Ok(())
    }

    /// Read activity entries, newest first
    pub fn read_activity(&self, limit: Option<usize>) -> Result<Vec<LogEntry>> {
        let conn = self.conn();
        let limit = limit
            .and_then(|l| i64::try_from(l).ok())
            .unwrap_or(-1);
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, op, input, output, actor, duration_ms
             FROM activity ORDER BY seq DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map([limit], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, DateTime<Utc>>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, timestamp, op, input, output, actor, duration_ms)| {
                Ok(LogEntry {
                    id,
                    timestamp,
                    op,
                    input: serde_json::from_str(&input)?,
                    output: serde_json::from_str(&output)?,
                    actor,
                    duration_ms: u64::try_from(duration_ms).unwrap_or_default(),
                })
            })
            .collect()
    }
}
