//! Activity log entries
//!
//! A committed mutation leaves one entry behind. Reads and failed commands leave nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// What one command did, as stored in the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// ULID, so ids sort by creation time
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// `"<verb> <noun>"`, e.g. `"move task"`
    pub op: String,
    /// The command's own fields, minus anything marked `skip_serializing`
    pub input: Value,
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub duration_ms: u64,
}

impl LogEntry {
    /// Record `op`, which started at `started` and has just finished
    pub fn record(op: impl Into<String>, input: Value, output: Value, started: Instant) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            op: op.into(),
            input,
            output,
            actor: None,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Fill in the actor unless the command already named one
    pub fn attribute_to(&mut self, actor: Option<&str>) {
        if self.actor.is_none() {
            self.actor = actor.map(str::to_string);
        }
    }

    /// The verb half of `op`
    pub fn verb(&self) -> &str {
        self.op.split_once(' ').map_or(self.op.as_str(), |(verb, _)| verb)
    }

    /// The noun half of `op`, empty if there is none
    pub fn noun(&self) -> &str {
        self.op.split_once(' ').map_or("", |(_, noun)| noun)
    }
}
