//! Task type

use super::ids::{SectionId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card, ranked among its section's tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub section: SectionId,
    pub title: String,
    /// Rich-text body, stored as the client sent it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub position: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
