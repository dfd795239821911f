//! Board-level types: Board, Section and the assembled board view

use super::ids::{BoardId, SectionId, UserId};
use super::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to boards created without one
pub const DEFAULT_BOARD_TITLE: &str = "Untitled";

/// A kanban board, ranked among its owner's boards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub user: UserId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub position: usize,
    #[serde(default)]
    pub favourite: bool,
    /// Rank among the owner's favourites; present only while `favourite` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favourite_position: Option<usize>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A column on a board, ranked among the board's sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: SectionId,
    pub board: BoardId,
    pub title: String,
    pub position: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A section together with its ordered tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWithTasks {
    #[serde(flatten)]
    pub section: Section,
    pub tasks: Vec<Task>,
}

/// A board with every section and task, all in position order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetail {
    #[serde(flatten)]
    pub board: Board,
    pub sections: Vec<SectionWithTasks>,
}
