//! Parent keys: the ordered collections positions are scoped to

use super::ids::{BoardId, SectionId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of entity lives in an ordered collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    Board,
    Favourite,
    Section,
    Task,
}

impl ChildKind {
    /// Whether items of this kind can be relocated into a different parent
    ///
    /// Only tasks travel between parents; boards, favourites and sections are
    /// reordered inside their single owning list.
    pub fn moves_across_parents(self) -> bool {
        matches!(self, Self::Task)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Board => "board",
            Self::Favourite => "favourite",
            Self::Section => "section",
            Self::Task => "task",
        }
    }
}

/// Identifies an ordered collection of children
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentKey {
    /// A user's boards
    User(UserId),
    /// A user's favourite boards
    Favourites(UserId),
    /// A board's sections
    Board(BoardId),
    /// A section's tasks
    Section(SectionId),
}

impl ParentKey {
    /// The kind of children this collection holds
    pub fn child_kind(&self) -> ChildKind {
        match self {
            Self::User(_) => ChildKind::Board,
            Self::Favourites(_) => ChildKind::Favourite,
            Self::Board(_) => ChildKind::Section,
            Self::Section(_) => ChildKind::Task,
        }
    }

    /// The raw id of the owning entity
    pub fn id(&self) -> &str {
        match self {
            Self::User(id) | Self::Favourites(id) => id.as_str(),
            Self::Board(id) => id.as_str(),
            Self::Section(id) => id.as_str(),
        }
    }

    /// Name of the owning entity, as used in not-found errors
    pub fn resource(&self) -> &'static str {
        match self {
            Self::User(_) | Self::Favourites(_) => "user",
            Self::Board(_) => "board",
            Self::Section(_) => "section",
        }
    }

    /// Stable string form, used as the version-stamp key in storage
    pub fn storage_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{}", id),
            Self::Favourites(id) => write!(f, "favourites:{}", id),
            Self::Board(id) => write!(f, "board:{}", id),
            Self::Section(id) => write!(f, "section:{}", id),
        }
    }
}

impl From<BoardId> for ParentKey {
    fn from(id: BoardId) -> Self {
        Self::Board(id)
    }
}

impl From<SectionId> for ParentKey {
    fn from(id: SectionId) -> Self {
        Self::Section(id)
    }
}
