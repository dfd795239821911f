//! Core types for the kanban engine

mod board;
mod ids;
mod parent;
mod task;
mod user;

// Re-export all types
pub use board::{Board, BoardDetail, Section, SectionWithTasks, DEFAULT_BOARD_TITLE};
pub use ids::{BoardId, SectionId, TaskId, UserId};
pub use parent::{ChildKind, ParentKey};
pub use task::Task;
pub use user::{Session, User};
