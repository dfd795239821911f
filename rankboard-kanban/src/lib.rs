//! Kanban board engine with a dense per-parent position ledger
//!
//! Boards belong to users, sections to boards, tasks to sections. Within every parent the
//! children's positions are always exactly `0..n`, so "sort by position" is the whole story for
//! readers. All of that lives in a SQLite database behind [`ledger::Ledger`].
//!
//! ## Moving things
//!
//! A drag on the client becomes a [`MoveRequest`]: the moved id, the parent it came from, the
//! parent it goes to and the index it lands at. [`reconcile_move`] re-reads both parents,
//! plans the new lists with [`planner::plan_move`] and commits them in one transaction guarded
//! by per-parent version stamps. The client keeps an [`OptimisticView`] that shows the move
//! before the server has answered and rolls it back if the answer is an error.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use rankboard_kanban::{
//!     board::AddBoard, section::AddSection, task::{AddTask, MoveTask},
//!     KanbanContext, KanbanOperationProcessor, OperationProcessor,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = KanbanContext::open("rankboard.db")?;
//! let user = ctx.ledger().create_user("alice_smith", "<argon2 hash>")?.id;
//! let processor = KanbanOperationProcessor::with_actor(user.as_str());
//!
//! let board = processor.process(&AddBoard::new(user.clone()), &ctx).await?;
//! let board_id = board["id"].as_str().unwrap_or_default();
//! let todo = processor.process(&AddSection::new(user.clone(), board_id), &ctx).await?;
//! let done = processor.process(&AddSection::new(user.clone(), board_id), &ctx).await?;
//! let todo_id = todo["id"].as_str().unwrap_or_default();
//! let done_id = done["id"].as_str().unwrap_or_default();
//!
//! let task = processor.process(&AddTask::new(user.clone(), todo_id), &ctx).await?;
//! let task_id = task["id"].as_str().unwrap_or_default();
//! processor
//!     .process(&MoveTask::between(user, task_id, todo_id, done_id, 0), &ctx)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod context;
pub mod debounce;
mod error;
pub mod ledger;
pub mod planner;
mod processor;
mod reconcile;
pub mod types;
pub mod view;

// Command modules
pub mod board;
pub mod section;
pub mod task;
pub mod user;

// Re-export Execute trait and types from operations crate
pub use rankboard_operations::{
    async_trait, Execute, ExecutionResult, LogEntry, Operation, OperationProcessor,
};

pub use context::{KanbanContext, KanbanSettings};
pub use debounce::{DelayedWriter, TaskContentSink, WriteSink};
pub use error::{ErrorKind, KanbanError, Result};
pub use processor::KanbanOperationProcessor;
pub use reconcile::{reconcile_move, MoveOutcome, MoveRequest};
pub use view::{
    drive, Dispatch, LocalMoveClient, MoveClient, OptimisticView, SettleStatus, Settlement, Ticket,
};

// Re-export commonly used types
pub use types::{
    Board, BoardDetail, BoardId, ChildKind, ParentKey, Section, SectionId, SectionWithTasks,
    Session, Task, TaskId, User, UserId,
};
