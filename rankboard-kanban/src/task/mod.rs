//! Task commands

mod add;
mod delete;
mod list;
mod mv;
mod update;

pub use add::AddTask;
pub use delete::DeleteTask;
pub use list::ListTasks;
pub use mv::MoveTask;
pub use update::UpdateTask;

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{ParentKey, Task, TaskId, UserId};

/// Load a task the user may touch; someone else's task is `NotFound`
fn owned_task(ctx: &KanbanContext, user: &UserId, id: &TaskId) -> Result<Task> {
    let task = ctx.ledger().get_task(id)?;
    ctx.ensure_owned(user, &ParentKey::Section(task.section.clone()))
        .map_err(|e| match e {
            KanbanError::NotFound { .. } => KanbanError::not_found("task", id.as_str()),
            other => other,
        })?;
    Ok(task)
}
