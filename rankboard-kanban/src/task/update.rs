//! UpdateTask command

use super::owned_task;
use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{TaskId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Update a task's title or content
///
/// Position and section are not fields here; they only change through `MoveTask`.
#[operation(verb = "update", noun = "task", description = "Update a task's title or content")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateTask {
    pub user: UserId,
    pub id: TaskId,
    pub title: Option<String>,
    pub content: Option<String>,
}

impl UpdateTask {
    pub fn new(user: impl Into<UserId>, id: impl Into<TaskId>) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
            title: None,
            content: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        owned_task(ctx, &self.user, &self.id)?;
        let task = ctx.ledger().update_task(
            &self.id,
            self.title.as_deref(),
            self.content.as_deref(),
        )?;
        Ok(serde_json::to_value(&task)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for UpdateTask {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}
