//! DeleteTask command

use super::owned_task;
use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{TaskId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Delete a task and close the gap it leaves
#[operation(verb = "delete", noun = "task", description = "Delete a task")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteTask {
    pub user: UserId,
    pub id: TaskId,
}

impl DeleteTask {
    pub fn new(user: impl Into<UserId>, id: impl Into<TaskId>) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        owned_task(ctx, &self.user, &self.id)?;
        let task = ctx.ledger().delete_task(&self.id)?;
        Ok(json!({ "deleted": true, "id": task.id, "section": task.section }))
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for DeleteTask {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}
