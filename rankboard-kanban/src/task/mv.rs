//! MoveTask command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::reconcile::{reconcile_move, MoveRequest};
use crate::types::{ParentKey, SectionId, TaskId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Move a task within its section or into another one
#[operation(verb = "move", noun = "task", description = "Move a task to another position or section")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTask {
    pub user: UserId,
    pub id: TaskId,
    /// The section the client believes holds the task
    pub source: SectionId,
    pub destination: SectionId,
    pub destination_index: i64,
}

impl MoveTask {
    /// Reorder inside one section
    pub fn within(
        user: impl Into<UserId>,
        id: impl Into<TaskId>,
        section: impl Into<SectionId>,
        destination_index: i64,
    ) -> Self {
        let section = section.into();
        Self {
            user: user.into(),
            id: id.into(),
            source: section.clone(),
            destination: section,
            destination_index,
        }
    }

    /// Move into another section
    pub fn between(
        user: impl Into<UserId>,
        id: impl Into<TaskId>,
        source: impl Into<SectionId>,
        destination: impl Into<SectionId>,
        destination_index: i64,
    ) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
            source: source.into(),
            destination: destination.into(),
            destination_index,
        }
    }

    pub fn request(&self) -> MoveRequest {
        MoveRequest::between(
            ParentKey::Section(self.source.clone()),
            ParentKey::Section(self.destination.clone()),
            self.id.as_str(),
            self.destination_index,
        )
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let outcome = reconcile_move(ctx, &self.user, &self.request()).await?;
        Ok(serde_json::to_value(&outcome)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for MoveTask {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}
