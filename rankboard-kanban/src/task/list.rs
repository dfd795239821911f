//! ListTasks command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{ParentKey, SectionId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// List a section's tasks in position order
#[operation(verb = "list", noun = "tasks", description = "List a section's tasks in order")]
#[derive(Debug, Deserialize, Serialize)]
pub struct ListTasks {
    pub user: UserId,
    pub section: SectionId,
}

impl ListTasks {
    pub fn new(user: impl Into<UserId>, section: impl Into<SectionId>) -> Self {
        Self {
            user: user.into(),
            section: section.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Section(self.section.clone()))?;
        let tasks = ctx.ledger().list_tasks(&self.section)?;
        Ok(serde_json::to_value(&tasks)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for ListTasks {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        ExecutionResult::unlogged(self.apply(ctx).await)
    }
}
