//! DeleteSection command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{ParentKey, SectionId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Delete a section and its tasks
#[operation(verb = "delete", noun = "section", description = "Delete a section and its tasks")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteSection {
    pub user: UserId,
    pub id: SectionId,
}

impl DeleteSection {
    pub fn new(user: impl Into<UserId>, id: impl Into<SectionId>) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Section(self.id.clone()))?;
        let section = ctx.ledger().delete_section(&self.id)?;
        Ok(json!({ "deleted": true, "id": section.id }))
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for DeleteSection {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}
