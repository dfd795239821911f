//! UpdateSection command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{ParentKey, SectionId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Rename a section
#[operation(verb = "update", noun = "section", description = "Rename a section")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateSection {
    pub user: UserId,
    pub id: SectionId,
    pub title: String,
}

impl UpdateSection {
    pub fn new(user: impl Into<UserId>, id: impl Into<SectionId>, title: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
            title: title.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Section(self.id.clone()))?;
        let section = ctx.ledger().update_section(&self.id, &self.title)?;
        Ok(serde_json::to_value(&section)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for UpdateSection {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}
