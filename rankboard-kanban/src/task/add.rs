//! AddTask command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{ParentKey, SectionId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Add a task at the end of a section
#[operation(verb = "add", noun = "task", description = "Create a new task in a section")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddTask {
    pub user: UserId,
    pub section: SectionId,
    #[serde(default)]
    pub title: String,
    pub content: Option<String>,
}

impl AddTask {
    pub fn new(user: impl Into<UserId>, section: impl Into<SectionId>) -> Self {
        Self {
            user: user.into(),
            section: section.into(),
            title: String::new(),
            content: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Section(self.section.clone()))?;
        let task = ctx
            .ledger()
            .create_task(&self.section, &self.title, self.content.as_deref())?;
        Ok(serde_json::to_value(&task)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for AddTask {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}
