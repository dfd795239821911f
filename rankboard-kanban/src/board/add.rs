//! AddBoard command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{UserId, DEFAULT_BOARD_TITLE};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Create a board at the end of the user's list
#[operation(verb = "add", noun = "board", description = "Create a new board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddBoard {
    pub user: UserId,
    /// Defaults to "Untitled"
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl AddBoard {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            title: None,
            description: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_BOARD_TITLE);
        let board = ctx
            .ledger()
            .create_board(&self.user, title, self.description.as_deref())?;
        Ok(serde_json::to_value(&board)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for AddBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}
