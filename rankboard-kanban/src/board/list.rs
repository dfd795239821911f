//! ListBoards and ListFavourites commands

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::UserId;
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// List the user's boards in position order
#[operation(verb = "list", noun = "boards", description = "List boards in order")]
#[derive(Debug, Deserialize, Serialize)]
pub struct ListBoards {
    pub user: UserId,
}

impl ListBoards {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self { user: user.into() }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let boards = ctx.ledger().list_boards(&self.user)?;
        Ok(serde_json::to_value(&boards)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for ListBoards {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        ExecutionResult::unlogged(self.apply(ctx).await)
    }
}

/// List the user's favourite boards in favourite order
#[operation(verb = "list", noun = "favourites", description = "List favourite boards in order")]
#[derive(Debug, Deserialize, Serialize)]
pub struct ListFavourites {
    pub user: UserId,
}

impl ListFavourites {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self { user: user.into() }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let boards = ctx.ledger().list_favourites(&self.user)?;
        Ok(serde_json::to_value(&boards)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for ListFavourites {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        ExecutionResult::unlogged(self.apply(ctx).await)
    }
}
