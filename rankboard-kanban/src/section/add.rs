//! AddSection command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{BoardId, ParentKey, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Add a section at the end of a board
#[operation(verb = "add", noun = "section", description = "Create a new section on a board")]
#[derive(Debug, Deserialize, Serialize)]
pub struct AddSection {
    pub user: UserId,
    pub board: BoardId,
    #[serde(default)]
    pub title: String,
}

impl AddSection {
    pub fn new(user: impl Into<UserId>, board: impl Into<BoardId>) -> Self {
        Self {
            user: user.into(),
            board: board.into(),
            title: String::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Board(self.board.clone()))?;
        let section = ctx.ledger().create_section(&self.board, &self.title)?;
        Ok(serde_json::to_value(&section)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for AddSection {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_add_section() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let board = ctx.ledger().create_board(&user, "B", None).unwrap();

        let first = AddSection::new(user.clone(), board.id.clone())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(first["title"], "");
        assert_eq!(first["position"], 0);

        let second = AddSection::new(user, board.id)
            .with_title("Doing")
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(second["position"], 1);
    }
}
