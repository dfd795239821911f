//! UpdateBoard command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{BoardId, ParentKey, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Update a board's title, description or favourite flag
#[operation(verb = "update", noun = "board", description = "Update a board's fields")]
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateBoard {
    pub user: UserId,
    pub id: BoardId,
    pub title: Option<String>,
    /// An empty string clears the description
    pub description: Option<String>,
    pub favourite: Option<bool>,
}

impl UpdateBoard {
    pub fn new(user: impl Into<UserId>, id: impl Into<BoardId>) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
            title: None,
            description: None,
            favourite: None,
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

    pub fn with_favourite(mut self, favourite: bool) -> Self {
        self.favourite = Some(favourite);
        self
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Board(self.id.clone()))?;

        let mut board = if self.title.is_some() || self.description.is_some() {
            ctx.ledger().update_board(
                &self.id,
                self.title.as_deref(),
                self.description.as_deref(),
            )?
        } else {
            ctx.ledger().get_board(&self.id)?
        };
        if let Some(favourite) = self.favourite {
            board = ctx.ledger().set_favourite(&self.id, favourite)?;
        }
        Ok(serde_json::to_value(&board)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for UpdateBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_board() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let board = ctx.ledger().create_board(&user, "old", None).unwrap();

        let result = UpdateBoard::new(user.clone(), board.id.clone())
            .with_title("new")
            .with_favourite(true)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["title"], "new");
        assert_eq!(result["favourite"], true);
        assert_eq!(result["favouritePosition"], 0);

        let result = UpdateBoard::new(user, board.id)
            .with_favourite(false)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["favourite"], false);
        assert!(result.get("favouritePosition").is_none());
    }
}
