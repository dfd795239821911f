//! DeleteBoard command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::types::{BoardId, ParentKey, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;

/// Delete a board with everything on it
#[operation(verb = "delete", noun = "board", description = "Delete a board and its sections and tasks")]
#[derive(Debug, Deserialize, Serialize)]
pub struct DeleteBoard {
    pub user: UserId,
    pub id: BoardId,
}

impl DeleteBoard {
    pub fn new(user: impl Into<UserId>, id: impl Into<BoardId>) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Board(self.id.clone()))?;
        let board = ctx.ledger().delete_board(&self.id)?;
        Ok(json!({ "deleted": true, "id": board.id }))
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for DeleteBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_board_renumbers() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let a = ctx.ledger().create_board(&user, "a", None).unwrap();
        let b = ctx.ledger().create_board(&user, "b", None).unwrap();

        DeleteBoard::new(user.clone(), a.id.clone())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let boards = ctx.ledger().list_boards(&user).unwrap();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].id, b.id);
        assert_eq!(boards[0].position, 0);

        let again = DeleteBoard::new(user, a.id).execute(&ctx).await.into_result();
        assert!(matches!(again, Err(KanbanError::NotFound { .. })));
    }
}
