//! GetBoard command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::types::{BoardId, ParentKey, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Get a board with its sections and tasks, all in order
#[operation(verb = "get", noun = "board", description = "Get a board with its sections and tasks")]
#[derive(Debug, Deserialize, Serialize)]
pub struct GetBoard {
    pub user: UserId,
    pub id: BoardId,
}

impl GetBoard {
    pub fn new(user: impl Into<UserId>, id: impl Into<BoardId>) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        ctx.ensure_owned(&self.user, &ParentKey::Board(self.id.clone()))?;
        let detail = ctx.ledger().board_detail(&self.id)?;
        Ok(serde_json::to_value(&detail)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for GetBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        ExecutionResult::unlogged(self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_board_checks_owner() {
        let ctx = KanbanContext::in_memory().unwrap();
        let alice = ctx.ledger().create_user("alice", "h").unwrap().id;
        let bob = ctx.ledger().create_user("bob", "h").unwrap().id;
        let board = ctx.ledger().create_board(&alice, "B", None).unwrap();
        let section = ctx.ledger().create_section(&board.id, "S").unwrap();
        ctx.ledger().create_task(&section.id, "T", None).unwrap();

        let detail = GetBoard::new(alice, board.id.clone())
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(detail["sections"][0]["title"], "S");
        assert_eq!(detail["sections"][0]["tasks"][0]["title"], "T");

        let foreign = GetBoard::new(bob, board.id).execute(&ctx).await.into_result();
        assert!(matches!(foreign, Err(KanbanError::NotFound { .. })));
    }
}
