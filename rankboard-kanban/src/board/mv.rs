//! MoveBoard and MoveFavourite commands

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::reconcile::{reconcile_move, MoveRequest};
use crate::types::{BoardId, ParentKey, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Reorder a board among the user's boards
#[operation(verb = "move", noun = "board", description = "Move a board to another position")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveBoard {
    pub user: UserId,
    pub id: BoardId,
    pub destination_index: i64,
}

impl MoveBoard {
    pub fn new(user: impl Into<UserId>, id: impl Into<BoardId>, destination_index: i64) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
            destination_index,
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let request = MoveRequest::within(
            ParentKey::User(self.user.clone()),
            self.id.as_str(),
            self.destination_index,
        );
        let outcome = reconcile_move(ctx, &self.user, &request).await?;
        Ok(serde_json::to_value(&outcome)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for MoveBoard {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

/// Reorder a board among the user's favourites
#[operation(verb = "move", noun = "favourite", description = "Move a favourite board to another position")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveFavourite {
    pub user: UserId,
    pub id: BoardId,
    pub destination_index: i64,
}

impl MoveFavourite {
    pub fn new(user: impl Into<UserId>, id: impl Into<BoardId>, destination_index: i64) -> Self {
        Self {
            user: user.into(),
            id: id.into(),
            destination_index,
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let request = MoveRequest::within(
            ParentKey::Favourites(self.user.clone()),
            self.id.as_str(),
            self.destination_index,
        );
        let outcome = reconcile_move(ctx, &self.user, &request).await?;
        Ok(serde_json::to_value(&outcome)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for MoveFavourite {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(boards: &[crate::types::Board]) -> Vec<&str> {
        boards.iter().map(|b| b.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_move_board() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|t| ctx.ledger().create_board(&user, t, None).unwrap().id)
            .collect();

        let result = MoveBoard::new(user.clone(), ids[2].clone(), 0)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();
        assert_eq!(result["sourceOrdered"][0], ids[2].as_str());

        let boards = ctx.ledger().list_boards(&user).unwrap();
        assert_eq!(titles(&boards), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_move_favourite_leaves_board_order_alone() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let ids: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|t| {
                let board = ctx.ledger().create_board(&user, t, None).unwrap();
                ctx.ledger().set_favourite(&board.id, true).unwrap();
                board.id
            })
            .collect();

        MoveFavourite::new(user.clone(), ids[0].clone(), 2)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let favourites = ctx.ledger().list_favourites(&user).unwrap();
        assert_eq!(titles(&favourites), vec!["b", "c", "a"]);
        let boards = ctx.ledger().list_boards(&user).unwrap();
        assert_eq!(titles(&boards), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_move_non_favourite_is_conflict() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let board = ctx.ledger().create_board(&user, "a", None).unwrap();

        let err = MoveFavourite::new(user, board.id, 0)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, KanbanError::StaleSource { .. }));
    }
}
