//! MoveSection command

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::processor::logged;
use crate::reconcile::{reconcile_move, MoveRequest};
use crate::types::{BoardId, ParentKey, SectionId, UserId};
use rankboard_operations::{async_trait, operation, Execute, ExecutionResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Reorder a section within its board
#[operation(verb = "move", noun = "section", description = "Move a section to another position on its board")]
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveSection {
    pub user: UserId,
    pub board: BoardId,
    pub id: SectionId,
    pub destination_index: i64,
}

impl MoveSection {
    pub fn new(
        user: impl Into<UserId>,
        board: impl Into<BoardId>,
        id: impl Into<SectionId>,
        destination_index: i64,
    ) -> Self {
        Self {
            user: user.into(),
            board: board.into(),
            id: id.into(),
            destination_index,
        }
    }

    async fn apply(&self, ctx: &KanbanContext) -> Result<Value> {
        let request = MoveRequest::within(
            ParentKey::Board(self.board.clone()),
            self.id.as_str(),
            self.destination_index,
        );
        let outcome = reconcile_move(ctx, &self.user, &request).await?;
        Ok(serde_json::to_value(&outcome)?)
    }
}

#[async_trait]
impl Execute<KanbanContext, KanbanError> for MoveSection {
    async fn execute(&self, ctx: &KanbanContext) -> ExecutionResult<Value, KanbanError> {
        let start = Instant::now();
        logged(self, start, self.apply(ctx).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_move_section() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let board = ctx.ledger().create_board(&user, "B", None).unwrap();
        let ids: Vec<_> = ["todo", "doing", "done"]
            .iter()
            .map(|t| ctx.ledger().create_section(&board.id, t).unwrap().id)
            .collect();

        MoveSection::new(user, board.id.clone(), ids[0].clone(), 1)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap();

        let titles: Vec<_> = ctx
            .ledger()
            .list_sections(&board.id)
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["doing", "todo", "done"]);
    }

    #[tokio::test]
    async fn test_move_section_of_other_board_is_conflict() {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let a = ctx.ledger().create_board(&user, "A", None).unwrap();
        let b = ctx.ledger().create_board(&user, "B", None).unwrap();
        let section = ctx.ledger().create_section(&a.id, "s").unwrap();

        let err = MoveSection::new(user, b.id, section.id, 0)
            .execute(&ctx)
            .await
            .into_result()
            .unwrap_err();
        assert!(matches!(err, KanbanError::StaleSource { .. }));
    }
}
