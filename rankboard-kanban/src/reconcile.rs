//! Move reconciliation
//!
//! Turns "move this item there" into committed position writes. The client's view of the lists
//! is never trusted: every attempt re-reads the parents from the ledger, plans against what it
//! read and writes guarded by the versions it read. If another writer got in between, the
//! attempt is thrown away and the whole read-plan-apply cycle runs again, up to the configured
//! number of attempts.

use crate::context::KanbanContext;
use crate::error::{KanbanError, Result};
use crate::ledger::{Ledger, PositionWrite};
use crate::planner::plan_move;
use crate::types::{ParentKey, UserId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay before the first retry; doubles on each further attempt
const RETRY_BACKOFF_BASE: Duration = Duration::from_millis(10);

/// A drag-initiated move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub moved_id: String,
    pub source: ParentKey,
    pub destination: ParentKey,
    /// Signed so that negative input from the wire is rejected rather than wrapped
    pub destination_index: i64,
}

impl MoveRequest {
    /// Reorder inside one list
    pub fn within(parent: ParentKey, moved_id: impl Into<String>, index: i64) -> Self {
        Self {
            moved_id: moved_id.into(),
            source: parent.clone(),
            destination: parent,
            destination_index: index,
        }
    }

    /// Relocate into another list
    pub fn between(
        source: ParentKey,
        destination: ParentKey,
        moved_id: impl Into<String>,
        index: i64,
    ) -> Self {
        Self {
            moved_id: moved_id.into(),
            source,
            destination,
            destination_index: index,
        }
    }

    pub fn is_single_list(&self) -> bool {
        self.source == self.destination
    }

    /// Both parents the move touches, source first, without duplicates
    pub fn parents(&self) -> Vec<&ParentKey> {
        if self.is_single_list() {
            vec![&self.source]
        } else {
            vec![&self.source, &self.destination]
        }
    }

    /// Reject shapes no ledger state could make valid
    pub fn validate(&self) -> Result<usize> {
        let index = usize::try_from(self.destination_index).map_err(|_| {
            KanbanError::invalid_value("destinationIndex", "must not be negative")
        })?;

        let kind = self.source.child_kind();
        let same_kind = kind == self.destination.child_kind();
        if !same_kind || (!self.is_single_list() && !kind.moves_across_parents()) {
            return Err(KanbanError::MismatchedParents {
                source_parent: self.source.to_string(),
                destination: self.destination.to_string(),
            });
        }
        if self.moved_id.is_empty() {
            return Err(KanbanError::missing_field("movedId"));
        }
        Ok(index)
    }
}

/// The committed lists after a move
///
/// For a single-list move both sides carry the same parent and list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutcome {
    pub source: ParentKey,
    pub source_ordered: Vec<String>,
    pub destination: ParentKey,
    pub destination_ordered: Vec<String>,
}

impl MoveOutcome {
    /// The confirmed list for `parent`, if the outcome covers it
    pub fn ordered_for(&self, parent: &ParentKey) -> Option<&[String]> {
        if parent == &self.destination {
            Some(self.destination_ordered.as_slice())
        } else if parent == &self.source {
            Some(self.source_ordered.as_slice())
        } else {
            None
        }
    }
}

/// Reconcile a move on behalf of `user`
///
/// Errors:
/// - `InvalidValue` / `MismatchedParents` for malformed requests
/// - `NotFound` if either parent is missing or not owned by `user`
/// - `StaleSource` if the moved item is no longer under the declared source
/// - storage failures once the retry budget is spent
pub async fn reconcile_move(
    ctx: &KanbanContext,
    user: &UserId,
    request: &MoveRequest,
) -> Result<MoveOutcome> {
    let index = request.validate()?;
    for parent in request.parents() {
        ctx.ensure_owned(user, parent)?;
    }

    let attempts = ctx.settings().move_retry_attempts.max(1);
    let mut attempt = 1;
    loop {
        let attempt_request = request.clone();
        let result = ctx
            .with_ledger(move |ledger| attempt_move(ledger, &attempt_request, index))
            .await;
        match result {
            Ok(outcome) => {
                info!(
                    moved = %request.moved_id,
                    source = %request.source,
                    destination = %request.destination,
                    index,
                    attempt,
                    "move committed"
                );
                return Ok(outcome);
            }
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(
                    moved = %request.moved_id,
                    attempt,
                    error = %e,
                    "move lost a race, retrying"
                );
                tokio::time::sleep(RETRY_BACKOFF_BASE * 2u32.pow(attempt - 1)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// One read-plan-apply cycle
fn attempt_move(ledger: &Ledger, request: &MoveRequest, index: usize) -> Result<MoveOutcome> {
    let source = ledger.snapshot(&request.source)?;
    if !source.children.contains(&request.moved_id) {
        return already_applied(ledger, request, index, source.children);
    }

    if request.is_single_list() {
        let plan = plan_move(&source.children, None, &request.moved_id, index);
        if plan.source == source.children {
            debug!(moved = %request.moved_id, "already in place");
        } else {
            let write = PositionWrite::against(&source).rank(&request.source, plan.source.clone());
            ledger.apply_positions(&write)?;
        }
        return Ok(MoveOutcome {
            source: request.source.clone(),
            source_ordered: plan.source.clone(),
            destination: request.destination.clone(),
            destination_ordered: plan.source,
        });
    }

    let destination = ledger.snapshot(&request.destination)?;
    let plan = plan_move(
        &source.children,
        Some(destination.children.as_slice()),
        &request.moved_id,
        index,
    );
    let destination_ordered = plan.destination_list().to_vec();

    let write = PositionWrite::against(&source)
        .and_against(&destination)
        .rank(&request.source, plan.source.clone())
        .rank(&request.destination, destination_ordered.clone());
    ledger.apply_positions(&write)?;

    Ok(MoveOutcome {
        source: request.source.clone(),
        source_ordered: plan.source,
        destination: request.destination.clone(),
        destination_ordered,
    })
}

/// Accept a repeated cross-list move whose result is already committed
///
/// The moved item must sit in the destination at the rank the request asks for (clamped to the
/// end of the list). Anything else is a stale source.
fn already_applied(
    ledger: &Ledger,
    request: &MoveRequest,
    index: usize,
    source_ordered: Vec<String>,
) -> Result<MoveOutcome> {
    let stale = || KanbanError::StaleSource {
        id: request.moved_id.clone(),
        parent: request.source.to_string(),
    };
    if request.is_single_list() {
        return Err(stale());
    }

    let destination = ledger.snapshot(&request.destination)?;
    let last = destination.children.len().saturating_sub(1);
    if destination.children.get(index.min(last)) != Some(&request.moved_id) {
        return Err(stale());
    }

    debug!(moved = %request.moved_id, "cross-list move already applied");
    Ok(MoveOutcome {
        source: request.source.clone(),
        source_ordered,
        destination: request.destination.clone(),
        destination_ordered: destination.children,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoardId, SectionId};

    struct Fixture {
        ctx: KanbanContext,
        user: UserId,
        board: BoardId,
        s1: SectionId,
        s2: SectionId,
    }

    fn fixture() -> Fixture {
        let ctx = KanbanContext::in_memory().unwrap();
        let user = ctx.ledger().create_user("alice", "h").unwrap().id;
        let board = ctx.ledger().create_board(&user, "B", None).unwrap().id;
        let s1 = ctx.ledger().create_section(&board, "one").unwrap().id;
        let s2 = ctx.ledger().create_section(&board, "two").unwrap().id;
        Fixture {
            ctx,
            user,
            board,
            s1,
            s2,
        }
    }

    fn add_tasks(f: &Fixture, section: &SectionId, titles: &[&str]) -> Vec<String> {
        titles
            .iter()
            .map(|t| {
                f.ctx
                    .ledger()
                    .create_task(section, t, None)
                    .unwrap()
                    .id
                    .into_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_within_list_move() {
        let f = fixture();
        let ids = add_tasks(&f, &f.s1, &["A", "B", "C", "D"]);
        let key = ParentKey::Section(f.s1.clone());

        let req = MoveRequest::within(key.clone(), ids[2].clone(), 0);
        let outcome = reconcile_move(&f.ctx, &f.user, &req).await.unwrap();

        let expected = vec![ids[2].clone(), ids[0].clone(), ids[1].clone(), ids[3].clone()];
        assert_eq!(outcome.source_ordered, expected);
        assert_eq!(outcome.destination_ordered, expected);
        assert_eq!(f.ctx.ledger().snapshot(&key).unwrap().children, expected);
    }

    #[tokio::test]
    async fn test_cross_list_move() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A", "B"]);
        let x = add_tasks(&f, &f.s2, &["X", "Y"]);
        let k1 = ParentKey::Section(f.s1.clone());
        let k2 = ParentKey::Section(f.s2.clone());

        let req = MoveRequest::between(k1.clone(), k2.clone(), a[0].clone(), 1);
        let outcome = reconcile_move(&f.ctx, &f.user, &req).await.unwrap();

        assert_eq!(outcome.source_ordered, vec![a[1].clone()]);
        assert_eq!(
            outcome.destination_ordered,
            vec![x[0].clone(), a[0].clone(), x[1].clone()]
        );
        let moved = f
            .ctx
            .ledger()
            .get_task(&a[0].as_str().into())
            .unwrap();
        assert_eq!(moved.section, f.s2);
        assert_eq!(moved.position, 1);
        f.ctx.ledger().check_dense(&k1).unwrap();
        f.ctx.ledger().check_dense(&k2).unwrap();
    }

    #[tokio::test]
    async fn test_repeat_move_is_noop() {
        let f = fixture();
        let ids = add_tasks(&f, &f.s1, &["A", "B", "C"]);
        let key = ParentKey::Section(f.s1.clone());
        let req = MoveRequest::within(key.clone(), ids[0].clone(), 2);

        let first = reconcile_move(&f.ctx, &f.user, &req).await.unwrap();
        let version = f.ctx.ledger().version(&key).unwrap();
        let second = reconcile_move(&f.ctx, &f.user, &req).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(f.ctx.ledger().version(&key).unwrap(), version);
    }

    #[tokio::test]
    async fn test_repeat_cross_list_move_is_noop() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A", "B"]);
        add_tasks(&f, &f.s2, &["X", "Y"]);
        let k1 = ParentKey::Section(f.s1.clone());
        let k2 = ParentKey::Section(f.s2.clone());

        for index in [1, 99] {
            let req = MoveRequest::between(k1.clone(), k2.clone(), a[0].clone(), index);
            let first = reconcile_move(&f.ctx, &f.user, &req).await.unwrap();
            let versions = (
                f.ctx.ledger().version(&k1).unwrap(),
                f.ctx.ledger().version(&k2).unwrap(),
            );

            let second = reconcile_move(&f.ctx, &f.user, &req).await.unwrap();
            assert_eq!(first, second);
            assert_eq!(
                (
                    f.ctx.ledger().version(&k1).unwrap(),
                    f.ctx.ledger().version(&k2).unwrap(),
                ),
                versions
            );

            // Put it back for the next index
            let back = MoveRequest::between(k2.clone(), k1.clone(), a[0].clone(), 0);
            reconcile_move(&f.ctx, &f.user, &back).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_repeat_cross_list_move_elsewhere_is_conflict() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A"]);
        add_tasks(&f, &f.s2, &["X", "Y"]);
        let k1 = ParentKey::Section(f.s1.clone());
        let k2 = ParentKey::Section(f.s2.clone());

        let req = MoveRequest::between(k1.clone(), k2.clone(), a[0].clone(), 0);
        reconcile_move(&f.ctx, &f.user, &req).await.unwrap();

        let different_rank = MoveRequest::between(k1.clone(), k2.clone(), a[0].clone(), 2);
        let err = reconcile_move(&f.ctx, &f.user, &different_rank)
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::StaleSource { .. }));

        f.ctx.ledger().delete_task(&a[0].as_str().into()).unwrap();
        let err = reconcile_move(&f.ctx, &f.user, &req).await.unwrap_err();
        assert!(matches!(err, KanbanError::StaleSource { .. }));
    }

    #[tokio::test]
    async fn test_stale_source_is_conflict() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A", "B"]);
        let k1 = ParentKey::Section(f.s1.clone());
        let k2 = ParentKey::Section(f.s2.clone());

        let req = MoveRequest::between(k2, k1, a[0].clone(), 1);
        let err = reconcile_move(&f.ctx, &f.user, &req).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_missing_parent_is_not_found() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A"]);
        let req = MoveRequest::between(
            ParentKey::Section(f.s1.clone()),
            ParentKey::Section("gone".into()),
            a[0].clone(),
            0,
        );
        let err = reconcile_move(&f.ctx, &f.user, &req).await.unwrap_err();
        assert!(matches!(err, KanbanError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_foreign_parent_is_not_found() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A", "B"]);
        let mallory = f.ctx.ledger().create_user("mallory", "h").unwrap().id;

        let req = MoveRequest::within(ParentKey::Section(f.s1.clone()), a[0].clone(), 1);
        let err = reconcile_move(&f.ctx, &mallory, &req).await.unwrap_err();
        assert!(matches!(err, KanbanError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_validation() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A"]);

        let negative = MoveRequest::within(ParentKey::Section(f.s1.clone()), a[0].clone(), -1);
        let err = reconcile_move(&f.ctx, &f.user, &negative).await.unwrap_err();
        assert!(matches!(err, KanbanError::InvalidValue { .. }));

        let mixed = MoveRequest::between(
            ParentKey::Section(f.s1.clone()),
            ParentKey::Board(f.board.clone()),
            a[0].clone(),
            0,
        );
        let err = reconcile_move(&f.ctx, &f.user, &mixed).await.unwrap_err();
        assert!(matches!(err, KanbanError::MismatchedParents { .. }));

        let other = f.ctx.ledger().create_board(&f.user, "C", None).unwrap();
        let sections_across_boards = MoveRequest::between(
            ParentKey::Board(f.board.clone()),
            ParentKey::Board(other.id),
            f.s1.as_str(),
            0,
        );
        let err = reconcile_move(&f.ctx, &f.user, &sections_across_boards)
            .await
            .unwrap_err();
        assert!(matches!(err, KanbanError::MismatchedParents { .. }));
    }

    #[tokio::test]
    async fn test_index_past_end_appends() {
        let f = fixture();
        let a = add_tasks(&f, &f.s1, &["A"]);
        let x = add_tasks(&f, &f.s2, &["X", "Y"]);
        let req = MoveRequest::between(
            ParentKey::Section(f.s1.clone()),
            ParentKey::Section(f.s2.clone()),
            a[0].clone(),
            99,
        );
        let outcome = reconcile_move(&f.ctx, &f.user, &req).await.unwrap();
        assert!(outcome.source_ordered.is_empty());
        assert_eq!(
            outcome.destination_ordered,
            vec![x[0].clone(), x[1].clone(), a[0].clone()]
        );
    }
}
