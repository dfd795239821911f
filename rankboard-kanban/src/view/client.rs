//! Transport seam between the view state and the reconciler

use super::{Dispatch, OptimisticView, SettleStatus, Ticket};
use crate::context::KanbanContext;
use crate::error::Result;
use crate::reconcile::{reconcile_move, MoveOutcome, MoveRequest};
use crate::types::UserId;
use async_trait::async_trait;

/// Something that can carry a move request to a reconciler
#[async_trait]
pub trait MoveClient: Send + Sync {
    async fn submit(&self, request: &MoveRequest) -> Result<MoveOutcome>;
}

/// In-process client that reconciles directly against a context
#[derive(Debug, Clone)]
pub struct LocalMoveClient {
    ctx: KanbanContext,
    user: UserId,
}

impl LocalMoveClient {
    pub fn new(ctx: KanbanContext, user: UserId) -> Self {
        Self { ctx, user }
    }
}

#[async_trait]
impl MoveClient for LocalMoveClient {
    async fn submit(&self, request: &MoveRequest) -> Result<MoveOutcome> {
        reconcile_move(&self.ctx, &self.user, request).await
    }
}

/// Run one gesture through the view and client
///
/// Begins the move, sends it if its parents are free, and keeps sending whatever the settled
/// calls release. Returns the status of every call settled along the way, in order.
pub async fn drive<C>(
    view: &mut OptimisticView,
    client: &C,
    request: MoveRequest,
) -> Result<Vec<(Ticket, SettleStatus)>>
where
    C: MoveClient + ?Sized,
{
    let mut queue = match view.begin(request)? {
        Dispatch::Send(ticket, request) => vec![(ticket, request)],
        Dispatch::Queued(_) => Vec::new(),
    };

    let mut settled = Vec::new();
    while let Some((ticket, request)) = queue.pop() {
        let response = client.submit(&request).await;
        let settlement = view.settle(ticket, response);
        settled.push((ticket, settlement.status));
        queue.extend(settlement.ready.into_iter().rev());
    }
    Ok(settled)
}
