//! Optimistic view state
//!
//! A client-side cache of ordered lists. A move is rendered the moment it is begun, using the
//! same planner the server uses, and the reconciliation call is handed back to the caller to
//! send. When the call settles the confirmed lists are replaced (success) or left alone
//! (failure), and the rendered lists are rebuilt as "confirmed lists plus every move still
//! outstanding, replayed in the order it was begun". A failed move therefore disappears from
//! the screen without disturbing moves queued behind it.
//!
//! At most one call per parent is outstanding. A move that touches a parent with a call in
//! flight is queued and released by [`OptimisticView::settle`] once that parent frees up.
//!
//! Reloading a parent bumps its generation. A response that was issued against an older
//! generation is ignored as a stale echo.
//!
//! The state machine is plain `&mut self`; it never awaits. [`MoveClient`] is the transport
//! seam, and [`drive`] runs a gesture to completion over one.

mod client;

pub use client::{drive, LocalMoveClient, MoveClient};

use crate::error::{KanbanError, Result};
use crate::planner::plan_move;
use crate::reconcile::{MoveOutcome, MoveRequest};
use crate::types::ParentKey;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use tracing::debug;

/// Handle for one begun move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the caller should do after [`OptimisticView::begin`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Send this request now and settle the ticket with the response
    Send(Ticket, MoveRequest),
    /// A parent is busy; the request comes back from `settle` when it is ready to send
    Queued(Ticket),
}

impl Dispatch {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Send(ticket, _) | Self::Queued(ticket) => *ticket,
        }
    }
}

/// How a settled call affected the view
#[derive(Debug)]
pub enum SettleStatus {
    /// The server's lists are now the confirmed state
    Confirmed,
    /// The move was dropped and the confirmed state restored
    Reverted { error: KanbanError },
    /// The response was stale or unknown and changed nothing
    Ignored,
}

/// Result of [`OptimisticView::settle`]
#[derive(Debug)]
pub struct Settlement {
    pub status: SettleStatus,
    /// Queued requests that may be sent now
    pub ready: Vec<(Ticket, MoveRequest)>,
}

#[derive(Debug, Clone)]
struct Intent {
    ticket: Ticket,
    request: MoveRequest,
    /// Generation of each parent when the request was sent; empty while queued
    generations: Vec<(ParentKey, u64)>,
}

impl Intent {
    fn touches(&self, busy: &HashSet<&ParentKey>) -> bool {
        self.request.parents().iter().any(|p| busy.contains(p))
    }
}

/// The client's cache of ordered lists
#[derive(Debug, Default)]
pub struct OptimisticView {
    confirmed: HashMap<ParentKey, Vec<String>>,
    rendered: HashMap<ParentKey, Vec<String>>,
    generations: HashMap<ParentKey, u64>,
    in_flight: BTreeMap<Ticket, Intent>,
    pending: VecDeque<Intent>,
    next_ticket: u64,
}

impl OptimisticView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a parent's list with a fresh server read
    pub fn load(&mut self, parent: ParentKey, ids: Vec<String>) {
        *self.generations.entry(parent.clone()).or_insert(0) += 1;
        self.confirmed.insert(parent, ids);
        self.rebuild();
    }

    /// The list as it should be drawn
    pub fn rendered(&self, parent: &ParentKey) -> Option<&[String]> {
        self.rendered.get(parent).map(Vec::as_slice)
    }

    /// The last list the server confirmed
    pub fn confirmed(&self, parent: &ParentKey) -> Option<&[String]> {
        self.confirmed.get(parent).map(Vec::as_slice)
    }

    /// True while a call touching `parent` is in flight or queued
    pub fn is_busy(&self, parent: &ParentKey) -> bool {
        self.in_flight
            .values()
            .chain(self.pending.iter())
            .any(|intent| intent.request.parents().contains(&parent))
    }

    /// Number of moves not yet settled
    pub fn outstanding(&self) -> usize {
        self.in_flight.len() + self.pending.len()
    }

    /// Render a move locally and decide whether it can be sent
    ///
    /// Fails without changing anything if the request is malformed, a parent was never
    /// loaded, or the moved item is not in the rendered source list.
    pub fn begin(&mut self, request: MoveRequest) -> Result<Dispatch> {
        request.validate()?;
        for parent in request.parents() {
            if !self.rendered.contains_key(parent) {
                return Err(KanbanError::not_found(parent.resource(), parent.id()));
            }
        }
        let in_source = self
            .rendered
            .get(&request.source)
            .is_some_and(|ids| ids.contains(&request.moved_id));
        if !in_source {
            return Err(KanbanError::StaleSource {
                id: request.moved_id.clone(),
                parent: request.source.to_string(),
            });
        }

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;

        let busy = request.parents().iter().any(|p| self.is_busy(p));
        let dispatch = if busy {
            debug!(%ticket, moved = %request.moved_id, "parent busy, queueing move");
            self.pending.push_back(Intent {
                ticket,
                request,
                generations: Vec::new(),
            });
            Dispatch::Queued(ticket)
        } else {
            let intent = self.stamp(ticket, request);
            let request = intent.request.clone();
            self.in_flight.insert(ticket, intent);
            Dispatch::Send(ticket, request)
        };

        self.rebuild();
        Ok(dispatch)
    }

    /// Apply the response for a sent move
    pub fn settle(&mut self, ticket: Ticket, response: Result<MoveOutcome>) -> Settlement {
        let Some(intent) = self.in_flight.remove(&ticket) else {
            return Settlement {
                status: SettleStatus::Ignored,
                ready: Vec::new(),
            };
        };

        let current = intent
            .generations
            .iter()
            .all(|(parent, generation)| self.generations.get(parent) == Some(generation));

        let status = match response {
            _ if !current => {
                debug!(%ticket, "ignoring response for a reloaded parent");
                SettleStatus::Ignored
            }
            Ok(outcome) => {
                self.confirmed
                    .insert(outcome.source.clone(), outcome.source_ordered);
                self.confirmed
                    .insert(outcome.destination.clone(), outcome.destination_ordered);
                SettleStatus::Confirmed
            }
            Err(error) => {
                debug!(%ticket, %error, "move rejected, reverting");
                SettleStatus::Reverted { error }
            }
        };

        let ready = self.release();
        self.rebuild();
        Settlement { status, ready }
    }

    fn stamp(&self, ticket: Ticket, request: MoveRequest) -> Intent {
        let generations = request
            .parents()
            .into_iter()
            .map(|p| (p.clone(), self.generations.get(p).copied().unwrap_or(0)))
            .collect();
        Intent {
            ticket,
            request,
            generations,
        }
    }

    /// Move queued intents whose parents are free into flight, oldest first
    ///
    /// An intent stays queued while an older queued intent shares a parent with it, so moves
    /// on one parent are always sent in the order they were begun.
    fn release(&mut self) -> Vec<(Ticket, MoveRequest)> {
        let mut ready = Vec::new();
        let mut still_pending = VecDeque::new();

        let mut busy: HashSet<ParentKey> = self
            .in_flight
            .values()
            .flat_map(|i| i.request.parents().into_iter().cloned())
            .collect();

        while let Some(intent) = self.pending.pop_front() {
            let blocked = {
                let busy_refs: HashSet<&ParentKey> = busy.iter().collect();
                intent.touches(&busy_refs)
            };
            busy.extend(intent.request.parents().into_iter().cloned());
            if blocked {
                still_pending.push_back(intent);
            } else {
                let intent = self.stamp(intent.ticket, intent.request);
                ready.push((intent.ticket, intent.request.clone()));
                self.in_flight.insert(intent.ticket, intent);
            }
        }

        self.pending = still_pending;
        ready
    }

    /// Rendered = confirmed + every outstanding intent replayed in ticket order
    fn rebuild(&mut self) {
        let mut rendered = self.confirmed.clone();

        let mut intents: Vec<&Intent> = self.in_flight.values().chain(self.pending.iter()).collect();
        intents.sort_by_key(|i| i.ticket);

        for intent in intents {
            let req = &intent.request;
            let Ok(index) = usize::try_from(req.destination_index) else {
                continue;
            };
            let Some(source) = rendered.get(&req.source) else {
                continue;
            };
            if !source.contains(&req.moved_id) {
                continue;
            }

            if req.is_single_list() {
                let plan = plan_move(source, None, &req.moved_id, index);
                rendered.insert(req.source.clone(), plan.source);
            } else {
                let Some(destination) = rendered.get(&req.destination) else {
                    continue;
                };
                let plan = plan_move(source, Some(destination.as_slice()), &req.moved_id, index);
                let destination_after = plan.destination_list().to_vec();
                rendered.insert(req.source.clone(), plan.source);
                rendered.insert(req.destination.clone(), destination_after);
            }
        }

        self.rendered = rendered;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(s: &str) -> Vec<String> {
        s.chars().map(String::from).collect()
    }

    fn section(id: &str) -> ParentKey {
        ParentKey::Section(id.into())
    }

    fn view_with(lists: &[(&str, &str)]) -> OptimisticView {
        let mut view = OptimisticView::new();
        for (parent, items) in lists {
            view.load(section(parent), ids(items));
        }
        view
    }

    fn sent(dispatch: Dispatch) -> (Ticket, MoveRequest) {
        match dispatch {
            Dispatch::Send(ticket, request) => (ticket, request),
            Dispatch::Queued(ticket) => panic!("{ticket} was queued"),
        }
    }

    #[test]
    fn test_move_renders_immediately() {
        let mut view = view_with(&[("s1", "ABCD")]);
        let (_, request) = sent(
            view.begin(MoveRequest::within(section("s1"), "C", 0))
                .unwrap(),
        );

        assert_eq!(view.rendered(&section("s1")).unwrap(), ids("CABD"));
        assert_eq!(view.confirmed(&section("s1")).unwrap(), ids("ABCD"));
        assert_eq!(request.moved_id, "C");
        assert!(view.is_busy(&section("s1")));
    }

    #[test]
    fn test_confirm_replaces_confirmed_state() {
        let mut view = view_with(&[("s1", "AB"), ("s2", "XY")]);
        let (ticket, _) = sent(
            view.begin(MoveRequest::between(section("s1"), section("s2"), "A", 1))
                .unwrap(),
        );
        assert_eq!(view.rendered(&section("s2")).unwrap(), ids("XAY"));

        let settlement = view.settle(
            ticket,
            Ok(MoveOutcome {
                source: section("s1"),
                source_ordered: ids("B"),
                destination: section("s2"),
                destination_ordered: ids("XAY"),
            }),
        );

        assert!(matches!(settlement.status, SettleStatus::Confirmed));
        assert_eq!(view.confirmed(&section("s1")).unwrap(), ids("B"));
        assert_eq!(view.confirmed(&section("s2")).unwrap(), ids("XAY"));
        assert_eq!(view.outstanding(), 0);
    }

    #[test]
    fn test_failure_reverts_to_confirmed() {
        let mut view = view_with(&[("s1", "ABC")]);
        let (ticket, _) = sent(
            view.begin(MoveRequest::within(section("s1"), "A", 2))
                .unwrap(),
        );
        assert_eq!(view.rendered(&section("s1")).unwrap(), ids("BCA"));

        let settlement = view.settle(
            ticket,
            Err(KanbanError::StaleSource {
                id: "A".into(),
                parent: "section:s1".into(),
            }),
        );

        match settlement.status {
            SettleStatus::Reverted { error } => {
                assert_eq!(error.kind(), crate::error::ErrorKind::Conflict)
            }
            other => panic!("expected revert, got {other:?}"),
        }
        assert_eq!(view.rendered(&section("s1")).unwrap(), ids("ABC"));
    }

    #[test]
    fn test_second_move_on_busy_parent_queues_and_replays() {
        let mut view = view_with(&[("s1", "ABC")]);
        let (first, _) = sent(
            view.begin(MoveRequest::within(section("s1"), "C", 0))
                .unwrap(),
        );
        let queued = view
            .begin(MoveRequest::within(section("s1"), "A", 0))
            .unwrap();
        assert!(matches!(queued, Dispatch::Queued(_)));
        // Both intents are visible: C to the front, then A to the front
        assert_eq!(view.rendered(&section("s1")).unwrap(), ids("ACB"));

        // First call fails: its effect disappears, the queued one still shows and is released
        let settlement = view.settle(first, Err(KanbanError::Unauthorized));
        assert!(matches!(settlement.status, SettleStatus::Reverted { .. }));
        assert_eq!(settlement.ready.len(), 1);
        assert_eq!(settlement.ready[0].0, queued.ticket());
        assert_eq!(view.rendered(&section("s1")).unwrap(), ids("ABC"));
    }

    #[test]
    fn test_independent_parents_do_not_queue() {
        let mut view = view_with(&[("s1", "AB"), ("s2", "XY")]);
        sent(view.begin(MoveRequest::within(section("s1"), "B", 0)).unwrap());
        sent(view.begin(MoveRequest::within(section("s2"), "Y", 0)).unwrap());
        assert_eq!(view.outstanding(), 2);
    }

    #[test]
    fn test_reload_makes_response_stale() {
        let mut view = view_with(&[("s1", "AB")]);
        let (ticket, _) = sent(
            view.begin(MoveRequest::within(section("s1"), "B", 0))
                .unwrap(),
        );
        view.load(section("s1"), ids("ABZ"));

        let settlement = view.settle(
            ticket,
            Ok(MoveOutcome {
                source: section("s1"),
                source_ordered: ids("BA"),
                destination: section("s1"),
                destination_ordered: ids("BA"),
            }),
        );
        assert!(matches!(settlement.status, SettleStatus::Ignored));
        assert_eq!(view.confirmed(&section("s1")).unwrap(), ids("ABZ"));
        assert_eq!(view.rendered(&section("s1")).unwrap(), ids("ABZ"));
    }

    #[test]
    fn test_unknown_ticket_is_ignored() {
        let mut view = view_with(&[("s1", "AB")]);
        let settlement = view.settle(Ticket(42), Err(KanbanError::Unauthorized));
        assert!(matches!(settlement.status, SettleStatus::Ignored));
    }

    #[test]
    fn test_begin_rejects_unknown_item() {
        let mut view = view_with(&[("s1", "AB")]);
        let err = view
            .begin(MoveRequest::within(section("s1"), "Q", 0))
            .unwrap_err();
        assert!(matches!(err, KanbanError::StaleSource { .. }));
        assert_eq!(view.outstanding(), 0);

        let err = view
            .begin(MoveRequest::within(section("nope"), "A", 0))
            .unwrap_err();
        assert!(matches!(err, KanbanError::NotFound { .. }));
    }
}
