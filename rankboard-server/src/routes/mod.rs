//! HTTP routes
//!
//! Every handler turns its request into one kanban command and runs it through a
//! [`KanbanOperationProcessor`] attributed to the caller, so mutations land in the activity log.

mod auth;
mod boards;
mod sections;
mod tasks;

use crate::error::ApiResult;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rankboard_kanban::{KanbanContext, KanbanError, KanbanOperationProcessor, MoveOutcome, UserId};
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub ctx: KanbanContext,
}

impl AppState {
    pub fn new(ctx: KanbanContext) -> Self {
        Self { ctx }
    }

    /// A processor that records `user` as the actor
    fn processor(&self, user: &UserId) -> KanbanOperationProcessor {
        KanbanOperationProcessor::with_actor(user.as_str())
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/verify-token", post(auth::verify_token))
        .route(
            "/boards",
            get(boards::list).post(boards::create).put(boards::reorder),
        )
        .route(
            "/boards/favourites",
            get(boards::list_favourites).put(boards::reorder_favourites),
        )
        .route(
            "/boards/:id",
            get(boards::get).put(boards::update).delete(boards::delete),
        )
        .route(
            "/boards/:id/sections",
            post(sections::create).put(sections::reorder),
        )
        .route(
            "/boards/:id/sections/:section_id",
            put(sections::update).delete(sections::delete),
        )
        .route("/boards/:id/tasks", post(tasks::create))
        .route("/boards/:id/tasks/update-position", put(tasks::update_position))
        .route(
            "/boards/:id/tasks/:task_id",
            put(tasks::update).delete(tasks::delete),
        );

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Recover the committed outcome a move command returned
fn move_outcome(value: Value) -> ApiResult<MoveOutcome> {
    Ok(serde_json::from_value(value).map_err(KanbanError::from)?)
}

/// The part every move response shares: both parent keys and the committed id orderings
///
/// Clients match the parent keys against their own lists and drop echoes for lists they
/// have moved on from.
fn move_echo(outcome: &MoveOutcome) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("source".into(), json!(outcome.source));
    body.insert("destination".into(), json!(outcome.destination));
    body.insert("sourceOrdered".into(), json!(outcome.source_ordered));
    body.insert("destinationOrdered".into(), json!(outcome.destination_ordered));
    body
}
