//! Task routes
//!
//! The board id in these paths is informational; ownership is checked through the section or
//! task being touched.

use super::{move_echo, move_outcome, AppState};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankboard_kanban::task::{AddTask, DeleteTask, MoveTask, UpdateTask};
use rankboard_kanban::OperationProcessor;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateTaskBody {
    section_id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UpdateTaskBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdatePositionBody {
    task_id: String,
    source_section_id: String,
    destination_section_id: String,
    destination_index: i64,
}

pub(super) async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(_board): Path<String>,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let mut op = AddTask::new(user.clone(), body.section_id);
    if let Some(title) = body.title {
        op = op.with_title(title);
    }
    op.content = body.content;
    let task = state.processor(&user).process(&op, &state.ctx).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn update_position(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(_board): Path<String>,
    body: Result<Json<UpdatePositionBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let op = MoveTask::between(
        user.clone(),
        body.task_id,
        body.source_section_id,
        body.destination_section_id,
        body.destination_index,
    );
    let outcome = move_outcome(state.processor(&user).process(&op, &state.ctx).await?)?;

    let ordered = outcome.clone();
    let (source, destination) = state
        .ctx
        .with_ledger(move |ledger| {
            ledger.tasks_in_order(&ordered.source_ordered, &ordered.destination_ordered)
        })
        .await?;

    let mut response = move_echo(&outcome);
    response.insert("sourceTasksOrdered".into(), json!(source));
    response.insert("destinationTasksOrdered".into(), json!(destination));
    Ok(Json(Value::Object(response)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((_board, id)): Path<(String, String)>,
    body: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let mut op = UpdateTask::new(user.clone(), id);
    op.title = body.title;
    op.content = body.content;
    let task = state.processor(&user).process(&op, &state.ctx).await?;
    Ok(Json(task))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((_board, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let deleted = state
        .processor(&user)
        .process(&DeleteTask::new(user.clone(), id), &state.ctx)
        .await?;
    Ok(Json(deleted))
}
