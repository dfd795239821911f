use super::{move_echo, move_outcome, AppState};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankboard_kanban::section::{AddSection, DeleteSection, MoveSection, UpdateSection};
use rankboard_kanban::{BoardId, OperationProcessor};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub(super) struct SectionBody {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReorderSectionBody {
    section_id: String,
    destination_index: i64,
}

pub(super) async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board): Path<String>,
    body: Result<Json<SectionBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let op = AddSection::new(user.clone(), board).with_title(body.title);
    let section = state.processor(&user).process(&op, &state.ctx).await?;
    Ok((StatusCode::CREATED, Json(section)))
}

pub(super) async fn reorder(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(board): Path<String>,
    body: Result<Json<ReorderSectionBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let op = MoveSection::new(
        user.clone(),
        BoardId::from_string(board),
        body.section_id,
        body.destination_index,
    );
    let outcome = move_outcome(state.processor(&user).process(&op, &state.ctx).await?)?;

    let ordered = outcome.destination_ordered.clone();
    let sections = state
        .ctx
        .with_ledger(move |ledger| ledger.sections_in_order(&ordered))
        .await?;

    let mut response = move_echo(&outcome);
    response.insert("sectionsOrdered".into(), json!(sections));
    Ok(Json(Value::Object(response)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((_board, id)): Path<(String, String)>,
    body: Result<Json<SectionBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let op = UpdateSection::new(user.clone(), id, body.title);
    let section = state.processor(&user).process(&op, &state.ctx).await?;
    Ok(Json(section))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((_board, id)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    let deleted = state
        .processor(&user)
        .process(&DeleteSection::new(user.clone(), id), &state.ctx)
        .await?;
    Ok(Json(deleted))
}
