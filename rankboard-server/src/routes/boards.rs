use super::{move_echo, move_outcome, AppState};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankboard_kanban::board::{
    AddBoard, DeleteBoard, GetBoard, ListBoards, ListFavourites, MoveBoard, MoveFavourite,
    UpdateBoard,
};
use rankboard_kanban::OperationProcessor;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub(super) struct CreateBoardBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UpdateBoardBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    favourite: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReorderBoardBody {
    board_id: String,
    destination_index: i64,
}

pub(super) async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Value>> {
    let boards = state
        .processor(&user)
        .process(&ListBoards::new(user.clone()), &state.ctx)
        .await?;
    Ok(Json(boards))
}

pub(super) async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<CreateBoardBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let mut op = AddBoard::new(user.clone());
    op.title = body.title;
    op.description = body.description;
    let board = state.processor(&user).process(&op, &state.ctx).await?;
    Ok((StatusCode::CREATED, Json(board)))
}

pub(super) async fn reorder(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<ReorderBoardBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let op = MoveBoard::new(user.clone(), body.board_id, body.destination_index);
    let outcome = move_outcome(state.processor(&user).process(&op, &state.ctx).await?)?;

    let ordered = outcome.destination_ordered.clone();
    let boards = state
        .ctx
        .with_ledger(move |ledger| ledger.boards_in_order(&ordered))
        .await?;

    let mut response = move_echo(&outcome);
    response.insert("boardsOrdered".into(), json!(boards));
    Ok(Json(Value::Object(response)))
}

pub(super) async fn list_favourites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Value>> {
    let favourites = state
        .processor(&user)
        .process(&ListFavourites::new(user.clone()), &state.ctx)
        .await?;
    Ok(Json(favourites))
}

pub(super) async fn reorder_favourites(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<ReorderBoardBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let op = MoveFavourite::new(user.clone(), body.board_id, body.destination_index);
    let outcome = move_outcome(state.processor(&user).process(&op, &state.ctx).await?)?;

    let ordered = outcome.destination_ordered.clone();
    let favourites = state
        .ctx
        .with_ledger(move |ledger| ledger.boards_in_order(&ordered))
        .await?;

    let mut response = move_echo(&outcome);
    response.insert("favouritesOrdered".into(), json!(favourites));
    Ok(Json(Value::Object(response)))
}

pub(super) async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let board = state
        .processor(&user)
        .process(&GetBoard::new(user.clone(), id), &state.ctx)
        .await?;
    Ok(Json(board))
}

pub(super) async fn update(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdateBoardBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let mut op = UpdateBoard::new(user.clone(), id);
    op.title = body.title;
    op.description = body.description;
    op.favourite = body.favourite;
    let board = state.processor(&user).process(&op, &state.ctx).await?;
    Ok(Json(board))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = state
        .processor(&user)
        .process(&DeleteBoard::new(user.clone(), id), &state.ctx)
        .await?;
    Ok(Json(deleted))
}
