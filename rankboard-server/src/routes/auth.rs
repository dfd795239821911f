use super::AppState;
use crate::auth::bearer_token;
use crate::error::ApiResult;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rankboard_kanban::user::{LoginUser, SignupUser, VerifyToken};
use rankboard_kanban::{KanbanError, KanbanOperationProcessor, OperationProcessor};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignupBody {
    username: String,
    password: String,
    confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginBody {
    username: String,
    password: String,
}

pub(super) async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let op = SignupUser::new(&body.username, body.password).with_confirmation(body.confirm_password);
    let value = KanbanOperationProcessor::with_actor(body.username)
        .process(&op, &state.ctx)
        .await?;
    Ok((StatusCode::CREATED, Json(value)))
}

pub(super) async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let op = LoginUser::new(&body.username, body.password);
    let value = KanbanOperationProcessor::with_actor(body.username)
        .process(&op, &state.ctx)
        .await?;
    Ok(Json(value))
}

pub(super) async fn verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let token = bearer_token(&headers).ok_or(KanbanError::Unauthorized)?;
    let value = KanbanOperationProcessor::new()
        .process(&VerifyToken::new(token), &state.ctx)
        .await?;
    Ok(Json(value))
}
