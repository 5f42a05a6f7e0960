// HTTP handlers: thin adapters from requests to AccountService calls
use super::types::*;
use super::ApiState;
use crate::account::RemoteId;
use crate::error::AccountError;
use axum::{
    debug_handler,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{debug, warn};

/// POST /login
#[debug_handler]
pub async fn login(
    State(state): State<ApiState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, AccountError> {
    debug!("login: username={}", req.username);
    state.service.login(&req.username, &req.secret).await.map(Json)
}

/// POST /signup
pub async fn sign_up(
    State(state): State<ApiState>,
    Json(form): Json<SignUpRequest>,
) -> Result<&'static str, AccountError> {
    debug!("signup: username={}", form.username);
    state.service.sign_up(form).await?;
    Ok(SIGNUP_OK)
}

/// GET /users
///
/// Any failure to reach or read the chat service is a bad gateway.
pub async fn list_users(State(state): State<ApiState>) -> Response {
    match state.service.list_all_accounts().await {
        Ok(users) => Json(users).into_response(),
        Err(e) => (StatusCode::BAD_GATEWAY, e.to_string()).into_response(),
    }
}

/// DELETE /users/:id
///
/// A remote refusal is answered with the remote's own status.
pub async fn delete_user(State(state): State<ApiState>, Path(id): Path<RemoteId>) -> Response {
    match state.service.delete_account(id).await {
        Ok(()) => (StatusCode::OK, DELETE_OK).into_response(),
        Err(AccountError::RemoteRejected { status, body }) => {
            debug!("delete {} rejected ({}): {}", id, status, body);
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, DELETE_FAILED).into_response()
        }
        Err(e) => {
            warn!("delete {} failed: {}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, DELETE_FAILED).into_response()
        }
    }
}

/// GET /verify?token=...
pub async fn verify_email(
    State(state): State<ApiState>,
    Query(params): Query<VerifyParams>,
) -> Result<&'static str, AccountError> {
    state.service.verify_email(&params.token).await?;
    Ok(VERIFY_OK)
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}
