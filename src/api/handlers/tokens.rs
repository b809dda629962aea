use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::token_error;
use crate::api::requester::Requester;
use crate::api::response::{ApiError, AppJson, JSend};
use crate::storage::models::Token;
use crate::tokens as engine;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateTokenRequest {
    /// RFC 3339 expiry instant (inclusive)
    pub deadline: String,
    #[serde(default)]
    pub impersonate: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    /// Validation count; negative = unlimited, omitted or 0 defaults to 1
    #[serde(default)]
    pub uses: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub created_at: String,
    pub deadline: String,
    pub id: String,
    pub last_used_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub owner: String,
    pub uses_remaining: i64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<JSend<TokenResponse>>, ApiError> {
    if req.token.trim().is_empty() {
        return Err(ApiError::bad_request("token is required"));
    }

    let token = engine::redeem(&state.db, &req.token).map_err(token_error)?;
    Ok(JSend::success(token_to_response(&token)))
}

pub async fn otp(
    State(state): State<Arc<AppState>>,
    requester: Requester,
) -> Result<Json<JSend<CreatedResponse>>, ApiError> {
    let id = engine::otp(&state.db, &requester.0, state.config.tokens.otp_ttl_seconds)
        .map_err(token_error)?;
    Ok(JSend::success(CreatedResponse { id }))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    requester: Requester,
    AppJson(req): AppJson<CreateTokenRequest>,
) -> Result<Json<JSend<CreatedResponse>>, ApiError> {
    let deadline = engine::parse_deadline(&req.deadline).map_err(token_error)?;

    let params = engine::CreateParams {
        deadline,
        impersonate: req.impersonate,
        metadata: req.metadata,
        uses: req.uses,
    };
    let id = engine::create(&state.db, &state.tags, &requester.0, params)
        .await
        .map_err(token_error)?;
    Ok(JSend::success(CreatedResponse { id }))
}

pub async fn consume(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ConsumeRequest>,
) -> Result<Json<JSend<TokenResponse>>, ApiError> {
    if req.token.trim().is_empty() {
        return Err(ApiError::bad_request("token is required"));
    }

    let token = engine::consume(&state.db, &req.token).map_err(token_error)?;
    Ok(JSend::success(token_to_response(&token)))
}

// ============================================================================
// Helpers
// ============================================================================

pub(super) fn token_to_response(token: &Token) -> TokenResponse {
    TokenResponse {
        created_at: token.created_at.to_rfc3339(),
        deadline: token.deadline.to_rfc3339(),
        id: token.id.clone(),
        last_used_at: token.last_used_at.map(|t| t.to_rfc3339()),
        metadata: token.metadata.clone(),
        owner: token.owner.clone(),
        uses_remaining: token.uses_remaining,
    }
}
