use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::tokens::{token_to_response, TokenResponse};
use super::{token_error, ListParams};
use crate::api::requester::Requester;
use crate::api::response::{ApiError, AppJson, AppQuery, JSend, JSendPaginated, Pagination};
use crate::tokens as engine;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct InfoRequest {
    pub ids: Vec<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    requester: Requester,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<JSendPaginated<TokenResponse>>, ApiError> {
    params.validate()?;

    let tokens = engine::list(&state.db, &state.tags, &requester.0, params.path.as_deref())
        .await
        .map_err(token_error)?;

    let total = tokens.len() as u64;
    let items: Vec<TokenResponse> = tokens
        .iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .map(token_to_response)
        .collect();

    Ok(JSendPaginated::success(
        items,
        Pagination {
            limit: params.limit,
            offset: params.offset,
            total,
        },
    ))
}

pub async fn info(
    State(state): State<Arc<AppState>>,
    requester: Requester,
    AppJson(req): AppJson<InfoRequest>,
) -> Result<Json<JSend<Vec<TokenResponse>>>, ApiError> {
    let tokens = engine::info(&state.db, &state.tags, &requester.0, &req.ids)
        .await
        .map_err(token_error)?;

    Ok(JSend::success(
        tokens.iter().map(token_to_response).collect(),
    ))
}
