use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::expiration;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// On-demand sweep: same two phases as the background task, synchronous result
pub async fn clear(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<ClearResponse>>, ApiError> {
    let db = state.db.clone();
    let result = tokio::task::spawn_blocking(move || expiration::sweep(&db)).await;

    match result {
        Ok(Ok(deleted)) => {
            tracing::debug!(deleted, "On-demand sweep finished");
            Ok(JSend::success(ClearResponse {
                deleted: deleted as u64,
            }))
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "On-demand sweep failed");
            Err(ApiError::internal("Internal error"))
        }
        Err(e) => {
            tracing::error!(error = %e, "On-demand sweep panicked");
            Err(ApiError::internal("Internal error"))
        }
    }
}
