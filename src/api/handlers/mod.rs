mod admin;
mod query;
mod tokens;

use serde::Deserialize;

use crate::api::response::ApiError;
use crate::tokens::TokenError;

pub use admin::{clear, health};
pub use query::{info, list};
pub use tokens::{consume, create, login, otp};

/// Shared query parameters for the list endpoint
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub path: Option<String>,
}

impl ListParams {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.limit == 0 {
            return Err(ApiError::bad_request("limit must be greater than 0"));
        }
        Ok(())
    }
}

fn default_limit() -> u32 {
    20
}

/// Map a TokenError to an ApiError.
///
/// Storage and resolver failures are logged with full detail server-side
/// and returned as an opaque internal error; the remaining variants are
/// caller faults and carry their message through.
fn token_error(e: TokenError) -> ApiError {
    match e {
        TokenError::DeadlineInPast => ApiError::bad_request("deadline is in the past"),
        TokenError::DeadlineParse => {
            ApiError::bad_request("deadline must be an RFC 3339 timestamp")
        }
        TokenError::InvalidParams(msg) => ApiError::bad_request(msg),
        TokenError::InvalidToken => ApiError::not_found("Invalid token"),
        TokenError::PermissionDenied => ApiError::forbidden("Permission denied"),
        TokenError::Database(e) => {
            tracing::error!(error = %e, "Storage failure");
            ApiError::internal("Internal error")
        }
        TokenError::Permission(e) => {
            tracing::error!(error = %e, "Permission resolver failure");
            ApiError::internal("Internal error")
        }
    }
}
