//! Verified requester identity
//!
//! The service sits behind the platform's request-dispatch layer, which
//! authenticates callers and forwards the verified identity path in the
//! `x-requester` header. Requests arriving without it are rejected; nothing
//! here checks credentials.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::response::ApiError;

pub const REQUESTER_HEADER: &str = "x-requester";

/// The authenticated identity path of the caller
#[derive(Debug, Clone)]
pub struct Requester(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let requester = parts
            .headers
            .get(REQUESTER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        match requester {
            Some(id) => Ok(Requester(id.to_string())),
            None => Err(ApiError::unauthorized("requester identity missing")),
        }
    }
}
