use chrono::Utc;

use crate::storage::models::Token;
use crate::storage::Database;

use super::TokenError;

/// Validate a token and spend one use, returning the updated row.
///
/// The check-and-decrement happens in a single storage write transaction.
/// A miss is deliberately indistinguishable to the caller: an unknown id, a
/// dead counter, and a passed deadline all fail with `InvalidToken`.
pub fn redeem(db: &Database, id: &str) -> Result<Token, TokenError> {
    match db.redeem_token(id, Utc::now())? {
        Some(token) => {
            tracing::debug!(id, owner = %token.owner, "Redeemed token");
            Ok(token)
        }
        None => Err(TokenError::InvalidToken),
    }
}
