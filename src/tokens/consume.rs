use crate::storage::models::Token;
use crate::storage::Database;

use super::TokenError;

/// Terminate a token early, returning its final snapshot.
///
/// The row is kept with its counter zeroed rather than deleted, so it stays
/// visible to list/info until the sweeper removes it. Irreversible: once
/// dead, both `consume` and `redeem` fail with `InvalidToken`.
pub fn consume(db: &Database, id: &str) -> Result<Token, TokenError> {
    match db.consume_token(id)? {
        Some(token) => {
            tracing::debug!(id, owner = %token.owner, "Consumed token");
            Ok(token)
        }
        None => Err(TokenError::InvalidToken),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{make_token, setup_db};
    use crate::tokens::redeem::redeem;
    use chrono::{Duration, Utc};

    #[test]
    fn test_consume_succeeds_once() {
        let (db, _temp) = setup_db();
        db.insert_token(&make_token("t1", "alice", 5)).unwrap();

        let snapshot = consume(&db, "t1").unwrap();
        assert_eq!(snapshot.uses_remaining, 0);

        assert!(matches!(consume(&db, "t1"), Err(TokenError::InvalidToken)));
        assert!(matches!(redeem(&db, "t1"), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_consume_unknown_token_fails() {
        let (db, _temp) = setup_db();
        assert!(matches!(
            consume(&db, "missing"),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn test_consume_ignores_deadline() {
        let (db, _temp) = setup_db();
        let mut token = make_token("t1", "alice", 1);
        token.deadline = Utc::now() - Duration::hours(1);
        db.insert_token(&token).unwrap();

        // Expired but present: still consumable exactly once
        assert_eq!(consume(&db, "t1").unwrap().uses_remaining, 0);
        assert!(matches!(consume(&db, "t1"), Err(TokenError::InvalidToken)));
    }

    #[test]
    fn test_consumed_token_remains_visible_until_swept() {
        let (db, _temp) = setup_db();
        db.insert_token(&make_token("t1", "alice", 5)).unwrap();

        consume(&db, "t1").unwrap();
        let listed = db.tokens_by_owner("alice").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].uses_remaining, 0);
    }
}
