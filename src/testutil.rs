//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use chrono::Utc;
use tempfile::TempDir;

use crate::storage::models::Token;
use crate::storage::Database;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard — the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// Create a `Token` with the given id, owner and use count, one day out.
pub fn make_token(id: &str, owner: &str, uses: i64) -> Token {
    let now = Utc::now();
    Token {
        created_at: now,
        deadline: now + chrono::Duration::hours(24),
        id: id.to_string(),
        last_used_at: None,
        metadata: None,
        owner: owner.to_string(),
        uses_remaining: uses,
    }
}
