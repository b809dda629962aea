use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Token;
use super::tables::*;

impl Database {
    // ========================================================================
    // Token operations
    // ========================================================================

    /// Store a new token
    pub fn insert_token(&self, token: &Token) -> Result<(), DatabaseError> {
        debug_assert!(!token.id.is_empty(), "token id must not be empty");
        debug_assert!(!token.owner.is_empty(), "token owner must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(TOKENS)?;
            let data = rmp_serde::to_vec_named(token)?;
            table.insert(token.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a token by id
    pub fn get_token(&self, id: &str) -> Result<Option<Token>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TOKENS)?;

        match table.get(id)? {
            Some(data) => {
                let token: Token = rmp_serde::from_slice(data.value())?;
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Validate and spend one use of a token in a single write transaction.
    ///
    /// The row is updated only if it still has uses left and `now` is within
    /// the deadline (inclusive). Positive counters are decremented; negative
    /// (unlimited) counters are left untouched. `last_used_at` is stamped
    /// either way. Returns the post-update row, or `None` if no row matched.
    ///
    /// redb serializes write transactions, so two concurrent callers can
    /// never both observe the same pre-decrement counter.
    pub fn redeem_token(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Token>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let existing = {
            let table = write_txn.open_table(TOKENS)?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice::<Token>(data.value())?),
                None => None,
            };
            result
        };

        let updated = match existing {
            Some(mut token) if token.is_live(now) => {
                if token.uses_remaining > 0 {
                    token.uses_remaining -= 1;
                }
                token.last_used_at = Some(now);
                let data = rmp_serde::to_vec_named(&token)?;
                let mut table = write_txn.open_table(TOKENS)?;
                table.insert(id, data.as_slice())?;
                Some(token)
            }
            _ => None,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Force a token dead by zeroing its use counter.
    ///
    /// Succeeds once per row: a second call finds the counter already at 0
    /// and matches nothing. The deadline is not consulted. Returns the
    /// post-update snapshot, or `None` if no live row matched.
    pub fn consume_token(&self, id: &str) -> Result<Option<Token>, DatabaseError> {
        let write_txn = self.begin_write()?;
        let existing = {
            let table = write_txn.open_table(TOKENS)?;
            let result = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice::<Token>(data.value())?),
                None => None,
            };
            result
        };

        let consumed = match existing {
            Some(mut token) if token.uses_remaining != 0 => {
                token.uses_remaining = 0;
                let data = rmp_serde::to_vec_named(&token)?;
                let mut table = write_txn.open_table(TOKENS)?;
                table.insert(id, data.as_slice())?;
                Some(token)
            }
            _ => None,
        };

        write_txn.commit()?;
        Ok(consumed)
    }

    /// Get all tokens owned exactly by `owner`
    pub fn tokens_by_owner(&self, owner: &str) -> Result<Vec<Token>, DatabaseError> {
        self.tokens_where(|t| t.owner == owner)
    }

    /// Get all tokens owned by `path` or a dot-segment descendant of it
    /// (`"team"` matches `"team"` and `"team.sub"` but not `"teamsuffix"`).
    pub fn tokens_under_path(&self, path: &str) -> Result<Vec<Token>, DatabaseError> {
        self.tokens_where(|t| owner_in_scope(&t.owner, path))
    }

    /// Delete all dead tokens (use counter at 0)
    pub fn delete_spent(&self) -> Result<usize, DatabaseError> {
        self.delete_where(|t| t.uses_remaining == 0)
    }

    /// Delete all tokens whose deadline has passed, regardless of use count
    pub fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        self.delete_where(|t| t.deadline < now)
    }

    fn tokens_where(
        &self,
        predicate: impl Fn(&Token) -> bool,
    ) -> Result<Vec<Token>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(TOKENS)?;

        let mut tokens = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let token: Token = rmp_serde::from_slice(value.value())?;
            if predicate(&token) {
                tokens.push(token);
            }
        }

        Ok(tokens)
    }

    /// Bulk delete in a single write transaction. Returns the number of
    /// rows removed.
    fn delete_where(&self, predicate: impl Fn(&Token) -> bool) -> Result<usize, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            // Collect matching keys first, then remove
            let table = write_txn.open_table(TOKENS)?;
            let mut doomed = Vec::new();
            for result in table.iter()? {
                let (key, value) = result?;
                let token: Token = rmp_serde::from_slice(value.value())?;
                if predicate(&token) {
                    doomed.push(key.value().to_string());
                }
            }
            drop(table);

            let mut table = write_txn.open_table(TOKENS)?;
            for key in &doomed {
                table.remove(key.as_str())?;
            }
            doomed.len()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

/// Whether `owner` equals `path` or sits below it under dot-segment
/// boundaries.
fn owner_in_scope(owner: &str, path: &str) -> bool {
    match owner.strip_prefix(path) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}
