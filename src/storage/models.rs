use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authentication token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    /// When the token was issued
    pub created_at: DateTime<Utc>,
    /// Absolute expiry instant (inclusive boundary)
    pub deadline: DateTime<Utc>,
    /// Opaque token identifier (32-byte hex, handed to the caller)
    pub id: String,
    /// When the token last passed validation
    pub last_used_at: Option<DateTime<Utc>>,
    /// Caller-supplied payload, stored opaquely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Dot-segmented identity path the token authenticates as
    pub owner: String,
    /// Remaining validations: positive counts down, 0 is dead, negative is unlimited
    pub uses_remaining: i64,
}

impl Token {
    /// A token validates iff it has uses left and the deadline has not passed.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.uses_remaining != 0 && now <= self.deadline
    }
}
