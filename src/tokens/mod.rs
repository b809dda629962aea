pub mod consume;
pub mod generator;
pub mod issue;
pub mod query;
pub mod redeem;

pub use consume::consume;
pub use generator::generate_token;
pub use issue::{create, otp, parse_deadline, CreateParams};
pub use query::{info, list};
pub use redeem::redeem;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("Deadline is in the past")]
    DeadlineInPast,
    #[error("Deadline conversion error")]
    DeadlineParse,
    #[error("Invalid params: {0}")]
    InvalidParams(String),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Permission lookup failed: {0}")]
    Permission(#[from] crate::perms::PermissionError),
    #[error("Permission denied")]
    PermissionDenied,
}
