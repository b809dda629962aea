//! token-manager - A short-lived authentication token service
//!
//! This crate issues, validates, consumes and expires use-counted tokens:
//! - Single-use (OTP) and multi-use tokens with absolute deadlines
//! - Atomic validate-and-decrement through storage write transactions
//! - Admin-gated impersonation via an external permission resolver
//! - Active expiration via a background sweep task
//! - redb embedded database (ACID, MVCC, crash-safe)
//! - REST API

pub mod api;
pub mod config;
pub mod expiration;
pub mod perms;
pub mod storage;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use config::Config;
use perms::TagResolver;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub tags: TagResolver,
}
