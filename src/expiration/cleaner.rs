use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::storage::{Database, DatabaseError};
use crate::AppState;

/// Delete dead tokens, then expired tokens. Returns the total removed.
///
/// Two independent bulk deletes: a failure in the first phase aborts before
/// the second. Deletions are idempotent, so partial progress is safe to
/// retry on the next cycle. A valid token matches neither predicate and is
/// never touched.
pub fn sweep(db: &Database) -> Result<usize, DatabaseError> {
    let spent = db.delete_spent()?;
    debug!(count = spent, "Deleted spent tokens");

    let expired = db.delete_expired(Utc::now())?;
    debug!(count = expired, "Deleted expired tokens");

    Ok(spent + expired)
}

/// Start the background sweeper task
pub fn start_sweeper(state: Arc<AppState>) -> JoinHandle<()> {
    let interval = Duration::from_secs(state.config.tokens.sweep_interval_seconds);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);

        loop {
            interval_timer.tick().await;
            run_sweep(&state).await;
        }
    })
}

async fn run_sweep(state: &AppState) {
    debug!("Running token sweep");

    let db = state.db.clone();
    let result = tokio::task::spawn_blocking(move || sweep(&db)).await;

    match result {
        Ok(Ok(count)) if count > 0 => info!(count, "Swept dead and expired tokens"),
        Ok(Ok(_)) => {}
        Ok(Err(e)) => error!(error = %e, "Token sweep failed"),
        Err(e) => error!(error = %e, "Token sweep task panicked"),
    }
}
