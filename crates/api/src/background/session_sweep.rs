//! Periodic stale-session sweep.
//!
//! Audit rows are opened when a remote session connects and closed when it
//! ends. Rows that stay open past the timeout are force-closed with a note.

use chrono::{DateTime, Utc};
use deskrelay_core::sweep::{SweepConfig, SESSION_TIMEOUT_NOTE};
use deskrelay_db::repositories::AuditRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the session sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, config: SweepConfig, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        timeout_secs = config.window.as_secs(),
        time_zone = %config.time_zone,
        "Session sweep job started"
    );

    let mut interval = super::ticker(config.interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep(&pool, &config, Utc::now()).await {
                    Ok(closed) => {
                        if closed > 0 {
                            tracing::info!(closed, "Session sweep: stale sessions closed");
                        } else {
                            tracing::debug!("Session sweep: no stale sessions");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Session sweep: update failed");
                    }
                }
            }
        }
    }
}

/// One pass: close every open session created at or before the cutoff,
/// stamping `closed_at = now`. Returns the number of sessions closed.
pub async fn sweep(
    pool: &PgPool,
    config: &SweepConfig,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let cutoff = config.cutoff(now).with_timezone(&Utc);
    AuditRepo::close_stale_sessions(pool, cutoff, now, SESSION_TIMEOUT_NOTE).await
}
