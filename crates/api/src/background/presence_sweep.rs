//! Periodic device presence sweep.
//!
//! Devices report in with heartbeats. A device whose last heartbeat is older
//! than the configured window is flipped to offline.

use chrono::{DateTime, Utc};
use deskrelay_core::sweep::SweepConfig;
use deskrelay_db::repositories::DeviceRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Run the presence sweep loop until `cancel` is triggered.
pub async fn run(pool: PgPool, config: SweepConfig, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = config.interval.as_secs(),
        offline_after_secs = config.window.as_secs(),
        time_zone = %config.time_zone,
        "Presence sweep job started"
    );

    let mut interval = super::ticker(config.interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Presence sweep job stopping");
                break;
            }
            _ = interval.tick() => {
                match sweep(&pool, &config, Utc::now()).await {
                    Ok(marked) => {
                        if marked > 0 {
                            tracing::info!(marked, "Presence sweep: devices marked offline");
                        } else {
                            tracing::debug!("Presence sweep: no stale devices");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Presence sweep: update failed");
                    }
                }
            }
        }
    }
}

/// One pass: mark every online device not updated since the cutoff as
/// offline. Returns the number of devices changed.
pub async fn sweep(
    pool: &PgPool,
    config: &SweepConfig,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let cutoff = config.cutoff(now).with_timezone(&Utc);
    DeviceRepo::mark_stale_offline(pool, cutoff).await
}
