//! Background tasks and scheduled jobs.
//!
//! Each submodule provides a long-running `run` function intended to be
//! spawned via `tokio::spawn`, plus the single-pass `sweep` it repeats. All
//! tasks receive their schedule explicitly and accept a [`CancellationToken`]
//! for graceful shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod presence_sweep;
pub mod session_sweep;

use std::time::Duration;

/// Shortest period a sweeper may run at. `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_secs(1);

fn ticker(period: Duration) -> tokio::time::Interval {
    let mut interval = tokio::time::interval(period.max(MIN_INTERVAL));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    interval
}
