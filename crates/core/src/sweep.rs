//! Timing rules for the periodic presence and session sweepers.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::error::CoreError;

/// Note written on audit sessions closed by the session sweeper.
pub const SESSION_TIMEOUT_NOTE: &str = "Auto-closed: session timeout";

pub const DEFAULT_DEVICE_CHECK_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_DEVICE_OFFLINE_AFTER_SECS: u64 = 30;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 2 * 60 * 60;

/// Schedule for one sweeper: how often it runs, how old a row must be
/// before it is swept, and the zone in which cutoffs are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    pub interval: Duration,
    pub window: Duration,
    pub time_zone: FixedOffset,
}

impl SweepConfig {
    pub fn new(interval: Duration, window: Duration, time_zone: FixedOffset) -> Self {
        Self {
            interval,
            window,
            time_zone,
        }
    }

    /// Rows last touched at or before this instant are stale.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        let window = chrono::Duration::from_std(self.window)
            .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
        (now - window).with_timezone(&self.time_zone)
    }
}

/// Parse a fixed UTC offset such as `+02:00`, `-0530`, `UTC` or `Z`.
pub fn parse_time_zone(raw: &str) -> Result<FixedOffset, CoreError> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("utc") || s == "Z" {
        return Ok(utc_offset());
    }

    let invalid = || CoreError::Validation(format!("Invalid time zone offset '{raw}'"));

    let (sign, rest) = match s.as_bytes()[0] {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

pub fn utc_offset() -> FixedOffset {
    Utc.fix()
}
