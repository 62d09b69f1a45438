//! Device presence model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use deskrelay_core::types::{DbId, Timestamp};

/// A row from the `devices` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub rustdesk_id: String,
    pub uuid: String,
    pub hostname: String,
    pub username: String,
    pub os: String,
    pub version: String,
    pub cpu: String,
    pub memory: String,
    pub ip_address: String,
    pub conns: i32,
    pub is_online: bool,
    pub last_seen_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Heartbeat payload posted by a device.
///
/// Only `id` is required; absent metadata keeps the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceHeartbeat {
    /// Rustdesk id.
    pub id: String,
    pub uuid: Option<String>,
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub os: Option<String>,
    pub version: Option<String>,
    pub cpu: Option<String>,
    pub memory: Option<String>,
    pub conns: Option<i32>,
}

/// Online/offline filter for the device list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Online,
    Offline,
}

impl DeviceStatus {
    pub fn is_online(self) -> bool {
        self == DeviceStatus::Online
    }
}

/// Filters for the console device list. Text filters are substring matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceFilter {
    pub hostname: Option<String>,
    pub username: Option<String>,
    pub rustdesk_id: Option<String>,
    pub status: Option<DeviceStatus>,
}
