//! Persisted records and API payloads.
//!
//! Devices, connections and command logs are owned by the
//! [`RecordStore`](crate::store::RecordStore). Parsed views of command
//! output live in [`crate::parse`] and are never stored.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Protocol recorded for a device when none is supplied.
pub const DEFAULT_PROTOCOL: &str = "ssh";

/// A registered network device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceRecord {
    pub id: i64,
    pub name: String,
    pub ip_address: String,
    /// Free-form type, e.g. `router` or `switch`.
    pub device_type: String,
    /// Hardware model; empty when unknown.
    #[serde(default)]
    pub model: String,
    pub protocol: String,
    #[serde(default)]
    pub username: String,
    /// SHA-256 hex digest of the login password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_digest: Option<String>,
    /// SHA-256 hex digest of the enable password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_password_digest: Option<String>,
    pub last_connected: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Fields required to register a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NewDevice {
    pub name: String,
    pub ip_address: String,
    pub device_type: String,
    pub model: String,
    pub protocol: String,
    pub username: String,
    pub password: Option<String>,
    pub enable_password: Option<String>,
}

impl NewDevice {
    /// Builds the stored record, replacing passwords with their digests.
    pub fn into_record(self, id: i64) -> DeviceRecord {
        let protocol = if self.protocol.is_empty() {
            DEFAULT_PROTOCOL.to_string()
        } else {
            self.protocol
        };
        DeviceRecord {
            id,
            name: self.name,
            ip_address: self.ip_address,
            device_type: self.device_type,
            model: self.model,
            protocol,
            username: self.username,
            password_digest: self.password.as_deref().and_then(digest_secret),
            enable_password_digest: self.enable_password.as_deref().and_then(digest_secret),
            last_connected: None,
            is_active: true,
        }
    }
}

/// Hex SHA-256 digest of a secret; `None` for an empty secret.
pub fn digest_secret(secret: &str) -> Option<String> {
    if secret.is_empty() {
        return None;
    }
    let digest = Sha256::digest(secret.as_bytes());
    Some(digest.iter().map(|b| format!("{b:02x}")).collect())
}

/// Lifecycle state of a connection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Active,
    Closed,
}

/// A simulated session against a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConnectionRecord {
    pub id: i64,
    pub device_id: i64,
    /// Protocol requested when connecting, e.g. `ssh` or `telnet`.
    pub connection_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: ConnectionStatus,
}

impl ConnectionRecord {
    pub fn is_active(&self) -> bool {
        self.status == ConnectionStatus::Active
    }
}

/// A command sent on a connection and the output recorded for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandLog {
    pub id: i64,
    pub connection_id: i64,
    pub command: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
}

/// Device summary derived from a connection's logged command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceSummary {
    pub name: String,
    pub model: String,
    pub device_type: String,
    pub ios_version: String,
    pub total_interfaces: u32,
    pub interfaces_up: u32,
}
