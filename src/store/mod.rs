//! Record storage for devices, connections and command logs.
//!
//! # Main Components
//!
//! - [`RecordStore`] - async storage interface used by the manager
//! - [`MemoryStore`] - in-process implementation with optional JSONL snapshots
//! - [`SnapshotRecord`] - one line of a snapshot file

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ManagerError;
use crate::models::{CommandLog, ConnectionRecord, DeviceRecord, NewDevice};

pub use memory::MemoryStore;

/// Storage interface for device, connection and command-log records.
///
/// Ids are assigned by the store, monotonically per table, starting at 1.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new active device and returns it with its assigned id.
    async fn insert_device(&self, device: NewDevice) -> Result<DeviceRecord, ManagerError>;

    /// All devices that have not been deactivated, by id.
    async fn active_devices(&self) -> Result<Vec<DeviceRecord>, ManagerError>;

    async fn device(&self, id: i64) -> Result<Option<DeviceRecord>, ManagerError>;

    /// Marks a device inactive. Returns false if the device does not exist.
    async fn deactivate_device(&self, id: i64) -> Result<bool, ManagerError>;

    /// Opens an active connection and stamps the device's `last_connected`.
    async fn open_connection(
        &self,
        device_id: i64,
        connection_type: &str,
        at: DateTime<Utc>,
    ) -> Result<ConnectionRecord, ManagerError>;

    async fn connection(&self, id: i64) -> Result<Option<ConnectionRecord>, ManagerError>;

    /// Connection joined with its device. `None` when either is missing.
    async fn connection_with_device(
        &self,
        id: i64,
    ) -> Result<Option<(ConnectionRecord, DeviceRecord)>, ManagerError> {
        let Some(connection) = self.connection(id).await? else {
            return Ok(None);
        };
        let device = self.device(connection.device_id).await?;
        Ok(device.map(|device| (connection, device)))
    }

    /// Closes an active connection. Returns false if it is unknown or already closed.
    async fn close_connection(&self, id: i64, at: DateTime<Utc>) -> Result<bool, ManagerError>;

    async fn append_command_log(
        &self,
        connection_id: i64,
        command: &str,
        output: &str,
        at: DateTime<Utc>,
    ) -> Result<CommandLog, ManagerError>;

    /// Logs of one connection in the order they were appended.
    async fn command_logs(&self, connection_id: i64) -> Result<Vec<CommandLog>, ManagerError>;
}

/// One line of a JSONL snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotRecord {
    Device(DeviceRecord),
    Connection(ConnectionRecord),
    CommandLog(CommandLog),
}

mod memory;
