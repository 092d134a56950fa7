//! Device manager service.
//!
//! [`DeviceManager`] implements every operation the REST API exposes on top
//! of a [`RecordStore`]. It is cheap to clone and safe to share between
//! request handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use log::{debug, info};
use moka::future::Cache;

use crate::config::{SUMMARY_CACHE_CAPACITY, SUMMARY_CACHE_IDLE};
use crate::error::ManagerError;
use crate::models::{CommandLog, ConnectionRecord, DeviceRecord, DeviceSummary, NewDevice};
use crate::parse::ParseKind;
use crate::simulate::{is_simulated, simulate_output};
use crate::store::RecordStore;
use crate::summary::build_device_summary;

/// Cache key: connection id and the connection's write generation when the
/// summary was built.
type SummaryKey = (i64, u64);

/// Operations behind the REST API.
#[derive(Clone)]
pub struct DeviceManager {
    store: Arc<dyn RecordStore>,
    summaries: Cache<SummaryKey, DeviceSummary>,
    generations: Arc<Mutex<HashMap<i64, u64>>>,
}

impl DeviceManager {
    /// Creates a manager over the given store.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        let summaries = Cache::builder()
            .max_capacity(SUMMARY_CACHE_CAPACITY)
            .time_to_idle(SUMMARY_CACHE_IDLE)
            .build();

        Self {
            store,
            summaries,
            generations: Arc::default(),
        }
    }

    fn generation(&self, connection_id: i64) -> u64 {
        let generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        generations.get(&connection_id).copied().unwrap_or_default()
    }

    // Summaries cached under an older generation are never read again.
    fn bump_generation(&self, connection_id: i64) {
        let mut generations = self.generations.lock().unwrap_or_else(PoisonError::into_inner);
        *generations.entry(connection_id).or_default() += 1;
    }

    /// Underlying record store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Active devices.
    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, ManagerError> {
        self.store.active_devices().await
    }

    /// Registers a device.
    pub async fn add_device(&self, device: NewDevice) -> Result<DeviceRecord, ManagerError> {
        let record = self.store.insert_device(device).await?;
        info!("Added device {} '{}' ({})", record.id, record.name, record.ip_address);
        Ok(record)
    }

    /// Deactivates a device so it no longer appears in listings.
    pub async fn remove_device(&self, device_id: i64) -> Result<(), ManagerError> {
        if !self.store.deactivate_device(device_id).await? {
            return Err(ManagerError::DeviceNotFound(device_id));
        }
        info!("Deactivated device {device_id}");
        Ok(())
    }

    /// Opens a connection record against an active device.
    pub async fn connect(
        &self,
        device_id: i64,
        protocol: &str,
    ) -> Result<ConnectionRecord, ManagerError> {
        match self.store.device(device_id).await? {
            Some(device) if device.is_active => {}
            _ => return Err(ManagerError::DeviceNotFound(device_id)),
        }
        let connection = self
            .store
            .open_connection(device_id, protocol, Utc::now())
            .await?;
        info!(
            "Connected to device {device_id} via {protocol} (connection {})",
            connection.id
        );
        Ok(connection)
    }

    /// Sends a command on an active connection and logs the simulated output.
    pub async fn send_command(
        &self,
        connection_id: i64,
        command: &str,
    ) -> Result<CommandLog, ManagerError> {
        let connection = self
            .store
            .connection(connection_id)
            .await?
            .ok_or(ManagerError::ConnectionNotFound(connection_id))?;
        if !connection.is_active() {
            return Err(ManagerError::ConnectionClosed(connection_id));
        }

        if !is_simulated(command) {
            debug!("Connection {connection_id}: no canned output for '{command}'");
        }
        let output = simulate_output(command);
        let log = self
            .store
            .append_command_log(connection_id, command, &output, Utc::now())
            .await?;
        self.bump_generation(connection_id);
        debug!(
            "Connection {connection_id}: '{command}' -> {} bytes",
            log.output.len()
        );
        Ok(log)
    }

    /// Closes an active connection.
    pub async fn disconnect(&self, connection_id: i64) -> Result<(), ManagerError> {
        if !self.store.close_connection(connection_id, Utc::now()).await? {
            return Err(ManagerError::NotActive(connection_id));
        }
        self.bump_generation(connection_id);
        info!("Disconnected connection {connection_id}");
        Ok(())
    }

    /// Device summary for a connection, built from its logged output.
    ///
    /// The generation is read before the logs, so a summary built while a
    /// command is being logged is cached under the older generation.
    pub async fn device_info(&self, connection_id: i64) -> Result<DeviceSummary, ManagerError> {
        let key = (connection_id, self.generation(connection_id));
        if let Some(summary) = self.summaries.get(&key).await {
            debug!("Summary cache hit: {key:?}");
            return Ok(summary);
        }

        let joined = self.store.connection_with_device(connection_id).await?;
        let logs = match joined {
            Some(_) => self.store.command_logs(connection_id).await?,
            None => Vec::new(),
        };
        let device = joined.as_ref().map(|(_, device)| device);
        let summary = build_device_summary(device, connection_id, |_| logs)?;

        self.summaries.insert(key, summary.clone()).await;
        Ok(summary)
    }

    /// Parses the most recent output logged for the command `kind` reads.
    pub async fn parse_latest(
        &self,
        connection_id: i64,
        kind: ParseKind,
    ) -> Result<serde_json::Value, ManagerError> {
        if self.store.connection(connection_id).await?.is_none() {
            return Err(ManagerError::ConnectionNotFound(connection_id));
        }
        let command = kind.command();
        let log = self
            .store
            .command_logs(connection_id)
            .await?
            .into_iter()
            .rev()
            .find(|log| log.command.contains(command))
            .ok_or_else(|| ManagerError::NoCommandOutput {
                connection_id,
                command: command.to_string(),
            })?;

        Ok(kind.parse_to_json(&log.output)?)
    }
}
