use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use tokio::sync::RwLock;

use super::*;
use crate::models::ConnectionStatus;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Tables {
    devices: BTreeMap<i64, DeviceRecord>,
    connections: BTreeMap<i64, ConnectionRecord>,
    logs: Vec<CommandLog>,
}

impl Tables {
    fn next_device_id(&self) -> i64 {
        self.devices.keys().next_back().map_or(1, |id| id + 1)
    }

    fn next_connection_id(&self) -> i64 {
        self.connections.keys().next_back().map_or(1, |id| id + 1)
    }

    fn next_log_id(&self) -> i64 {
        self.logs.iter().map(|log| log.id).max().map_or(1, |id| id + 1)
    }

    fn to_jsonl(&self) -> Result<String, ManagerError> {
        let records = self
            .devices
            .values()
            .cloned()
            .map(SnapshotRecord::Device)
            .chain(
                self.connections
                    .values()
                    .cloned()
                    .map(SnapshotRecord::Connection),
            )
            .chain(self.logs.iter().cloned().map(SnapshotRecord::CommandLog));

        let mut lines = Vec::new();
        for record in records {
            lines.push(serde_json::to_string(&record)?);
        }
        Ok(lines.join("\n"))
    }

    fn from_jsonl(jsonl: &str) -> Result<Self, ManagerError> {
        let mut tables = Tables::default();
        for line in jsonl.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SnapshotRecord>(line)? {
                SnapshotRecord::Device(device) => {
                    tables.devices.insert(device.id, device);
                }
                SnapshotRecord::Connection(connection) => {
                    tables.connections.insert(connection.id, connection);
                }
                SnapshotRecord::CommandLog(log) => tables.logs.push(log),
            }
        }
        Ok(tables)
    }
}

/// In-memory [`RecordStore`].
///
/// With a snapshot path, the full table set is rewritten as JSONL after every
/// mutation and reloaded by [`MemoryStore::open`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    snapshot: Option<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty store without persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store backed by a JSONL snapshot file.
    ///
    /// A missing file starts an empty store; it is created on the first write.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ManagerError> {
        let path = path.as_ref().to_path_buf();
        let tables = match tokio::fs::read_to_string(&path).await {
            Ok(content) => Tables::from_jsonl(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}, starting empty", path.display());
                Tables::default()
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            "Loaded {} devices, {} connections, {} command logs from {}",
            tables.devices.len(),
            tables.connections.len(),
            tables.logs.len(),
            path.display()
        );
        Ok(Self {
            tables: RwLock::new(tables),
            snapshot: Some(path),
        })
    }

    /// Snapshot path, if persistence is enabled.
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }

    /// Applies `change` under the write lock.
    ///
    /// With a snapshot path the change is made on a copy of the tables, which
    /// replaces the live tables only once the snapshot has been written. A
    /// failed write leaves the store as it was.
    async fn mutate<R>(&self, change: impl FnOnce(&mut Tables) -> R) -> Result<R, ManagerError> {
        let mut tables = self.tables.write().await;
        let Some(path) = &self.snapshot else {
            return Ok(change(&mut *tables));
        };
        let mut next = tables.clone();
        let result = change(&mut next);
        write_snapshot(path, &next).await?;
        *tables = next;
        Ok(result)
    }
}

async fn write_snapshot(path: &Path, tables: &Tables) -> Result<(), ManagerError> {
    let tmp = path.with_extension("jsonl.tmp");
    tokio::fs::write(&tmp, tables.to_jsonl()?).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_device(&self, device: NewDevice) -> Result<DeviceRecord, ManagerError> {
        let record = self
            .mutate(|tables| {
                let record = device.into_record(tables.next_device_id());
                tables.devices.insert(record.id, record.clone());
                record
            })
            .await?;
        debug!("Inserted device {} '{}'", record.id, record.name);
        Ok(record)
    }

    async fn active_devices(&self) -> Result<Vec<DeviceRecord>, ManagerError> {
        let tables = self.tables.read().await;
        Ok(tables
            .devices
            .values()
            .filter(|d| d.is_active)
            .cloned()
            .collect())
    }

    async fn device(&self, id: i64) -> Result<Option<DeviceRecord>, ManagerError> {
        Ok(self.tables.read().await.devices.get(&id).cloned())
    }

    async fn deactivate_device(&self, id: i64) -> Result<bool, ManagerError> {
        let deactivated = self
            .mutate(|tables| match tables.devices.get_mut(&id) {
                Some(device) => {
                    device.is_active = false;
                    true
                }
                None => false,
            })
            .await?;
        if deactivated {
            debug!("Deactivated device {id}");
        }
        Ok(deactivated)
    }

    async fn open_connection(
        &self,
        device_id: i64,
        connection_type: &str,
        at: DateTime<Utc>,
    ) -> Result<ConnectionRecord, ManagerError> {
        let record = self
            .mutate(|tables| {
                let record = ConnectionRecord {
                    id: tables.next_connection_id(),
                    device_id,
                    connection_type: connection_type.to_string(),
                    start_time: at,
                    end_time: None,
                    status: ConnectionStatus::Active,
                };
                tables.connections.insert(record.id, record.clone());
                if let Some(device) = tables.devices.get_mut(&device_id) {
                    device.last_connected = Some(at);
                }
                record
            })
            .await?;
        debug!("Opened connection {} to device {device_id}", record.id);
        Ok(record)
    }

    async fn connection(&self, id: i64) -> Result<Option<ConnectionRecord>, ManagerError> {
        Ok(self.tables.read().await.connections.get(&id).cloned())
    }

    async fn close_connection(&self, id: i64, at: DateTime<Utc>) -> Result<bool, ManagerError> {
        let closed = self
            .mutate(|tables| match tables.connections.get_mut(&id) {
                Some(connection) if connection.is_active() => {
                    connection.status = ConnectionStatus::Closed;
                    connection.end_time = Some(at);
                    true
                }
                _ => false,
            })
            .await?;
        if closed {
            debug!("Closed connection {id}");
        }
        Ok(closed)
    }

    async fn append_command_log(
        &self,
        connection_id: i64,
        command: &str,
        output: &str,
        at: DateTime<Utc>,
    ) -> Result<CommandLog, ManagerError> {
        let log = self
            .mutate(|tables| {
                let log = CommandLog {
                    id: tables.next_log_id(),
                    connection_id,
                    command: command.to_string(),
                    output: output.to_string(),
                    timestamp: at,
                };
                tables.logs.push(log.clone());
                log
            })
            .await?;
        debug!("Logged '{command}' on connection {connection_id}");
        Ok(log)
    }

    async fn command_logs(&self, connection_id: i64) -> Result<Vec<CommandLog>, ManagerError> {
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .iter()
            .filter(|log| log.connection_id == connection_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router(name: &str) -> NewDevice {
        NewDevice {
            name: name.to_string(),
            ip_address: "192.168.1.1".to_string(),
            device_type: "router".to_string(),
            protocol: "ssh".to_string(),
            ..NewDevice::default()
        }
    }

    #[tokio::test]
    async fn ids_are_assigned_from_one_per_table() {
        let store = MemoryStore::new();
        let d1 = store.insert_device(router("r1")).await.expect("insert r1");
        let d2 = store.insert_device(router("r2")).await.expect("insert r2");
        let c1 = store
            .open_connection(d1.id, "ssh", Utc::now())
            .await
            .expect("open");

        assert_eq!((d1.id, d2.id, c1.id), (1, 2, 1));
    }

    #[tokio::test]
    async fn open_connection_stamps_last_connected() {
        let store = MemoryStore::new();
        let device = store.insert_device(router("r1")).await.expect("insert");
        let at = Utc::now();
        store
            .open_connection(device.id, "telnet", at)
            .await
            .expect("open");

        let device = store.device(device.id).await.expect("get").expect("exists");
        assert_eq!(device.last_connected, Some(at));
    }

    #[tokio::test]
    async fn close_connection_only_once() {
        let store = MemoryStore::new();
        let device = store.insert_device(router("r1")).await.expect("insert");
        let conn = store
            .open_connection(device.id, "ssh", Utc::now())
            .await
            .expect("open");

        assert!(store.close_connection(conn.id, Utc::now()).await.expect("close"));
        assert!(!store.close_connection(conn.id, Utc::now()).await.expect("close again"));
        assert!(!store.close_connection(99, Utc::now()).await.expect("close unknown"));

        let conn = store.connection(conn.id).await.expect("get").expect("exists");
        assert_eq!(conn.status, ConnectionStatus::Closed);
        assert!(conn.end_time.is_some());
    }

    #[tokio::test]
    async fn deactivated_devices_are_hidden_from_listing() {
        let store = MemoryStore::new();
        let d1 = store.insert_device(router("r1")).await.expect("insert r1");
        store.insert_device(router("r2")).await.expect("insert r2");

        assert!(store.deactivate_device(d1.id).await.expect("deactivate"));
        assert!(!store.deactivate_device(42).await.expect("deactivate unknown"));

        let names: Vec<_> = store
            .active_devices()
            .await
            .expect("list")
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["r2"]);
    }

    #[tokio::test]
    async fn command_logs_are_filtered_and_ordered() {
        let store = MemoryStore::new();
        let device = store.insert_device(router("r1")).await.expect("insert");
        let a = store.open_connection(device.id, "ssh", Utc::now()).await.expect("open a");
        let b = store.open_connection(device.id, "ssh", Utc::now()).await.expect("open b");

        store.append_command_log(a.id, "show version", "v1", Utc::now()).await.expect("log 1");
        store.append_command_log(b.id, "show clock", "t", Utc::now()).await.expect("log 2");
        store.append_command_log(a.id, "show interfaces", "i", Utc::now()).await.expect("log 3");

        let commands: Vec<_> = store
            .command_logs(a.id)
            .await
            .expect("logs")
            .into_iter()
            .map(|l| l.command)
            .collect();
        assert_eq!(commands, vec!["show version", "show interfaces"]);
    }

    #[tokio::test]
    async fn connection_with_device_requires_both_records() {
        let store = MemoryStore::new();
        let orphan = store.open_connection(7, "ssh", Utc::now()).await.expect("open");
        assert!(store.connection_with_device(orphan.id).await.expect("join").is_none());
        assert!(store.connection_with_device(99).await.expect("join").is_none());
    }

    #[tokio::test]
    async fn failed_snapshot_write_leaves_tables_unchanged() {
        let path = std::env::temp_dir()
            .join(format!("rcisco-missing-dir-{}", std::process::id()))
            .join("snapshot.jsonl");
        let store = MemoryStore::open(&path).await.expect("open");

        let err = store.insert_device(router("r1")).await.expect_err("unwritable");
        assert!(matches!(err, ManagerError::Io(_)));
        assert!(store.active_devices().await.expect("list").is_empty());

        let err = store
            .append_command_log(1, "show version", "v", Utc::now())
            .await
            .expect_err("unwritable");
        assert!(matches!(err, ManagerError::Io(_)));
        assert!(store.command_logs(1).await.expect("logs").is_empty());
    }

    #[test]
    fn jsonl_roundtrip_keeps_tables() {
        let mut tables = Tables::default();
        let device = router("r1").into_record(1);
        tables.devices.insert(1, device);
        tables.logs.push(CommandLog {
            id: 1,
            connection_id: 1,
            command: "show version".to_string(),
            output: "Version 1.0,".to_string(),
            timestamp: Utc::now(),
        });

        let jsonl = tables.to_jsonl().expect("encode");
        assert!(jsonl.lines().next().expect("first line").contains("\"kind\":\"device\""));
        let restored = Tables::from_jsonl(&jsonl).expect("decode");
        assert_eq!(restored, tables);
    }

    #[test]
    fn from_jsonl_rejects_garbage() {
        let err = Tables::from_jsonl("{not json").expect_err("should fail");
        assert!(matches!(err, ManagerError::Json(_)));
    }
}
