//! Error types for device records, connections and command logs.
//!
//! Parsing never produces errors: every parser in [`crate::parse`] is total.
//! The variants below cover the record-store and request paths only.

use thiserror::Error;

/// Errors that can occur while managing devices, connections and command logs.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// No connection record exists for the given id.
    ///
    /// Also returned when the connection exists but its device record
    /// has disappeared, since the summary join yields nothing in that case.
    #[error("Connection not found")]
    ConnectionNotFound(i64),

    /// No device record exists for the given id.
    #[error("Device not found")]
    DeviceNotFound(i64),

    /// The connection was already closed.
    #[error("Connection {0} is closed")]
    ConnectionClosed(i64),

    /// The connection is unknown or was already closed when disconnecting.
    #[error("Connection not found or already closed")]
    NotActive(i64),

    /// A request body lacked one or more required fields.
    #[error("Missing required fields")]
    MissingFields,

    /// A request body was not valid JSON for the expected shape.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A command field was required but not provided.
    #[error("Command is required")]
    MissingCommand,

    /// No logged output exists for the requested command on this connection.
    #[error("no output logged for '{command}' on connection {connection_id}")]
    NoCommandOutput { connection_id: i64, command: String },

    /// The requested parse kind is not one of the supported parsers.
    #[error("unknown parse kind '{0}'")]
    UnknownParseKind(String),

    /// Reading or writing the snapshot file failed.
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a snapshot record failed.
    #[error("snapshot encode error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any other internal failure.
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl ManagerError {
    /// Returns true for errors that mean the referenced record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ManagerError::ConnectionNotFound(_)
                | ManagerError::DeviceNotFound(_)
                | ManagerError::NoCommandOutput { .. }
        )
    }

    /// Returns true for errors caused by the client's request.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ManagerError::ConnectionClosed(_)
                | ManagerError::NotActive(_)
                | ManagerError::MissingFields
                | ManagerError::InvalidBody(_)
                | ManagerError::MissingCommand
                | ManagerError::UnknownParseKind(_)
        )
    }
}
