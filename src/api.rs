//! REST API over [`DeviceManager`].
//!
//! All routes live under `/api`. Bodies are JSON; errors are returned as
//! `{"error": "<message>"}` with a status code derived from [`ManagerError`].

use axum::{
    Router,
    extract::{Json, Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use log::warn;
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;

use crate::error::ManagerError;
use crate::models::{DeviceRecord, DeviceSummary, NewDevice};
use crate::parse::{
    BriefInterface, ParseKind, ParsedInterface, ParsedRunningConfig, ParsedVersionInfo,
};
use crate::service::DeviceManager;

/// Body of `POST /api/devices`.
///
/// `name`, `ip_address`, `device_type` and `protocol` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeviceRequest {
    pub name: Option<String>,
    pub ip_address: Option<String>,
    pub device_type: Option<String>,
    pub protocol: Option<String>,
    pub model: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub enable_password: Option<String>,
}

impl DeviceRequest {
    /// Checks required fields and converts into a [`NewDevice`].
    pub fn validate(self) -> Result<NewDevice, ManagerError> {
        let (Some(name), Some(ip_address), Some(device_type), Some(protocol)) =
            (self.name, self.ip_address, self.device_type, self.protocol)
        else {
            return Err(ManagerError::MissingFields);
        };
        Ok(NewDevice {
            name,
            ip_address,
            device_type,
            protocol,
            model: self.model.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            password: self.password,
            enable_password: self.enable_password,
        })
    }
}

/// Body of `POST /api/connect/network`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ConnectRequest {
    pub device_id: Option<i64>,
    pub protocol: Option<String>,
}

/// Body of `POST /api/send_command/{connection_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CommandRequest {
    pub command: Option<String>,
}

/// Response of `POST /api/devices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DeviceCreated {
    pub id: i64,
    pub message: String,
}

/// Response of `POST /api/connect/network`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Connected {
    pub connection_id: i64,
    pub status: String,
    pub message: String,
}

/// Response of `POST /api/send_command/{connection_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommandResult {
    pub command: String,
    pub output: String,
    pub timestamp: DateTime<Utc>,
}

/// Response of `POST /api/disconnect/{connection_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Disconnected {
    pub status: String,
    pub message: String,
}

impl ManagerError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<JsonRejection> for ManagerError {
    fn from(rejection: JsonRejection) -> Self {
        ManagerError::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ManagerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            warn!("Request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Builds the `/api` router.
///
/// CORS is open to any origin so browser frontends served elsewhere can
/// call the API.
pub fn router(manager: DeviceManager) -> Router {
    Router::new()
        .route("/api/devices", get(list_devices).post(add_device))
        .route("/api/devices/{device_id}", delete(remove_device))
        .route("/api/connect/network", post(connect_network))
        .route("/api/send_command/{connection_id}", post(send_command))
        .route("/api/disconnect/{connection_id}", post(disconnect))
        .route("/api/device_info/{connection_id}", get(device_info))
        .route("/api/parse/{connection_id}/{kind}", get(parse_output))
        .route("/api/schema", get(schema))
        .layer(CorsLayer::permissive())
        .with_state(manager)
}

pub async fn list_devices(
    State(manager): State<DeviceManager>,
) -> Result<Json<Vec<DeviceRecord>>, ManagerError> {
    Ok(Json(manager.list_devices().await?))
}

pub async fn add_device(
    State(manager): State<DeviceManager>,
    body: Result<Json<DeviceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DeviceCreated>), ManagerError> {
    let Json(request) = body?;
    let device = manager.add_device(request.validate()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(DeviceCreated {
            id: device.id,
            message: "Device added successfully".to_string(),
        }),
    ))
}

pub async fn remove_device(
    State(manager): State<DeviceManager>,
    Path(device_id): Path<i64>,
) -> Result<Json<Value>, ManagerError> {
    manager.remove_device(device_id).await?;
    Ok(Json(json!({ "message": "Device removed successfully" })))
}

pub async fn connect_network(
    State(manager): State<DeviceManager>,
    body: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<Connected>, ManagerError> {
    let Json(request) = body?;
    let (Some(device_id), Some(protocol)) = (request.device_id, request.protocol) else {
        return Err(ManagerError::MissingFields);
    };
    let connection = manager.connect(device_id, &protocol).await?;
    Ok(Json(Connected {
        connection_id: connection.id,
        status: "connected".to_string(),
        message: format!("Connected to device via {protocol}"),
    }))
}

pub async fn send_command(
    State(manager): State<DeviceManager>,
    Path(connection_id): Path<i64>,
    body: Result<Json<CommandRequest>, JsonRejection>,
) -> Result<Json<CommandResult>, ManagerError> {
    let Json(request) = body?;
    let command = request.command.ok_or(ManagerError::MissingCommand)?;
    let log = manager.send_command(connection_id, &command).await?;
    Ok(Json(CommandResult {
        command: log.command,
        output: log.output,
        timestamp: log.timestamp,
    }))
}

pub async fn disconnect(
    State(manager): State<DeviceManager>,
    Path(connection_id): Path<i64>,
) -> Result<Json<Disconnected>, ManagerError> {
    manager.disconnect(connection_id).await?;
    Ok(Json(Disconnected {
        status: "disconnected".to_string(),
        message: "Successfully disconnected from device".to_string(),
    }))
}

pub async fn device_info(
    State(manager): State<DeviceManager>,
    Path(connection_id): Path<i64>,
) -> Result<Json<DeviceSummary>, ManagerError> {
    Ok(Json(manager.device_info(connection_id).await?))
}

pub async fn parse_output(
    State(manager): State<DeviceManager>,
    Path((connection_id, kind)): Path<(i64, String)>,
) -> Result<Json<Value>, ManagerError> {
    let kind = ParseKind::from_name(&kind).ok_or(ManagerError::UnknownParseKind(kind))?;
    Ok(Json(manager.parse_latest(connection_id, kind).await?))
}

/// JSON schemas of the response types, keyed by type name.
pub fn api_schemas() -> Result<Value, ManagerError> {
    Ok(json!({
        "DeviceRecord": serde_json::to_value(schema_for!(DeviceRecord))?,
        "DeviceSummary": serde_json::to_value(schema_for!(DeviceSummary))?,
        "ParsedVersionInfo": serde_json::to_value(schema_for!(ParsedVersionInfo))?,
        "ParsedInterface": serde_json::to_value(schema_for!(ParsedInterface))?,
        "ParsedRunningConfig": serde_json::to_value(schema_for!(ParsedRunningConfig))?,
        "BriefInterface": serde_json::to_value(schema_for!(BriefInterface))?,
        "CommandResult": serde_json::to_value(schema_for!(CommandResult))?,
    }))
}

pub async fn schema() -> Result<Json<Value>, ManagerError> {
    Ok(Json(api_schemas()?))
}
