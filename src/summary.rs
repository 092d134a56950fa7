//! Device summary aggregation over a connection's command logs.

use log::trace;

use crate::error::ManagerError;
use crate::models::{CommandLog, DeviceRecord, DeviceSummary};
use crate::parse::parse_version;

/// Placeholder for fields with no known value.
pub const UNKNOWN: &str = "Unknown";

const VERSION_COMMAND: &str = "show version";
const INTERFACES_COMMAND: &str = "show interfaces";
const INTERFACE_FAMILIES: &[&str] = &["Ethernet", "Serial", "GigabitEthernet"];

/// Interface counts derived from one `show interfaces` output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceCounts {
    pub total: u32,
    pub up: u32,
}

/// Counts output lines naming an Ethernet, Serial or GigabitEthernet
/// interface, and how many of those also contain `is up`.
///
/// Each line counts at most once.
pub fn count_interfaces(output: &str) -> InterfaceCounts {
    output
        .lines()
        .filter(|line| INTERFACE_FAMILIES.iter().any(|family| line.contains(family)))
        .fold(InterfaceCounts::default(), |mut counts, line| {
            counts.total += 1;
            if line.contains("is up") {
                counts.up += 1;
            }
            counts
        })
}

/// Returns true for logs the summary reads.
pub fn is_summary_command(command: &str) -> bool {
    command.contains(VERSION_COMMAND) || command.contains(INTERFACES_COMMAND)
}

/// Builds the summary for `connection_id`.
///
/// `device` is the device joined to the connection; `None` means the
/// connection (or its device) does not exist and yields
/// [`ManagerError::ConnectionNotFound`]. `log_lookup` supplies the
/// connection's logs in the order they were recorded.
///
/// Logs are applied in order and later ones overwrite earlier results:
/// the last `show version` log carrying a version sets `ios_version`, and
/// the last `show interfaces` log sets both interface counts.
pub fn build_device_summary<F>(
    device: Option<&DeviceRecord>,
    connection_id: i64,
    log_lookup: F,
) -> Result<DeviceSummary, ManagerError>
where
    F: FnOnce(i64) -> Vec<CommandLog>,
{
    let device = device.ok_or(ManagerError::ConnectionNotFound(connection_id))?;

    let model = if device.model.is_empty() {
        UNKNOWN.to_string()
    } else {
        device.model.clone()
    };
    let mut summary = DeviceSummary {
        name: device.name.clone(),
        model,
        device_type: device.device_type.clone(),
        ios_version: UNKNOWN.to_string(),
        total_interfaces: 0,
        interfaces_up: 0,
    };

    for log in log_lookup(connection_id)
        .iter()
        .filter(|log| is_summary_command(&log.command))
    {
        if log.command.contains(VERSION_COMMAND)
            && let Some(version) = parse_version(&log.output).version
        {
            trace!("log {}: ios_version '{version}'", log.id);
            summary.ios_version = version;
        }

        if log.command.contains(INTERFACES_COMMAND) {
            let counts = count_interfaces(&log.output);
            trace!("log {}: {counts:?}", log.id);
            summary.total_interfaces = counts.total;
            summary.interfaces_up = counts.up;
        }
    }

    Ok(summary)
}
