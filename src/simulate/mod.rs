//! Canned device output for simulated commands.
//!
//! No command ever reaches a real device; the manager records whatever this
//! module returns as the command's output.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Commands with canned output, in the order they are usually issued.
pub const SIMULATED_COMMANDS: &[&str] = &[
    "show version",
    "show interfaces",
    "show ip interface brief",
    "show running-config",
];

static OUTPUTS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    SIMULATED_COMMANDS
        .iter()
        .copied()
        .zip([
            include_str!("show_version.txt"),
            include_str!("show_interfaces.txt"),
            include_str!("show_ip_interface_brief.txt"),
            include_str!("show_running_config.txt"),
        ])
        .collect()
});

/// Returns the simulated output for `command`.
///
/// Matching is exact after trimming surrounding whitespace. Unknown commands
/// get a fixed "not recognized" message rather than an error.
pub fn simulate_output(command: &str) -> String {
    match OUTPUTS.get(command.trim()) {
        Some(output) => (*output).to_string(),
        None => format!("Command '{command}' not recognized or simulated in this example."),
    }
}

/// Returns true if `command` has canned output.
pub fn is_simulated(command: &str) -> bool {
    OUTPUTS.contains_key(command.trim())
}
