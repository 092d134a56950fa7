//! Parsers for Cisco IOS command output.
//!
//! Every parser here is a pure function over the raw text captured in a
//! command log. They are total: malformed or unrelated input produces a
//! result with absent (`None`) or empty fields, never an error.
//!
//! # Main Components
//!
//! - [`parse_version`] - `show version` into [`ParsedVersionInfo`]
//! - [`parse_interfaces`] - `show interfaces` into [`ParsedInterface`] records
//! - [`parse_running_config`] - `show running-config` into [`ParsedRunningConfig`]
//! - [`parse_interfaces_brief`] - `show ip interface brief` into [`BriefInterface`] rows

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod brief;
pub mod interfaces;
pub mod running_config;
pub mod version;

pub use brief::{BriefInterface, parse_interfaces_brief};
pub use interfaces::{InterfaceScanner, LineKind, ParsedInterface, ScanState, parse_interfaces};
pub use running_config::{AccessLists, ParsedRunningConfig, StaticRoute, UserAccount, parse_running_config};
pub use version::{ParsedVersionInfo, parse_version};

/// Which parser to run against a logged command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ParseKind {
    Version,
    Interfaces,
    RunningConfig,
    InterfacesBrief,
}

impl ParseKind {
    /// All supported kinds.
    pub const ALL: [ParseKind; 4] = [
        ParseKind::Version,
        ParseKind::Interfaces,
        ParseKind::RunningConfig,
        ParseKind::InterfacesBrief,
    ];

    /// Resolves a kind from its URL name (`version`, `running-config`, ...).
    pub fn from_name(name: &str) -> Option<ParseKind> {
        match name.to_ascii_lowercase().as_str() {
            "version" => Some(ParseKind::Version),
            "interfaces" => Some(ParseKind::Interfaces),
            "running-config" => Some(ParseKind::RunningConfig),
            "interfaces-brief" => Some(ParseKind::InterfacesBrief),
            _ => None,
        }
    }

    /// The device command whose output this parser understands.
    pub fn command(&self) -> &'static str {
        match self {
            ParseKind::Version => "show version",
            ParseKind::Interfaces => "show interfaces",
            ParseKind::RunningConfig => "show running-config",
            ParseKind::InterfacesBrief => "show ip interface brief",
        }
    }

    /// Runs the parser and returns the result as JSON.
    pub fn parse_to_json(&self, text: &str) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            ParseKind::Version => serde_json::to_value(parse_version(text)),
            ParseKind::Interfaces => serde_json::to_value(parse_interfaces(text)),
            ParseKind::RunningConfig => serde_json::to_value(parse_running_config(text)),
            ParseKind::InterfacesBrief => serde_json::to_value(parse_interfaces_brief(text)),
        }
    }
}

/// Returns the text following the first occurrence of `marker`, up to the
/// next occurrence of it (if any).
pub(crate) fn after<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    line.split(marker).nth(1)
}

/// Returns true when the line starts with whitespace.
pub(crate) fn is_indented(line: &str) -> bool {
    line.starts_with(char::is_whitespace)
}
