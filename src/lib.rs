//! # rcisco - Simulated Cisco IOS Session Recorder
//!
//! `rcisco` is a REST service for recording and querying simulated interactions
//! with Cisco IOS devices. Clients register devices, open a logical connection
//! record, submit commands against it, and read back device-state summaries
//! parsed from the logged command output. No session to a real device is ever
//! established.
//!
//! ## Features
//!
//! - **Output Parsers**: Total, pure parsers for `show version`, `show interfaces`,
//!   `show running-config` and `show ip interface brief`
//! - **Device Summaries**: IOS version and interface counts folded from a connection's logs
//! - **Record Store**: Async storage trait with an in-memory store and JSONL snapshots
//! - **REST API**: axum routes for devices, connections, commands and parsed output
//!
//! ## Quick Start
//!
//! ```rust
//! use rcisco::parse::{parse_interfaces, parse_version};
//!
//! let version = parse_version("Cisco IOS Software, Version 12.4(25d), RELEASE SOFTWARE");
//! assert_eq!(version.version.as_deref(), Some("12.4(25d)"));
//!
//! let interfaces = parse_interfaces(
//!     "FastEthernet0/0 is up, line protocol is up\n  Internet address is 192.168.1.1/24\n",
//! );
//! assert_eq!(interfaces[0].ip_address.as_deref(), Some("192.168.1.1/24"));
//! ```
//!
//! ## Main Components
//!
//! - [`parse`] - Command output parsers
//! - [`summary::build_device_summary`] - Device summary aggregation
//! - [`store::RecordStore`] - Device, connection and command-log storage
//! - [`service::DeviceManager`] - Operations behind the REST API
//! - [`api::router`] - axum router
//! - [`error::ManagerError`] - Error type for store and request failures
//! - [`config`] - Server configuration

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod parse;
pub mod service;
pub mod simulate;
pub mod store;
pub mod summary;
