//! `show ip interface brief` parser.

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

static ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<interface>\S+)\s+(?P<ip>\S+)\s+(?P<ok>YES|NO)\s+(?P<method>\S+)\s+(?P<status>administratively down|\S+)\s+(?P<protocol>\S+)\s*$",
    )
    .expect("interface brief row regex is valid")
});

/// One row of the `show ip interface brief` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BriefInterface {
    pub interface: String,
    /// Address or `unassigned`.
    pub ip_address: String,
    pub ok: bool,
    /// How the address was assigned, e.g. `NVRAM`, `manual`, `DHCP`.
    pub method: String,
    pub status: String,
    pub protocol: String,
}

/// Parses the table rows, skipping the column header and anything that does
/// not look like a row.
pub fn parse_interfaces_brief(text: &str) -> Vec<BriefInterface> {
    text.lines()
        .filter_map(|line| ROW.captures(line))
        .filter(|caps| &caps["interface"] != "Interface")
        .map(|caps| BriefInterface {
            interface: caps["interface"].to_string(),
            ip_address: caps["ip"].to_string(),
            ok: &caps["ok"] == "YES",
            method: caps["method"].to_string(),
            status: caps["status"].to_string(),
            protocol: caps["protocol"].to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIEF: &str = "Interface                  IP-Address      OK? Method Status                Protocol\n\
FastEthernet0/0            192.168.1.1     YES NVRAM  up                    up      \n\
FastEthernet0/1            unassigned      YES NVRAM  administratively down down    \n\
Loopback0                  10.1.1.1        YES NVRAM  up                    up      \n";

    #[test]
    fn rows_are_parsed_in_order_without_header() {
        let rows = parse_interfaces_brief(BRIEF);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].interface, "FastEthernet0/0");
        assert_eq!(rows[0].ip_address, "192.168.1.1");
        assert!(rows[0].ok);
        assert_eq!(rows[0].method, "NVRAM");
        assert_eq!(rows[2].interface, "Loopback0");
    }

    #[test]
    fn two_word_status_is_kept_whole() {
        let rows = parse_interfaces_brief(BRIEF);
        assert_eq!(rows[1].status, "administratively down");
        assert_eq!(rows[1].protocol, "down");
        assert_eq!(rows[1].ip_address, "unassigned");
    }

    #[test]
    fn unrelated_text_yields_no_rows() {
        assert!(parse_interfaces_brief("% Invalid input detected at '^' marker.").is_empty());
        assert!(parse_interfaces_brief("").is_empty());
    }
}
