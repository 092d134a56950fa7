//! `show running-config` parser.
//!
//! The configuration is read by independent reducers, each a pure function
//! over the same line slice: [`hostname`], [`interface_blocks`],
//! [`static_routes`], [`services`], [`access_lists`] and [`users`]. None of
//! them depends on another's result.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::is_indented;

/// Access-list buckets keyed by number or name, in first-seen order.
pub type AccessLists = IndexMap<String, Vec<String>>;

/// An `ip route` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StaticRoute {
    pub destination: String,
    pub mask: String,
    /// Next-hop address or exit interface.
    pub next_hop: Option<String>,
}

/// A `username` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserAccount {
    pub username: String,
    pub privilege: Option<String>,
}

/// Sections extracted from `show running-config` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedRunningConfig {
    pub hostname: Option<String>,
    /// Interface name to its configuration lines, stripped, in text order.
    pub interfaces: IndexMap<String, Vec<String>>,
    pub static_routes: Vec<StaticRoute>,
    /// Raw `service ...` lines, duplicates kept.
    pub services: Vec<String>,
    pub access_lists: AccessLists,
    pub users: Vec<UserAccount>,
}

/// Parses `show running-config` output.
pub fn parse_running_config(text: &str) -> ParsedRunningConfig {
    let lines: Vec<&str> = text.lines().collect();

    ParsedRunningConfig {
        hostname: hostname(&lines),
        interfaces: interface_blocks(&lines),
        static_routes: static_routes(&lines),
        services: services(&lines),
        access_lists: access_lists(&lines),
        users: users(&lines),
    }
}

/// First `hostname <name>` value.
///
/// A bare `hostname` line without a value does not count as a match.
pub fn hostname(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter(|line| line.starts_with("hostname"))
        .find_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}

/// `interface <name>` blocks and their indented configuration lines.
///
/// Redeclaring an interface resets its line list.
pub fn interface_blocks(lines: &[&str]) -> IndexMap<String, Vec<String>> {
    let mut blocks: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut open: Option<String> = None;

    for line in lines {
        if line.starts_with("interface") {
            open = line.split_whitespace().nth(1).map(str::to_string);
            if let Some(name) = &open {
                blocks.insert(name.clone(), Vec::new());
            }
        } else if is_indented(line) {
            if let Some(block) = open.as_ref().and_then(|name| blocks.get_mut(name)) {
                block.push(line.trim().to_string());
            }
        } else {
            open = None;
        }
    }

    blocks
}

/// `ip route <destination> <mask> [next-hop]` statements.
pub fn static_routes(lines: &[&str]) -> Vec<StaticRoute> {
    lines
        .iter()
        .filter(|line| line.starts_with("ip route"))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return None;
            }
            Some(StaticRoute {
                destination: parts[2].to_string(),
                mask: parts[3].to_string(),
                next_hop: parts.get(4).map(|s| s.to_string()),
            })
        })
        .collect()
}

/// `service ...` directives.
pub fn services(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.starts_with("service"))
        .map(|line| line.trim().to_string())
        .collect()
}

/// Numbered (`access-list <id> ...`) and named (`ip access-list <type> <name>`)
/// access lists in one mapping.
///
/// Entries of a named list are the indented lines that follow its header.
/// Any non-indented line, a numbered entry included, ends the named list.
pub fn access_lists(lines: &[&str]) -> AccessLists {
    let mut lists = AccessLists::new();
    let mut named: Option<String> = None;

    for line in lines {
        if line.starts_with("access-list") {
            named = None;
            if let Some(id) = line.split_whitespace().nth(1) {
                lists
                    .entry(id.to_string())
                    .or_default()
                    .push(line.trim().to_string());
            }
        } else if line.starts_with("ip access-list") {
            named = line.split_whitespace().nth(3).map(str::to_string);
            if let Some(name) = &named {
                lists.entry(name.clone()).or_default();
            }
        } else if is_indented(line) {
            if let Some(entries) = named.as_ref().and_then(|name| lists.get_mut(name)) {
                entries.push(line.trim().to_string());
            }
        } else {
            named = None;
        }
    }

    lists
}

/// `username <name> [privilege <level>] ...` accounts with at least four tokens.
pub fn users(lines: &[&str]) -> Vec<UserAccount> {
    lines
        .iter()
        .filter(|line| line.starts_with("username"))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return None;
            }
            Some(UserAccount {
                username: parts[1].to_string(),
                privilege: (parts[2] == "privilege").then(|| parts[3].to_string()),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RUNNING_CONFIG: &str = r"Building configuration...
!
version 12.4
service timestamps debug datetime msec
service timestamps log datetime msec
no service password-encryption
!
hostname Router1
!
username admin privilege 15 secret 5 $1$abc
username guest secret x
!
interface FastEthernet0/0
 description LAN Interface
 ip address 192.168.1.1 255.255.255.0
!
interface Serial0/0
 no ip address
 shutdown
!
ip route 0.0.0.0 0.0.0.0 FastEthernet0/0
ip route 10.0.0.0 255.0.0.0
!
access-list 101 permit ip any any
ip access-list extended MGMT
 permit tcp any any eq 22
 deny ip any any log
access-list 101 deny icmp any any
!
end
";

    #[test]
    fn hostname_is_second_token() {
        assert_eq!(
            parse_running_config(RUNNING_CONFIG).hostname.as_deref(),
            Some("Router1")
        );
    }

    #[test]
    fn bare_hostname_line_is_skipped() {
        assert_eq!(hostname(&["hostname", "hostname R2"]).as_deref(), Some("R2"));
        assert_eq!(hostname(&["hostname"]), None);
    }

    #[test]
    fn interface_blocks_collect_indented_lines() {
        let config = parse_running_config(RUNNING_CONFIG);
        let names: Vec<_> = config.interfaces.keys().cloned().collect();
        assert_eq!(names, vec!["FastEthernet0/0", "Serial0/0"]);
        assert_eq!(
            config.interfaces["FastEthernet0/0"],
            vec!["description LAN Interface", "ip address 192.168.1.1 255.255.255.0"]
        );
        assert_eq!(config.interfaces["Serial0/0"], vec!["no ip address", "shutdown"]);
    }

    #[test]
    fn redeclared_interface_starts_over() {
        let blocks = interface_blocks(&["interface Gi0/0", " shutdown", "!", "interface Gi0/0", " no shutdown"]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks["Gi0/0"], vec!["no shutdown"]);
    }

    #[test]
    fn indented_lines_after_a_closed_block_are_dropped() {
        let blocks = interface_blocks(&["interface Gi0/0", "!", " shutdown"]);
        assert!(blocks["Gi0/0"].is_empty());
    }

    #[test]
    fn static_routes_take_optional_next_hop() {
        let config = parse_running_config(RUNNING_CONFIG);
        assert_eq!(
            config.static_routes,
            vec![
                StaticRoute {
                    destination: "0.0.0.0".to_string(),
                    mask: "0.0.0.0".to_string(),
                    next_hop: Some("FastEthernet0/0".to_string()),
                },
                StaticRoute {
                    destination: "10.0.0.0".to_string(),
                    mask: "255.0.0.0".to_string(),
                    next_hop: None,
                },
            ]
        );
    }

    #[test]
    fn short_route_lines_are_ignored() {
        assert!(static_routes(&["ip route 0.0.0.0"]).is_empty());
    }

    #[test]
    fn services_keep_duplicates_and_skip_negations() {
        let svc = services(&["service a", "service a", "no service b"]);
        assert_eq!(svc, vec!["service a", "service a"]);
    }

    #[test]
    fn numbered_and_named_access_lists_share_one_mapping() {
        let config = parse_running_config(RUNNING_CONFIG);
        assert_eq!(
            config.access_lists["101"],
            vec!["access-list 101 permit ip any any", "access-list 101 deny icmp any any"]
        );
        assert_eq!(
            config.access_lists["MGMT"],
            vec!["permit tcp any any eq 22", "deny ip any any log"]
        );
        let ids: Vec<_> = config.access_lists.keys().cloned().collect();
        assert_eq!(ids, vec!["101", "MGMT"]);
    }

    #[test]
    fn named_list_without_entries_is_still_created() {
        let lists = access_lists(&["ip access-list standard EMPTY", "!"]);
        assert!(lists["EMPTY"].is_empty());
    }

    #[test]
    fn users_with_and_without_privilege() {
        let config = parse_running_config(RUNNING_CONFIG);
        assert_eq!(
            config.users,
            vec![
                UserAccount {
                    username: "admin".to_string(),
                    privilege: Some("15".to_string()),
                },
                UserAccount {
                    username: "guest".to_string(),
                    privilege: None,
                },
            ]
        );
    }

    #[test]
    fn short_username_lines_are_ignored() {
        assert!(users(&["username bob secret"]).is_empty());
    }

    #[test]
    fn empty_config_yields_empty_sections() {
        assert_eq!(parse_running_config(""), ParsedRunningConfig::default());
    }
}
