//! `show interfaces` parser.
//!
//! The output is a sequence of interface blocks. Each block starts with a
//! non-indented header line (`FastEthernet0/0 is up, line protocol is up`)
//! followed by indented detail lines. The parser is a two-state scanner:
//! [`ScanState::Outside`] between blocks and [`ScanState::Inside`] while a
//! block is open. [`classify`] maps each line to a [`LineKind`] and [`step`]
//! is the transition function.

use log::trace;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{after, is_indented};

const HEADER_MARKER: &str = "is ";
const PROTOCOL_MARKER: &str = "line protocol is ";

/// One interface block from `show interfaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedInterface {
    /// Interface name as printed in the header line.
    pub name: String,
    /// Link status, e.g. `up` or `administratively down`.
    pub link_status: String,
    pub protocol_status: Option<String>,
    /// Address with prefix length, e.g. `192.168.1.1/24`.
    pub ip_address: Option<String>,
    pub mtu: Option<String>,
    /// Bandwidth token as printed, e.g. `100000`.
    pub bandwidth: Option<String>,
    pub duplex: Option<String>,
    /// Speed formatted as `<value> Mb/s`.
    pub speed: Option<String>,
    pub description: Option<String>,
}

/// Category of a single line of `show interfaces` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Non-indented line containing `is `: starts a new interface.
    Header(&'a str),
    /// Indented line carrying attributes of the open interface.
    Detail(&'a str),
    /// Non-indented line without `is `: ends the open interface.
    Separator,
    /// Empty line, no effect.
    Blank,
}

/// Scanner state between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScanState {
    #[default]
    Outside,
    Inside(ParsedInterface),
}

/// Classifies one line of output.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        LineKind::Blank
    } else if is_indented(line) {
        LineKind::Detail(line)
    } else if line.contains(HEADER_MARKER) {
        LineKind::Header(line)
    } else {
        LineKind::Separator
    }
}

/// Transition function of the scanner.
///
/// Returns the next state and the interface record completed by this line,
/// if any.
pub fn step(state: ScanState, kind: LineKind<'_>) -> (ScanState, Option<ParsedInterface>) {
    match (state, kind) {
        (state, LineKind::Header(line)) => {
            let closed = match state {
                ScanState::Inside(current) => Some(current),
                ScanState::Outside => None,
            };
            (ScanState::Inside(parse_header(line)), closed)
        }
        (ScanState::Inside(mut current), LineKind::Detail(line)) => {
            apply_detail(&mut current, line);
            (ScanState::Inside(current), None)
        }
        (ScanState::Inside(current), LineKind::Separator) => (ScanState::Outside, Some(current)),
        (state, LineKind::Blank) => (state, None),
        (ScanState::Outside, LineKind::Detail(_) | LineKind::Separator) => {
            (ScanState::Outside, None)
        }
    }
}

/// Incremental driver over [`step`] that collects completed interfaces.
#[derive(Debug, Default)]
pub struct InterfaceScanner {
    state: ScanState,
    interfaces: Vec<ParsedInterface>,
}

impl InterfaceScanner {
    /// Creates a scanner in the [`ScanState::Outside`] state.
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn state(&self) -> &ScanState {
        &self.state
    }

    /// Feeds one line of output.
    pub fn feed(&mut self, line: &str) {
        let state = std::mem::take(&mut self.state);
        let (next, closed) = step(state, classify(line));
        if let Some(interface) = closed {
            trace!("Closed interface block: '{}'", interface.name);
            self.interfaces.push(interface);
        }
        self.state = next;
    }

    /// Ends the input, emitting any interface still open.
    pub fn finish(mut self) -> Vec<ParsedInterface> {
        if let ScanState::Inside(current) = self.state {
            self.interfaces.push(current);
        }
        self.interfaces
    }
}

/// Parses `show interfaces` output into one record per header line, in text order.
pub fn parse_interfaces(text: &str) -> Vec<ParsedInterface> {
    let mut scanner = InterfaceScanner::new();
    for line in text.lines() {
        scanner.feed(line);
    }
    scanner.finish()
}

fn parse_header(line: &str) -> ParsedInterface {
    let name = line.split(HEADER_MARKER).next().unwrap_or_default().trim();
    let link_status = after(line, HEADER_MARKER)
        .and_then(|rest| rest.split(',').next())
        .unwrap_or_default()
        .trim();
    let protocol_status = after(line, PROTOCOL_MARKER)
        .and_then(|rest| rest.split_whitespace().next())
        .map(str::to_string);

    ParsedInterface {
        name: name.to_string(),
        link_status: link_status.to_string(),
        protocol_status,
        ..ParsedInterface::default()
    }
}

// Markers are checked independently; one line may set several fields.
fn apply_detail(interface: &mut ParsedInterface, line: &str) {
    if let Some(ip) = after(line, "Internet address is").and_then(first_token) {
        interface.ip_address = Some(ip);
    }

    if line.contains("MTU")
        && line.contains("bytes")
        && let Some(rest) = after(line, "MTU")
    {
        let mtu = rest.split("bytes").next().unwrap_or_default().trim();
        interface.mtu = Some(mtu.to_string());
    }

    if let Some(bw) = after(line, "BW").and_then(first_token) {
        interface.bandwidth = Some(bw);
    }

    let lower = line.to_lowercase();
    if lower.contains("duplex") {
        let mut parts = lower.split("duplex");
        let duplex = parts.next().unwrap_or_default().trim();
        interface.duplex = Some(duplex.to_string());

        if lower.contains("mb/s") {
            let speed = parts
                .next()
                .and_then(|rest| rest.split("mb/s").next())
                .unwrap_or_default()
                .trim();
            interface.speed = Some(format!("{speed} Mb/s"));
        }
    }

    if let Some(desc) = after(line, "Description:") {
        interface.description = Some(desc.trim().to_string());
    }
}

fn first_token(rest: &str) -> Option<String> {
    rest.split_whitespace().next().map(str::to_string)
}
