//! `show version` parser.

use log::trace;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::after;

const VERSION_MARKER: &str = "Version";
const UPTIME_MARKER: &str = "uptime is";
const IMAGE_MARKER: &str = "System image file is";

/// Fields extracted from `show version` output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParsedVersionInfo {
    /// IOS version string, e.g. `12.4(25d)`.
    pub version: Option<String>,
    /// Uptime text as printed, e.g. `2 days, 5 hours, 37 minutes`.
    pub uptime: Option<String>,
    /// Boot image path without surrounding quotes.
    pub system_image: Option<String>,
}

/// Parses `show version` output.
///
/// Each field takes the first line carrying its marker; later matches are
/// ignored. Text without any marker yields an all-`None` record.
pub fn parse_version(text: &str) -> ParsedVersionInfo {
    let mut info = ParsedVersionInfo::default();

    for line in text.lines() {
        if info.version.is_none()
            && let Some(rest) = after(line, VERSION_MARKER)
        {
            let version = rest.split(',').next().unwrap_or_default().trim();
            trace!("version line: '{line}' -> '{version}'");
            info.version = Some(version.to_string());
        }

        if info.uptime.is_none()
            && let Some(rest) = after(line, UPTIME_MARKER)
        {
            info.uptime = Some(rest.trim().to_string());
        }

        if info.system_image.is_none()
            && let Some(rest) = after(line, IMAGE_MARKER)
        {
            info.system_image = Some(rest.trim().trim_matches('"').to_string());
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHOW_VERSION: &str = r#"Cisco IOS Software, C2600 Software (C2600-IPBASE-M), Version 12.4(25d), RELEASE SOFTWARE (fc1)
Technical Support: http://www.cisco.com/techsupport
Copyright (c) 1986-2010 by Cisco Systems, Inc.

ROM: System Bootstrap, Version 12.2(8r) [fcz 8r], RELEASE SOFTWARE (fc1)

Router uptime is 2 days, 5 hours, 37 minutes
System returned to ROM by power-on
System image file is "flash:c2600-ipbase-mz.124-25d.bin"
"#;

    #[test]
    fn extracts_all_fields_from_ios_output() {
        let info = parse_version(SHOW_VERSION);
        assert_eq!(info.version.as_deref(), Some("12.4(25d)"));
        assert_eq!(info.uptime.as_deref(), Some("2 days, 5 hours, 37 minutes"));
        assert_eq!(
            info.system_image.as_deref(),
            Some("flash:c2600-ipbase-mz.124-25d.bin")
        );
    }

    #[test]
    fn first_version_line_wins() {
        let info = parse_version("ROM Version 1.0, boot\nIOS Version 2.0, main");
        assert_eq!(info.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn first_uptime_line_wins() {
        let info = parse_version("r1 uptime is 1 week\nr2 uptime is 3 days");
        assert_eq!(info.uptime.as_deref(), Some("1 week"));
    }

    #[test]
    fn text_without_markers_is_all_none() {
        let info = parse_version("nothing to see here\n\n");
        assert_eq!(info, ParsedVersionInfo::default());
    }

    #[test]
    fn lowercase_version_is_not_a_marker() {
        assert_eq!(parse_version("version 12.4").version, None);
    }

    #[test]
    fn version_without_comma_takes_the_rest_of_the_line() {
        let info = parse_version("Version 15.1(4)M");
        assert_eq!(info.version.as_deref(), Some("15.1(4)M"));
    }

    #[test]
    fn marker_at_end_of_line_yields_empty_value() {
        let info = parse_version("Version");
        assert_eq!(info.version.as_deref(), Some(""));
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse_version(SHOW_VERSION), parse_version(SHOW_VERSION));
    }
}
