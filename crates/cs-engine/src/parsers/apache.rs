//! Apache Combined and Common log format parsers.

use std::sync::LazyLock;

use cs_model::LogRecord;
use regex::Regex;

use super::{dash_opt, parse_clf_timestamp, parse_size};

// Combined: %h %l %u %t "%r" %>s %b "%{Referer}i" "%{User-Agent}i"
static RE_COMBINED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S+) (\S+) (\S+) \[([^\]]+)\] "([^"]*)" (\d{3}) (-|\d+) "([^"]*)" "([^"]*)"\s*$"#,
    )
    .unwrap()
});

// Common: %h %l %u %t "%r" %>s %b
static RE_COMMON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(\S+) (\S+) (\S+) \[([^\]]+)\] "([^"]*)" (\d{3}) (-|\d+)\s*$"#).unwrap());

/// Try to parse a line as Apache Combined.
pub fn parse_combined(line: &str) -> Option<LogRecord> {
    let caps = RE_COMBINED.captures(line)?;
    let timestamp = parse_clf_timestamp(&caps[4])?;
    let (method, path) = split_request(&caps[5])?;
    Some(LogRecord {
        client_ip: caps[1].to_string(),
        timestamp,
        method,
        path,
        status: caps[6].parse().ok()?,
        bytes: parse_size(&caps[7])?,
        referrer: dash_opt(&caps[8]),
        user_agent: caps[9].to_string(),
    })
}

/// Try to parse a line as Apache Common (no referrer/user-agent).
pub fn parse_common(line: &str) -> Option<LogRecord> {
    let caps = RE_COMMON.captures(line)?;
    let timestamp = parse_clf_timestamp(&caps[4])?;
    let (method, path) = split_request(&caps[5])?;
    Some(LogRecord {
        client_ip: caps[1].to_string(),
        timestamp,
        method,
        path,
        status: caps[6].parse().ok()?,
        bytes: parse_size(&caps[7])?,
        referrer: None,
        user_agent: String::new(),
    })
}

// "%r" is METHOD SP PATH SP PROTOCOL; both leading parts are required
// under the Apache grammars.
fn split_request(request: &str) -> Option<(String, String)> {
    let mut parts = request.split_whitespace();
    let method = parts.next()?;
    let path = parts.next()?;
    Some((method.to_string(), path.to_string()))
}
