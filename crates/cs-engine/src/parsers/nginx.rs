//! Nginx access-log parser.
//!
//! The default Nginx format is near-identical to Apache Combined, so most
//! Nginx lines are claimed by the Combined grammar first. This parser
//! picks up the variants Combined cannot: an optional trailing quoted
//! X-Forwarded-For field and degenerate request lines (`"-"`, or a
//! request without a protocol token).

use std::sync::LazyLock;

use cs_model::LogRecord;
use regex::Regex;

use super::{dash_opt, parse_clf_timestamp, parse_size};

// $remote_addr - $remote_user [$time_local] "$request" $status
// $body_bytes_sent "$http_referer" "$http_user_agent" ["$http_x_forwarded_for"]
static RE_NGINX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\S+) - (\S+) \[([^\]]+)\] "([^"]*)" (\d{3}) (-|\d+) "([^"]*)" "([^"]*)"(?: "([^"]*)")?\s*$"#,
    )
    .unwrap()
});

/// Try to parse a line as Nginx access format.
pub fn parse(line: &str) -> Option<LogRecord> {
    let caps = RE_NGINX.captures(line)?;
    let timestamp = parse_clf_timestamp(&caps[3])?;
    let (method, path) = split_request_lenient(&caps[4]);
    Some(LogRecord {
        client_ip: caps[1].to_string(),
        timestamp,
        method,
        path,
        status: caps[5].parse().ok()?,
        bytes: parse_size(&caps[6])?,
        referrer: dash_opt(&caps[7]),
        user_agent: caps[8].to_string(),
    })
}

// Nginx logs whatever arrived on the request line; `-` and proto-less
// requests still produce a record.
fn split_request_lenient(request: &str) -> (String, String) {
    let mut parts = request.split_whitespace();
    let method = parts.next().unwrap_or("-").to_string();
    let path = parts.next().unwrap_or("-").to_string();
    (method, path)
}
