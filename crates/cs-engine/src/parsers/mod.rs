//! Access-log grammars with fixed-priority auto-detection.
//!
//! Supports Apache Combined, Apache Common, and the Nginx access format
//! (with or without a trailing X-Forwarded-For field). Detection tries
//! Combined → Common → Nginx; the first grammar whose required fields all
//! parse wins.

pub mod apache;
pub mod nginx;

use chrono::{DateTime, FixedOffset};
use cs_model::LogRecord;
use serde::{Deserialize, Serialize};

/// Supported access-log grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLogFormat {
    ApacheCombined,
    ApacheCommon,
    Nginx,
}

/// Grammar priority for auto-detection, most specific first.
pub const DETECTION_ORDER: [AccessLogFormat; 3] = [
    AccessLogFormat::ApacheCombined,
    AccessLogFormat::ApacheCommon,
    AccessLogFormat::Nginx,
];

/// Parse one logical line under a pinned grammar.
///
/// Returns `None` when the line does not conform — a parse failure for
/// the caller to count, never a fatal condition.
pub fn parse_line(line: &str, format: AccessLogFormat) -> Option<LogRecord> {
    match format {
        AccessLogFormat::ApacheCombined => apache::parse_combined(line),
        AccessLogFormat::ApacheCommon => apache::parse_common(line),
        AccessLogFormat::Nginx => nginx::parse(line),
    }
}

/// Parse with auto-detection over [`DETECTION_ORDER`].
pub fn parse_auto(line: &str) -> Option<(LogRecord, AccessLogFormat)> {
    for format in DETECTION_ORDER {
        if let Some(record) = parse_line(line, format) {
            return Some((record, format));
        }
    }
    None
}

/// Bracketed CLF timestamp, e.g. `15/Jan/2024:10:15:42 +0000`.
pub(crate) fn parse_clf_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(s, "%d/%b/%Y:%H:%M:%S %z").ok()
}

/// Size field: `-` means unknown, not zero.
pub(crate) fn parse_size(s: &str) -> Option<Option<u64>> {
    if s == "-" {
        return Some(None);
    }
    s.parse::<u64>().ok().map(Some)
}

/// Empty or `-` fields map to `None`.
pub(crate) fn dash_opt(s: &str) -> Option<String> {
    match s {
        "" | "-" => None,
        other => Some(other.to_string()),
    }
}
