//! Access-log record types and their derived bucketing.

use chrono::{DateTime, FixedOffset, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

// ── Log Record ────────────────────────────────────────────────

/// One validated request entry from an access log.
///
/// Immutable once constructed — the parsers build it, the classifier and
/// aggregation engine only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Client IP address as it appeared in the log.
    pub client_ip: String,
    /// Request timestamp with its original timezone offset.
    pub timestamp: DateTime<FixedOffset>,
    /// HTTP method (GET, POST, ...).
    pub method: String,
    /// Request path, query component included.
    pub path: String,
    /// HTTP status code as logged.
    pub status: u16,
    /// Response size in bytes; `None` when the log recorded `-`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    /// Referrer header, if the grammar carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    /// Raw user-agent string; may be empty.
    pub user_agent: String,
}

impl LogRecord {
    /// Status class of this record's status code.
    pub fn status_class(&self) -> StatusClass {
        StatusClass::from_status(self.status)
    }

    /// Hour bucket in the record's original offset.
    pub fn hour_bucket(&self) -> LocalBucket {
        LocalBucket::hour_of(&self.timestamp)
    }
}

// ── Status Class ──────────────────────────────────────────────

/// Leading-digit class of an HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatusClass {
    #[serde(rename = "1xx")]
    Informational,
    #[serde(rename = "2xx")]
    Success,
    #[serde(rename = "3xx")]
    Redirect,
    #[serde(rename = "4xx")]
    ClientError,
    #[serde(rename = "5xx")]
    ServerError,
    /// Anything outside 100–599.
    #[serde(rename = "other")]
    Other,
}

impl StatusClass {
    pub fn from_status(status: u16) -> Self {
        match status {
            100..=199 => Self::Informational,
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Informational => "1xx",
            Self::Success => "2xx",
            Self::Redirect => "3xx",
            Self::ClientError => "4xx",
            Self::ServerError => "5xx",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Local Bucket ──────────────────────────────────────────────

/// A truncated local wall-clock instant plus its original UTC offset.
///
/// Buckets keep the offset: identical UTC instants logged under different
/// offsets occupy different buckets. There is no timezone normalization
/// anywhere in the pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LocalBucket {
    /// Bucket start in local wall-clock time.
    pub start: NaiveDateTime,
    /// UTC offset in seconds east of Greenwich.
    pub offset_secs: i32,
}

impl LocalBucket {
    /// Truncate to the containing hour.
    pub fn hour_of(ts: &DateTime<FixedOffset>) -> Self {
        Self::truncated(ts, 3600)
    }

    /// Truncate to a bucket of `width_secs` seconds within the local day.
    pub fn truncated(ts: &DateTime<FixedOffset>, width_secs: u32) -> Self {
        let local = ts.naive_local();
        let secs = local.time().num_seconds_from_midnight();
        let bucket_secs = (secs / width_secs) * width_secs;
        let start = local.date().and_time(
            NaiveTime::from_num_seconds_from_midnight_opt(bucket_secs, 0)
                .expect("truncated bucket start stays within the day"),
        );
        Self {
            start,
            offset_secs: ts.offset().local_minus_utc(),
        }
    }
}

impl std::fmt::Display for LocalBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.offset_secs < 0 { '-' } else { '+' };
        let abs = self.offset_secs.unsigned_abs();
        write!(
            f,
            "{} {}{:02}{:02}",
            self.start.format("%Y-%m-%d %H:%M"),
            sign,
            abs / 3600,
            (abs % 3600) / 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_str(s, "%d/%b/%Y:%H:%M:%S %z").unwrap()
    }

    fn sample_record() -> LogRecord {
        LogRecord {
            client_ip: "203.0.113.7".into(),
            timestamp: ts("15/Jan/2024:10:15:42 +0200"),
            method: "GET".into(),
            path: "/index.html?utm=1".into(),
            status: 200,
            bytes: Some(5120),
            referrer: Some("https://example.com/".into()),
            user_agent: "Mozilla/5.0 (compatible; Googlebot/2.1)".into(),
        }
    }

    #[test]
    fn record_roundtrip() {
        let record = sample_record();
        let json = serde_json::to_string(&record).unwrap();
        let back: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn unknown_size_omitted_from_json() {
        let mut record = sample_record();
        record.bytes = None;
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("bytes"));
    }

    #[test]
    fn status_class_mapping() {
        assert_eq!(StatusClass::from_status(101), StatusClass::Informational);
        assert_eq!(StatusClass::from_status(200), StatusClass::Success);
        assert_eq!(StatusClass::from_status(304), StatusClass::Redirect);
        assert_eq!(StatusClass::from_status(404), StatusClass::ClientError);
        assert_eq!(StatusClass::from_status(503), StatusClass::ServerError);
        assert_eq!(StatusClass::from_status(99), StatusClass::Other);
        assert_eq!(StatusClass::from_status(600), StatusClass::Other);
        assert_eq!(StatusClass::from_status(0), StatusClass::Other);
    }

    #[test]
    fn status_class_names() {
        assert_eq!(StatusClass::Success.as_str(), "2xx");
        assert_eq!(
            serde_json::to_string(&StatusClass::ServerError).unwrap(),
            r#""5xx""#
        );
        assert_eq!(
            serde_json::to_string(&StatusClass::Other).unwrap(),
            r#""other""#
        );
    }

    #[test]
    fn hour_bucket_truncates_in_local_time() {
        let bucket = sample_record().hour_bucket();
        assert_eq!(bucket.start.to_string(), "2024-01-15 10:00:00");
        assert_eq!(bucket.offset_secs, 2 * 3600);
    }

    #[test]
    fn same_instant_different_offsets_bucket_separately() {
        // 10:15+02:00 and 09:15+01:00 are the same instant.
        let a = LocalBucket::hour_of(&ts("15/Jan/2024:10:15:42 +0200"));
        let b = LocalBucket::hour_of(&ts("15/Jan/2024:09:15:42 +0100"));
        assert_ne!(a, b);
    }

    #[test]
    fn five_minute_truncation() {
        let bucket = LocalBucket::truncated(&ts("15/Jan/2024:10:17:42 +0000"), 300);
        assert_eq!(bucket.start.to_string(), "2024-01-15 10:15:00");
    }

    #[test]
    fn bucket_display_includes_offset() {
        let bucket = LocalBucket::hour_of(&ts("15/Jan/2024:10:15:42 -0530"));
        assert_eq!(bucket.to_string(), "2024-01-15 10:00 -0530");
    }
}
