//! Finalized aggregate output consumed by reporting and export layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::BotCategory;
use crate::record::{LocalBucket, LogRecord, StatusClass};

/// One key in a bounded top-N table, highest counts first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEntry {
    pub key: String,
    pub count: u64,
}

/// One row of the category × hour histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyCount {
    pub category: BotCategory,
    pub bucket: LocalBucket,
    pub count: u64,
}

/// Line accounting for one analysis pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Logical lines the assembler produced.
    pub total_lines: u64,
    /// Lines that parsed into records.
    pub parsed_records: u64,
    /// Lines no grammar could parse.
    pub parse_failures: u64,
}

/// A time bucket whose request count exceeded `mean + k·std` for its
/// category series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpike {
    pub category: BotCategory,
    pub bucket: LocalBucket,
    pub count: u64,
    pub threshold: f64,
}

/// A time bucket whose request count exceeded `mean + k·std` for one
/// bot user-agent's series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UaSpike {
    pub user_agent: String,
    pub bucket: LocalBucket,
    pub count: u64,
    pub threshold: f64,
}

/// Spike alerts detected at finalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpikeReport {
    pub category_spikes: Vec<CategorySpike>,
    pub ua_spikes: Vec<UaSpike>,
}

/// Read-only summary of one complete analysis pass.
///
/// `exports` is the only unbounded-growth structure and scales with
/// bot-classified traffic, never with total traffic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    /// Requests per category, `not-a-bot` included.
    pub bot_counts: BTreeMap<BotCategory, u64>,
    /// Category × hour histogram rows, sorted by (category, bucket).
    pub hourly: Vec<HourlyCount>,
    /// Requests per status class.
    pub status_classes: BTreeMap<StatusClass, u64>,
    /// Most-requested paths, bounded at the configured N.
    pub top_paths: Vec<TopEntry>,
    /// Most-active client IPs, bounded at the configured N.
    pub top_ips: Vec<TopEntry>,
    /// Most-seen user-agent strings, bounded at the configured N.
    pub top_user_agents: Vec<TopEntry>,
    /// Full records per bot category, for per-bot export. Uncapped.
    pub exports: BTreeMap<BotCategory, Vec<LogRecord>>,
    /// Traffic-spike alerts.
    pub spikes: SpikeReport,
    /// Line accounting.
    pub stats: ParseStats,
}

impl AggregateSnapshot {
    /// Request count for one category.
    pub fn count(&self, category: BotCategory) -> u64 {
        self.bot_counts.get(&category).copied().unwrap_or(0)
    }

    /// Total bot-classified requests (everything except `not-a-bot`).
    pub fn bot_total(&self) -> u64 {
        self.bot_counts
            .iter()
            .filter(|(cat, _)| cat.is_bot())
            .map(|(_, n)| n)
            .sum()
    }

    /// Total successfully parsed requests.
    pub fn total_requests(&self) -> u64 {
        self.stats.parsed_records
    }
}
