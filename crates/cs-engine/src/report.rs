//! Report assembly — converts a finalized snapshot into exportable rows.
//!
//! A thin consumer of [`AggregateSnapshot`]: totals, table rows, and
//! per-bot CSV lines. Rendering (files, dashboards) belongs to callers.

use std::collections::BTreeMap;

use cs_model::{AggregateSnapshot, BotCategory, HourlyCount, LogRecord, StatusClass, TopEntry};
use serde::Serialize;

/// High-level totals for one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_requests: u64,
    pub bot_requests: u64,
    pub browser_requests: u64,
    pub parse_failures: u64,
    pub category_counts: BTreeMap<BotCategory, u64>,
    pub spike_count: usize,
}

/// Exportable view over a finalized snapshot.
pub struct Report<'a> {
    snapshot: &'a AggregateSnapshot,
}

impl<'a> Report<'a> {
    pub fn new(snapshot: &'a AggregateSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn summary(&self) -> Summary {
        let snap = self.snapshot;
        Summary {
            total_requests: snap.total_requests(),
            bot_requests: snap.bot_total(),
            browser_requests: snap.count(BotCategory::NotABot),
            parse_failures: snap.stats.parse_failures,
            category_counts: snap.bot_counts.clone(),
            spike_count: snap.spikes.category_spikes.len() + snap.spikes.ua_spikes.len(),
        }
    }

    /// Histogram rows, already sorted by (category, bucket).
    pub fn hourly_rows(&self) -> &[HourlyCount] {
        &self.snapshot.hourly
    }

    /// Status distribution rows in class order.
    pub fn status_rows(&self) -> Vec<(StatusClass, u64)> {
        self.snapshot
            .status_classes
            .iter()
            .map(|(class, count)| (*class, *count))
            .collect()
    }

    pub fn top_paths(&self) -> &[TopEntry] {
        &self.snapshot.top_paths
    }

    pub fn top_ips(&self) -> &[TopEntry] {
        &self.snapshot.top_ips
    }

    /// User-agent summary rows (user-agent, total), highest first.
    pub fn top_user_agents(&self) -> &[TopEntry] {
        &self.snapshot.top_user_agents
    }

    /// Bot categories with exported records, in category order.
    pub fn exported_categories(&self) -> Vec<BotCategory> {
        self.snapshot.exports.keys().copied().collect()
    }

    /// Header row for the per-bot CSV export.
    pub fn csv_header() -> &'static str {
        "timestamp,client_ip,method,path,status,bytes,user_agent,referrer,category"
    }

    /// CSV rows for one bot category's exported records.
    pub fn csv_rows(&self, category: BotCategory) -> Vec<String> {
        self.snapshot
            .exports
            .get(&category)
            .map(|records| {
                records
                    .iter()
                    .map(|record| csv_row(record, category))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn csv_row(record: &LogRecord, category: BotCategory) -> String {
    let fields = [
        record.timestamp.to_rfc3339(),
        record.client_ip.clone(),
        record.method.clone(),
        record.path.clone(),
        record.status.to_string(),
        record.bytes.map(|b| b.to_string()).unwrap_or_default(),
        record.user_agent.clone(),
        record.referrer.clone().unwrap_or_default(),
        category.as_str().to_string(),
    ];
    fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

// Quote a field when it contains a comma, quote, or line break; embedded
// quotes are doubled.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
