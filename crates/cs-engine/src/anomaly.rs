//! Traffic-spike detection over bucketed time series.
//!
//! A bucket is a spike when its count exceeds `mean + k·std` (population
//! std) of its series. Only bot-classified traffic is tracked, so series
//! memory scales with bot activity, not total traffic.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset};
use cs_model::{BotCategory, CategorySpike, LocalBucket, SpikeReport, UaSpike};
use serde::{Deserialize, Serialize};

/// Time aggregation for spike series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Minute,
    FiveMinute,
    Hour,
}

impl TimeBucket {
    pub fn width_secs(&self) -> u32 {
        match self {
            Self::Minute => 60,
            Self::FiveMinute => 300,
            Self::Hour => 3600,
        }
    }

    /// Bucket containing `ts`, truncated in its original offset.
    pub fn of(&self, ts: &DateTime<FixedOffset>) -> LocalBucket {
        LocalBucket::truncated(ts, self.width_secs())
    }
}

/// Spike detection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeConfig {
    /// `k` in `mean + k·std`.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Minimum buckets of history before a user-agent series is scored.
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
    /// Series bucket width.
    #[serde(default = "default_bucket")]
    pub bucket: TimeBucket,
}

fn default_multiplier() -> f64 {
    3.0
}

fn default_min_samples() -> usize {
    10
}

fn default_bucket() -> TimeBucket {
    TimeBucket::Minute
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            multiplier: default_multiplier(),
            min_samples: default_min_samples(),
            bucket: default_bucket(),
        }
    }
}

/// Accumulates per-bucket counts during the pass and scores them at
/// finalization.
#[derive(Debug, Clone)]
pub struct SpikeTracker {
    config: SpikeConfig,
    category_series: HashMap<(BotCategory, LocalBucket), u64>,
    ua_series: HashMap<(String, LocalBucket), u64>,
}

impl SpikeTracker {
    pub fn new(config: SpikeConfig) -> Self {
        Self {
            config,
            category_series: HashMap::new(),
            ua_series: HashMap::new(),
        }
    }

    /// Record one bot-classified request.
    pub fn observe(
        &mut self,
        category: BotCategory,
        user_agent: &str,
        ts: &DateTime<FixedOffset>,
    ) {
        let bucket = self.config.bucket.of(ts);
        *self.category_series.entry((category, bucket)).or_default() += 1;
        *self
            .ua_series
            .entry((user_agent.to_string(), bucket))
            .or_default() += 1;
    }

    /// Score every accumulated series.
    pub fn finalize(&self) -> SpikeReport {
        let mut report = SpikeReport::default();

        let mut by_category: HashMap<BotCategory, Vec<(LocalBucket, u64)>> = HashMap::new();
        for ((category, bucket), count) in &self.category_series {
            by_category.entry(*category).or_default().push((*bucket, *count));
        }
        for (category, series) in by_category {
            for (bucket, count, threshold) in series_spikes(&series, self.config.multiplier) {
                report.category_spikes.push(CategorySpike {
                    category,
                    bucket,
                    count,
                    threshold,
                });
            }
        }

        let mut by_ua: HashMap<&str, Vec<(LocalBucket, u64)>> = HashMap::new();
        for ((ua, bucket), count) in &self.ua_series {
            by_ua.entry(ua.as_str()).or_default().push((*bucket, *count));
        }
        for (ua, series) in by_ua {
            if series.len() < self.config.min_samples {
                continue;
            }
            for (bucket, count, threshold) in series_spikes(&series, self.config.multiplier) {
                report.ua_spikes.push(UaSpike {
                    user_agent: ua.to_string(),
                    bucket,
                    count,
                    threshold,
                });
            }
        }

        report
            .category_spikes
            .sort_by(|a, b| (a.category, a.bucket).cmp(&(b.category, b.bucket)));
        report
            .ua_spikes
            .sort_by(|a, b| (&a.user_agent, a.bucket).cmp(&(&b.user_agent, b.bucket)));
        report
    }
}

// Buckets strictly above mean + k·std of their series.
fn series_spikes(
    series: &[(LocalBucket, u64)],
    multiplier: f64,
) -> Vec<(LocalBucket, u64, f64)> {
    if series.is_empty() {
        return Vec::new();
    }
    let n = series.len() as f64;
    let mean = series.iter().map(|(_, c)| *c as f64).sum::<f64>() / n;
    let variance = series
        .iter()
        .map(|(_, c)| {
            let d = *c as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    let threshold = mean + multiplier * variance.sqrt();

    series
        .iter()
        .filter(|(_, count)| (*count as f64) > threshold)
        .map(|(bucket, count)| (*bucket, *count, threshold))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(minute: u32, second: u32) -> DateTime<FixedOffset> {
        DateTime::parse_from_str(
            &format!("15/Jan/2024:10:{minute:02}:{second:02} +0000"),
            "%d/%b/%Y:%H:%M:%S %z",
        )
        .unwrap()
    }

    #[test]
    fn time_bucket_widths() {
        assert_eq!(TimeBucket::Minute.width_secs(), 60);
        assert_eq!(TimeBucket::FiveMinute.width_secs(), 300);
        assert_eq!(TimeBucket::Hour.width_secs(), 3600);
    }

    #[test]
    fn flat_series_has_no_spikes() {
        let mut tracker = SpikeTracker::new(SpikeConfig::default());
        for minute in 0..20 {
            tracker.observe(BotCategory::SearchCrawler, "Googlebot/2.1", &ts(minute, 5));
        }
        let report = tracker.finalize();
        assert!(report.category_spikes.is_empty());
    }

    #[test]
    fn burst_bucket_is_flagged() {
        let mut tracker = SpikeTracker::new(SpikeConfig {
            multiplier: 2.0,
            ..SpikeConfig::default()
        });
        // One request per minute of background, then a 50-request burst.
        for minute in 0..30 {
            tracker.observe(BotCategory::AiCrawler, "GPTBot/1.0", &ts(minute, 1));
        }
        for second in 0..50 {
            tracker.observe(BotCategory::AiCrawler, "GPTBot/1.0", &ts(31, second % 60));
        }
        let report = tracker.finalize();
        assert_eq!(report.category_spikes.len(), 1);
        let spike = &report.category_spikes[0];
        assert_eq!(spike.category, BotCategory::AiCrawler);
        assert_eq!(spike.count, 50);
        assert!((spike.count as f64) > spike.threshold);
        // The UA series spiked too (31 buckets of history).
        assert_eq!(report.ua_spikes.len(), 1);
        assert_eq!(report.ua_spikes[0].user_agent, "GPTBot/1.0");
    }

    #[test]
    fn short_ua_series_not_scored() {
        let mut tracker = SpikeTracker::new(SpikeConfig {
            multiplier: 0.5,
            min_samples: 10,
            bucket: TimeBucket::Minute,
        });
        // 3 buckets of history — under min_samples.
        tracker.observe(BotCategory::UnknownBot, "probe/1", &ts(0, 0));
        tracker.observe(BotCategory::UnknownBot, "probe/1", &ts(1, 0));
        for second in 0..10 {
            tracker.observe(BotCategory::UnknownBot, "probe/1", &ts(2, second));
        }
        let report = tracker.finalize();
        assert!(report.ua_spikes.is_empty());
        // Category series still participate.
        assert_eq!(report.category_spikes.len(), 1);
    }

    #[test]
    fn single_bucket_never_spikes() {
        let mut tracker = SpikeTracker::new(SpikeConfig::default());
        for second in 0..40 {
            tracker.observe(BotCategory::AiCrawler, "GPTBot/1.0", &ts(0, second));
        }
        assert!(tracker.finalize().category_spikes.is_empty());
    }
}
