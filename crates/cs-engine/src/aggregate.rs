//! Single-pass aggregation engine and its lifecycle state machine.

use std::collections::{BTreeMap, HashMap};

use cs_model::{
    AggregateSnapshot, BotCategory, Classification, HourlyCount, LocalBucket, LogRecord,
    ParseStats, StatusClass,
};

use crate::anomaly::{SpikeConfig, SpikeTracker};
use crate::error::{EngineError, EngineResult};
use crate::topk::TopTracker;

/// Pipeline lifecycle states.
///
/// `Init` allows configuration, `Streaming` allows repeated ingest,
/// `Finalized` is terminal and read-only. No transition skips states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Init,
    Streaming,
    Finalized,
}

impl EngineState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Streaming => "streaming",
            Self::Finalized => "finalized",
        }
    }
}

/// Maintains every aggregate view incrementally, one record at a time.
///
/// Each `ingest` call is atomic with respect to its record: every view
/// updates or none does. Peak memory is bounded by the top-N capacity,
/// the histogram buckets, and the bot-classified records accumulated for
/// export — never by total line count.
#[derive(Debug)]
pub struct AggregateEngine {
    state: EngineState,
    bot_counts: BTreeMap<BotCategory, u64>,
    hourly: HashMap<(BotCategory, LocalBucket), u64>,
    status_classes: BTreeMap<StatusClass, u64>,
    top_paths: TopTracker,
    top_ips: TopTracker,
    top_user_agents: TopTracker,
    exports: BTreeMap<BotCategory, Vec<LogRecord>>,
    spikes: SpikeTracker,
    stats: ParseStats,
    snapshot: Option<AggregateSnapshot>,
}

impl AggregateEngine {
    pub fn new(top_n: usize, spike_config: SpikeConfig) -> Self {
        Self {
            state: EngineState::Init,
            bot_counts: BTreeMap::new(),
            hourly: HashMap::new(),
            status_classes: BTreeMap::new(),
            top_paths: TopTracker::new(top_n),
            top_ips: TopTracker::new(top_n),
            top_user_agents: TopTracker::new(top_n),
            exports: BTreeMap::new(),
            spikes: SpikeTracker::new(spike_config),
            stats: ParseStats::default(),
            snapshot: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Init → Streaming. Configuration is frozen from here on.
    pub fn start(&mut self) -> EngineResult<()> {
        match self.state {
            EngineState::Init => {
                self.state = EngineState::Streaming;
                Ok(())
            }
            state => Err(EngineError::State {
                operation: "start",
                state: state.as_str(),
            }),
        }
    }

    /// Count one logical line leaving the assembler.
    pub fn note_line(&mut self) {
        self.stats.total_lines += 1;
    }

    /// Count one line no grammar could parse.
    pub fn note_parse_failure(&mut self) {
        self.stats.parse_failures += 1;
    }

    /// Apply one classified record to every view.
    pub fn ingest(
        &mut self,
        record: LogRecord,
        classification: &Classification,
    ) -> EngineResult<()> {
        if self.state != EngineState::Streaming {
            return Err(EngineError::State {
                operation: "ingest",
                state: self.state.as_str(),
            });
        }

        let category = classification.category;
        *self.bot_counts.entry(category).or_default() += 1;
        *self
            .hourly
            .entry((category, record.hour_bucket()))
            .or_default() += 1;
        *self.status_classes.entry(record.status_class()).or_default() += 1;
        self.top_paths.observe(&record.path);
        self.top_ips.observe(&record.client_ip);
        self.top_user_agents.observe(&record.user_agent);
        self.stats.parsed_records += 1;

        if category.is_bot() {
            self.spikes
                .observe(category, &record.user_agent, &record.timestamp);
            self.exports.entry(category).or_default().push(record);
        }
        Ok(())
    }

    /// Streaming → Finalized. Idempotent: every call after the first
    /// returns an identical snapshot. Calling in `Init` is an error.
    pub fn finalize(&mut self) -> EngineResult<AggregateSnapshot> {
        if self.state == EngineState::Init {
            return Err(EngineError::State {
                operation: "finalize",
                state: self.state.as_str(),
            });
        }
        if let Some(snapshot) = &self.snapshot {
            return Ok(snapshot.clone());
        }

        let mut hourly: Vec<HourlyCount> = self
            .hourly
            .iter()
            .map(|((category, bucket), count)| HourlyCount {
                category: *category,
                bucket: *bucket,
                count: *count,
            })
            .collect();
        hourly.sort_by(|a, b| (a.category, a.bucket).cmp(&(b.category, b.bucket)));

        let snapshot = AggregateSnapshot {
            bot_counts: self.bot_counts.clone(),
            hourly,
            status_classes: self.status_classes.clone(),
            top_paths: self.top_paths.to_entries(),
            top_ips: self.top_ips.to_entries(),
            top_user_agents: self.top_user_agents.to_entries(),
            exports: self.exports.clone(),
            spikes: self.spikes.finalize(),
            stats: self.stats,
        };
        self.state = EngineState::Finalized;
        self.snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }
}
