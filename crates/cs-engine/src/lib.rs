//! Streaming bot-traffic analytics over web-server access logs.
//!
//! Provides multi-grammar access-log parsing (Apache Combined/Common,
//! Nginx) with wrapped-line reassembly, user-agent classification against
//! an ordered pattern registry, and single-pass aggregation into a
//! read-only snapshot: per-bot counts, hourly histogram, status-class
//! distribution, bounded top-N tables, per-bot export lists, and
//! traffic-spike alerts.
//!
//! The pipeline is a single forward pass over caller-supplied text
//! chunks; peak memory scales with bot-classified traffic and the top-N
//! capacity, never with total log size.

pub mod aggregate;
pub mod anomaly;
pub mod classify;
pub mod config;
pub mod error;
pub mod mock;
pub mod normalize;
pub mod parsers;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod source;
pub mod topk;

// Re-export key types for convenience
pub use aggregate::{AggregateEngine, EngineState};
pub use classify::Classifier;
pub use config::AnalyzerConfig;
pub use error::{EngineError, EngineResult};
pub use mock::MockChunkSource;
pub use normalize::LineAssembler;
pub use parsers::AccessLogFormat;
pub use pipeline::Pipeline;
pub use registry::PatternRegistry;
pub use report::{Report, Summary};
pub use source::{ChunkSource, ReaderChunkSource};
