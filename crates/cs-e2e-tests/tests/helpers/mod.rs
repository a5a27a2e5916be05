//! Shared helpers for E2E integration tests.
//!
//! Builds log fixtures and drives full pipeline passes across the
//! cs-model / cs-engine boundary.

use cs_engine::{AnalyzerConfig, MockChunkSource, Pipeline};
use cs_model::AggregateSnapshot;
use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber once so `RUST_LOG` works in tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One Apache Combined line with the given fields.
pub fn combined_line(ip: &str, ts: &str, path: &str, status: u16, ua: &str) -> String {
    format!(r#"{ip} - - [{ts}] "GET {path} HTTP/1.1" {status} 1024 "-" "{ua}""#)
}

/// Run whole lines through a default pipeline.
pub async fn run_lines(lines: &[String]) -> AggregateSnapshot {
    run_lines_with(&AnalyzerConfig::default(), lines).await
}

/// Run whole lines through a pipeline built from `config`.
pub async fn run_lines_with(config: &AnalyzerConfig, lines: &[String]) -> AggregateSnapshot {
    init_tracing();
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    let mut source = MockChunkSource::from_lines(&refs);
    let mut pipeline = Pipeline::new(config).expect("pipeline config is valid");
    pipeline.run(&mut source).await.expect("pass completes")
}

/// Run raw chunks (arbitrary boundaries) through a default pipeline.
pub async fn run_chunks(chunks: &[&str]) -> AggregateSnapshot {
    init_tracing();
    let mut source = MockChunkSource::from_chunks(chunks.iter().copied());
    let mut pipeline = Pipeline::new(&AnalyzerConfig::default()).expect("pipeline config is valid");
    pipeline.run(&mut source).await.expect("pass completes")
}

pub const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
pub const GPTBOT_UA: &str =
    "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko); compatible; GPTBot/1.0; +https://openai.com/gptbot";
pub const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
