//! The forward-pass pipeline: assemble → parse → classify → aggregate.

use cs_model::AggregateSnapshot;
use tracing::{debug, info};

use crate::aggregate::{AggregateEngine, EngineState};
use crate::classify::Classifier;
use crate::config::AnalyzerConfig;
use crate::error::EngineResult;
use crate::normalize::LineAssembler;
use crate::parsers::{self, AccessLogFormat};
use crate::registry::PatternRegistry;
use crate::source::ChunkSource;

/// Streams access-log text through one complete analysis pass.
///
/// Feed chunks (not necessarily line-aligned) with
/// [`Pipeline::feed_chunk`], or drive a [`ChunkSource`] to exhaustion
/// with [`Pipeline::run`]. Either way, [`Pipeline::finish`] flushes the
/// assembler tail and returns the finalized snapshot. The caller may stop
/// feeding at any point and still finish with a valid snapshot.
#[derive(Debug)]
pub struct Pipeline {
    assembler: LineAssembler,
    classifier: Classifier,
    engine: AggregateEngine,
    format: Option<AccessLogFormat>,
}

impl Pipeline {
    /// Build a pipeline. Pattern configuration errors surface here,
    /// before any ingestion begins.
    pub fn new(config: &AnalyzerConfig) -> EngineResult<Self> {
        let registry = PatternRegistry::new(&config.user_patterns)?;
        Ok(Self {
            assembler: LineAssembler::new(),
            classifier: Classifier::new(registry),
            engine: AggregateEngine::new(config.top_n, config.spike.clone()),
            format: config.format,
        })
    }

    /// Feed one raw chunk.
    pub fn feed_chunk(&mut self, chunk: &str) -> EngineResult<()> {
        self.ensure_streaming()?;
        for line in self.assembler.push_chunk(chunk) {
            self.consume_line(&line)?;
        }
        Ok(())
    }

    /// Flush the assembler tail and finalize the engine. Idempotent.
    pub fn finish(&mut self) -> EngineResult<AggregateSnapshot> {
        self.ensure_streaming()?;
        if self.engine.state() == EngineState::Streaming {
            for line in self.assembler.finish() {
                self.consume_line(&line)?;
            }
        }
        self.engine.finalize()
    }

    /// Drive a chunk source until exhaustion and finalize.
    pub async fn run(&mut self, source: &mut dyn ChunkSource) -> EngineResult<AggregateSnapshot> {
        while let Some(chunk) = source.next_chunk().await? {
            self.feed_chunk(&chunk)?;
        }
        let snapshot = self.finish()?;
        info!(
            lines = snapshot.stats.total_lines,
            records = snapshot.stats.parsed_records,
            failures = snapshot.stats.parse_failures,
            bots = snapshot.bot_total(),
            "analysis pass complete"
        );
        Ok(snapshot)
    }

    fn ensure_streaming(&mut self) -> EngineResult<()> {
        if self.engine.state() == EngineState::Init {
            self.engine.start()?;
        }
        Ok(())
    }

    fn consume_line(&mut self, line: &str) -> EngineResult<()> {
        self.engine.note_line();
        let parsed = match self.format {
            Some(format) => parsers::parse_line(line, format),
            None => parsers::parse_auto(line).map(|(record, _)| record),
        };
        match parsed {
            Some(record) => {
                let classification = self.classifier.classify(&record.user_agent);
                self.engine.ingest(record, &classification)
            }
            None => {
                self.engine.note_parse_failure();
                debug!(line = %truncate(line, 120), "unparsed log line");
                Ok(())
            }
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockChunkSource;
    use cs_model::BotCategory;

    fn pipeline() -> Pipeline {
        Pipeline::new(&AnalyzerConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn apache_sample_end_to_end() {
        let mut p = pipeline();
        let mut source = MockChunkSource::with_apache_sample();
        let snap = p.run(&mut source).await.unwrap();

        assert_eq!(snap.stats.total_lines, 5);
        assert_eq!(snap.stats.parsed_records, 5);
        assert_eq!(snap.stats.parse_failures, 0);
        assert_eq!(snap.count(BotCategory::SearchCrawler), 1);
        assert_eq!(snap.count(BotCategory::AiCrawler), 1);
        assert_eq!(snap.count(BotCategory::AiAssistant), 1);
        assert_eq!(snap.count(BotCategory::NotABot), 2);
    }

    #[tokio::test]
    async fn nginx_sample_end_to_end() {
        let mut p = pipeline();
        let mut source = MockChunkSource::with_nginx_sample();
        let snap = p.run(&mut source).await.unwrap();

        assert_eq!(snap.stats.parsed_records, 3);
        assert_eq!(snap.count(BotCategory::AiCrawler), 2);
        // Empty-UA bad request falls through to unknown-bot.
        assert_eq!(snap.count(BotCategory::UnknownBot), 1);
    }

    #[tokio::test]
    async fn wrapped_ua_reconstructs_one_record() {
        let mut p = pipeline();
        let mut source = MockChunkSource::with_wrapped_sample();
        let snap = p.run(&mut source).await.unwrap();

        assert_eq!(snap.stats.total_lines, 2);
        assert_eq!(snap.stats.parse_failures, 0);
        assert_eq!(snap.count(BotCategory::SearchCrawler), 1);
        let exported = &snap.exports[&BotCategory::SearchCrawler][0];
        assert_eq!(
            exported.user_agent,
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)"
        );
    }

    #[tokio::test]
    async fn malformed_lines_count_failures_and_continue() {
        let mut p = pipeline();
        let mut source = MockChunkSource::with_malformed_sample();
        let snap = p.run(&mut source).await.unwrap();

        assert_eq!(snap.stats.parse_failures, 2);
        assert_eq!(snap.stats.parsed_records, 1);
    }

    #[tokio::test]
    async fn pinned_format_rejects_other_grammars() {
        let config = AnalyzerConfig {
            format: Some(AccessLogFormat::ApacheCommon),
            ..AnalyzerConfig::default()
        };
        let mut p = Pipeline::new(&config).unwrap();
        // A Combined line does not parse under a pinned Common grammar.
        p.feed_chunk(
            "192.0.2.1 - - [15/Jan/2024:10:00:00 +0000] \"GET / HTTP/1.1\" 200 10 \"-\" \"x\"\n",
        )
        .unwrap();
        p.feed_chunk("192.0.2.1 - - [15/Jan/2024:10:00:00 +0000] \"GET / HTTP/1.1\" 200 10\n")
            .unwrap();
        let snap = p.finish().unwrap();
        assert_eq!(snap.stats.parse_failures, 1);
        assert_eq!(snap.stats.parsed_records, 1);
    }

    #[tokio::test]
    async fn finish_without_input_yields_empty_snapshot() {
        let mut p = pipeline();
        let snap = p.finish().unwrap();
        assert_eq!(snap, cs_model::AggregateSnapshot::default());
    }

    #[tokio::test]
    async fn finish_twice_is_idempotent() {
        let mut p = pipeline();
        p.feed_chunk(
            "66.249.66.1 - - [15/Jan/2024:10:15:42 +0000] \"GET / HTTP/1.1\" 200 512 \"-\" \"Googlebot/2.1\"\n",
        )
        .unwrap();
        let first = p.finish().unwrap();
        let second = p.finish().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn bad_user_pattern_fails_construction() {
        let config = AnalyzerConfig {
            user_patterns: vec![cs_model::UserPattern {
                pattern: "broken(".into(),
                category: BotCategory::UnknownBot,
                regex: true,
            }],
            ..AnalyzerConfig::default()
        };
        assert!(Pipeline::new(&config).is_err());
    }
}
