//! Analyzer configuration, loadable from TOML.

use cs_model::UserPattern;
use serde::Deserialize;

use crate::anomaly::SpikeConfig;
use crate::parsers::AccessLogFormat;

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzerConfig {
    /// Pin a single grammar; `None` auto-detects per line.
    #[serde(default)]
    pub format: Option<AccessLogFormat>,
    /// Extra classification patterns, appended after the built-ins.
    #[serde(default)]
    pub user_patterns: Vec<UserPattern>,
    /// Capacity of each top-N table.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Spike detection settings.
    #[serde(default)]
    pub spike: SpikeConfig,
}

fn default_top_n() -> usize {
    50
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            format: None,
            user_patterns: Vec::new(),
            top_n: default_top_n(),
            spike: SpikeConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
