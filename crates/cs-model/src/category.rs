//! Bot taxonomy shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Traffic category assigned to a request's user-agent.
///
/// Variant declaration order drives report ordering — named bot classes
/// first, then the catch-alls.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum BotCategory {
    /// Search-engine and SEO crawlers (Googlebot, Bingbot, AhrefsBot, ...).
    SearchCrawler,
    /// Training-data crawlers for AI models (GPTBot, ClaudeBot, CCBot, ...).
    AiCrawler,
    /// User-triggered AI assistant fetches (ChatGPT-User, Perplexity-User, ...).
    AiAssistant,
    /// Answer-index fetchers for LLM search products (OAI-SearchBot, ...).
    LlmFetcher,
    /// Self-declared or generic bots no rule identifies further.
    UnknownBot,
    /// Browser-like traffic.
    NotABot,
}

impl BotCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchCrawler => "search-crawler",
            Self::AiCrawler => "ai-crawler",
            Self::AiAssistant => "ai-assistant",
            Self::LlmFetcher => "llm-fetcher",
            Self::UnknownBot => "unknown-bot",
            Self::NotABot => "not-a-bot",
        }
    }

    /// Whether this category counts as bot traffic.
    pub fn is_bot(&self) -> bool {
        !matches!(self, Self::NotABot)
    }
}

impl std::fmt::Display for BotCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one user-agent string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: BotCategory,
    /// Label of the pattern rule that matched; `None` for the
    /// browser-like and unknown fallbacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
}

impl Classification {
    /// Classification produced by a pattern-rule match.
    pub fn from_rule(category: BotCategory, label: impl Into<String>) -> Self {
        Self {
            category,
            matched_rule: Some(label.into()),
        }
    }

    /// Fallback classification when no rule matched.
    pub fn fallback(category: BotCategory) -> Self {
        Self {
            category,
            matched_rule: None,
        }
    }
}
