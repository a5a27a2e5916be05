//! Ordered user-agent pattern registry.
//!
//! Built-in rules carry unique precedence ranks, specific names ahead of
//! generic catch-alls (`google-extended` outranks `googlebot`, which
//! outranks the bare `bot` rule). User-supplied rules are appended after
//! every built-in so a looser user pattern can never shadow a built-in
//! category.

use cs_model::{BotCategory, RuleSource, UserPattern};
use regex::Regex;

use crate::error::{EngineError, EngineResult};

/// How a rule matches a user-agent string.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Case-insensitive literal substring (stored lowercased).
    Substring(String),
    /// Pre-compiled case-insensitive regular expression.
    Pattern(Regex),
}

impl Matcher {
    fn matches(&self, ua: &str, ua_lower: &str) -> bool {
        match self {
            Self::Substring(needle) => ua_lower.contains(needle.as_str()),
            Self::Pattern(re) => re.is_match(ua),
        }
    }
}

/// One ordered classification rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    /// Stable label for audit output.
    pub label: String,
    pub category: BotCategory,
    pub matcher: Matcher,
    /// Lower rank wins.
    pub rank: u32,
    pub source: RuleSource,
}

/// Immutable, ordered rule set built once per analysis run.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    /// Sorted by rank ascending.
    rules: Vec<PatternRule>,
}

const BUILTIN_SUBSTRINGS: &[(&str, BotCategory)] = &[
    // Opt-out/extended tokens first — they embed the base crawler names.
    ("google-extended", BotCategory::AiCrawler),
    ("applebot-extended", BotCategory::AiCrawler),
    ("gptbot", BotCategory::AiCrawler),
    ("claudebot", BotCategory::AiCrawler),
    ("claude-web", BotCategory::AiCrawler),
    ("anthropic-ai", BotCategory::AiCrawler),
    ("ccbot", BotCategory::AiCrawler),
    ("cohere-ai", BotCategory::AiCrawler),
    ("ai2bot", BotCategory::AiCrawler),
    ("bytespider", BotCategory::AiCrawler),
    ("meta-externalagent", BotCategory::AiCrawler),
    ("chatgpt-user", BotCategory::AiAssistant),
    ("claude-user", BotCategory::AiAssistant),
    ("perplexity-user", BotCategory::AiAssistant),
    ("duckassistbot", BotCategory::AiAssistant),
    ("mistralai-user", BotCategory::AiAssistant),
    ("oai-searchbot", BotCategory::LlmFetcher),
    ("perplexitybot", BotCategory::LlmFetcher),
    ("youbot", BotCategory::LlmFetcher),
    ("googlebot", BotCategory::SearchCrawler),
    ("bingbot", BotCategory::SearchCrawler),
    ("duckduckbot", BotCategory::SearchCrawler),
    ("yandexbot", BotCategory::SearchCrawler),
    ("baiduspider", BotCategory::SearchCrawler),
    ("applebot", BotCategory::SearchCrawler),
    ("ahrefsbot", BotCategory::SearchCrawler),
    ("semrushbot", BotCategory::SearchCrawler),
    // Generic self-declared bots, lowest built-in precedence.
    ("crawler", BotCategory::UnknownBot),
    ("spider", BotCategory::UnknownBot),
];

// `bot` as a standalone word or token segment; avoids hits inside words
// like "cubot".
const GENERIC_BOT_PATTERN: &str = r"(?i)(^|[^a-z])bot([^a-z]|$)";

fn builtin_rules() -> Vec<PatternRule> {
    let mut rules: Vec<PatternRule> = BUILTIN_SUBSTRINGS
        .iter()
        .enumerate()
        .map(|(i, (needle, category))| PatternRule {
            label: (*needle).to_string(),
            category: *category,
            matcher: Matcher::Substring((*needle).to_string()),
            rank: i as u32,
            source: RuleSource::BuiltIn,
        })
        .collect();
    rules.push(PatternRule {
        label: "bot".to_string(),
        category: BotCategory::UnknownBot,
        matcher: Matcher::Pattern(
            Regex::new(GENERIC_BOT_PATTERN).expect("generic bot pattern is valid"),
        ),
        rank: rules.len() as u32,
        source: RuleSource::BuiltIn,
    });
    rules
}

impl PatternRegistry {
    /// Built-in rules only.
    pub fn builtin() -> Self {
        Self {
            rules: builtin_rules(),
        }
    }

    /// Built-ins plus user patterns, appended in the order given.
    ///
    /// A malformed user pattern fails construction — pattern problems are
    /// never deferred to per-record classification.
    pub fn new(user_patterns: &[UserPattern]) -> EngineResult<Self> {
        let mut rules = builtin_rules();
        let mut rank = rules.len() as u32;
        for up in user_patterns {
            if up.pattern.is_empty() {
                return Err(EngineError::Config {
                    pattern: up.pattern.clone(),
                    reason: "pattern is empty".into(),
                });
            }
            let matcher = if up.regex {
                let re = Regex::new(&format!("(?i){}", up.pattern)).map_err(|e| {
                    EngineError::Config {
                        pattern: up.pattern.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Matcher::Pattern(re)
            } else {
                Matcher::Substring(up.pattern.to_lowercase())
            };
            rules.push(PatternRule {
                label: up.pattern.clone(),
                category: up.category,
                matcher,
                rank,
                source: RuleSource::User,
            });
            rank += 1;
        }
        Ok(Self { rules })
    }

    /// First matching rule in rank order, or `None`.
    pub fn find_match(&self, user_agent: &str) -> Option<&PatternRule> {
        let ua_lower = user_agent.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(user_agent, &ua_lower))
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }
}
