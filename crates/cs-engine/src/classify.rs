//! User-agent classification against the pattern registry.

use cs_model::{BotCategory, Classification};

use crate::registry::PatternRegistry;

/// Applies the registry to user-agent strings.
///
/// Stateless per call — the same input always yields the same category,
/// regardless of call order.
#[derive(Debug)]
pub struct Classifier {
    registry: PatternRegistry,
}

impl Classifier {
    pub fn new(registry: PatternRegistry) -> Self {
        Self { registry }
    }

    /// Highest-precedence matching category for one user-agent string.
    ///
    /// Without a rule match, browser-like strings are `not-a-bot`;
    /// empty or malformed-but-present strings are `unknown-bot`.
    pub fn classify(&self, user_agent: &str) -> Classification {
        if let Some(rule) = self.registry.find_match(user_agent) {
            return Classification::from_rule(rule.category, rule.label.clone());
        }
        if looks_like_browser(user_agent) {
            Classification::fallback(BotCategory::NotABot)
        } else {
            Classification::fallback(BotCategory::UnknownBot)
        }
    }
}

// Syntactically browser-like: the conventional browser product prefixes.
fn looks_like_browser(user_agent: &str) -> bool {
    let ua = user_agent.trim_start();
    ["Mozilla/", "Opera/", "Opera ", "Lynx/"]
        .iter()
        .any(|prefix| ua.starts_with(prefix))
}
