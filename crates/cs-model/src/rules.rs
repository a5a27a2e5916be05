//! Classification rule configuration consumed at registry construction.

use serde::{Deserialize, Serialize};

use crate::category::BotCategory;

/// Where a pattern rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSource {
    BuiltIn,
    User,
}

/// A user-supplied classification pattern.
///
/// Matched case-insensitively; a literal substring unless `regex` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPattern {
    /// Substring or regular expression to match against the user-agent.
    pub pattern: String,
    /// Category assigned when the pattern matches.
    pub category: BotCategory,
    /// Compile `pattern` as a regular expression instead of a literal.
    #[serde(default)]
    pub regex: bool,
}
