//! Check outcomes and review decisions

use serde::Serialize;

/// Tri-state result of a check
///
/// Variants are ordered lowest first; aggregating several actions keeps the
/// lowest outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The check failed
    Decline,
    /// Inconclusive, not applicable, or needs a human
    NoOpinion,
    /// The check passed
    Accept,
}

impl CheckOutcome {
    /// Combine with the outcome of another action on the same request
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        self.min(other)
    }
}

impl From<Option<bool>> for CheckOutcome {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Accept,
            Some(false) => Self::Decline,
            None => Self::NoOpinion,
        }
    }
}

/// What the bot does with a request after evaluating it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Accept the bot's review
    Accept,
    /// Decline the bot's review
    Decline,
    /// Leave the open review untouched for a later run
    Defer,
    /// Hand the review to the fallback reviewer
    Delegate,
}

impl Decision {
    /// Result name used in comment markers
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accepted",
            Self::Decline => "declined",
            Self::Defer => "deferred",
            Self::Delegate => "delegated",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final verdict for one request in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "verdict", content = "decision")]
pub enum Verdict {
    /// Not evaluated this cycle (too young)
    Skipped,
    /// Evaluated and decided
    Decided(Decision),
}
