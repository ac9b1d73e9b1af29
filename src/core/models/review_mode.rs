//! Review modes
//!
//! Controls how a check outcome maps to a review decision. Names follow the
//! historical command-line values (`no`, `accept-onpass`, ...); the long
//! spellings (`no-op`, `accept-on-pass`, ...) are accepted as aliases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for an unknown review mode name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid review mode: {0} (use: normal, no, accept, accept-onpass, fallback-onfail, fallback-always)")]
pub struct ModeParseError(pub String);

/// Review policy of a bot instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReviewMode {
    /// Accept on pass, decline on fail, leave inconclusive requests open
    #[default]
    #[serde(rename = "normal")]
    Normal,
    /// Evaluate only, never mutate
    #[serde(rename = "no", alias = "no-op")]
    NoOp,
    /// Accept regardless of outcome
    #[serde(rename = "accept", alias = "accept-always")]
    AcceptAlways,
    /// Accept on pass, otherwise leave open
    #[serde(rename = "accept-onpass", alias = "accept-on-pass")]
    AcceptOnPass,
    /// Accept on pass, hand failures to the fallback reviewer
    #[serde(rename = "fallback-onfail", alias = "fallback-on-fail")]
    FallbackOnFail,
    /// Hand every request to the fallback reviewer
    #[serde(rename = "fallback-always")]
    FallbackAlways,
}

impl ReviewMode {
    /// All modes, in documentation order
    pub const ALL: [Self; 6] = [
        Self::Normal,
        Self::NoOp,
        Self::AcceptAlways,
        Self::AcceptOnPass,
        Self::FallbackOnFail,
        Self::FallbackAlways,
    ];

    /// Canonical name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::NoOp => "no",
            Self::AcceptAlways => "accept",
            Self::AcceptOnPass => "accept-onpass",
            Self::FallbackOnFail => "fallback-onfail",
            Self::FallbackAlways => "fallback-always",
        }
    }

    /// Whether the mode may hand requests to a fallback reviewer
    #[must_use]
    pub const fn uses_fallback(self) -> bool {
        matches!(self, Self::FallbackOnFail | Self::FallbackAlways)
    }
}

impl std::fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "no" | "no-op" => Ok(Self::NoOp),
            "accept" | "accept-always" => Ok(Self::AcceptAlways),
            "accept-onpass" | "accept-on-pass" => Ok(Self::AcceptOnPass),
            "fallback-onfail" | "fallback-on-fail" => Ok(Self::FallbackOnFail),
            "fallback-always" => Ok(Self::FallbackAlways),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}
