//! Collects the notes checks write while evaluating a request
//!
//! The collected lines become the body of the audit comment when the caller
//! does not supply an explicit message.

use log::info;

/// Ordered, per-request collection of note lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentLog {
    lines: Vec<String>,
}

impl CommentLog {
    /// Empty log
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Record a line and log it at info level
    pub fn note(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{line}");
        self.lines.push(line);
    }

    /// Recorded lines without duplicates, in first-seen order
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.lines.iter().filter(|l| seen.insert(l.as_str())).cloned().collect()
    }
}
