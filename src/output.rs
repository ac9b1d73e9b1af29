//! Output formatting for human and JSON modes
//!
//! Run results can be rendered either as coloured text or as
//! machine-parseable JSON. The `fetch` listing is always JSON lines.

use colored::Colorize;
use serde::Serialize;

use crate::core::models::{CheckOutcome, Decision, Request, ReviewState, Verdict};
use crate::core::services::{ReconcileOutcome, RequestReport};

/// Output mode for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output (machine-readable)
    Json,
}

/// Verdicts of one review cycle
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Platform the cycle ran against
    pub platform: String,
    /// Whether nothing was mutated
    pub dry_run: bool,
    /// One entry per selected request
    pub requests: Vec<RequestSummary>,
}

/// What happened to one request
#[derive(Debug, Serialize)]
pub struct RequestSummary {
    /// Request identifier
    pub id: String,
    /// Aggregated check outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<CheckOutcome>,
    /// Skip or decision
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Review state set on the platform
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review: Option<ReviewState>,
    /// `posted`, `replaced`, `unchanged` or `none`
    pub comment: &'static str,
}

impl From<&RequestReport> for RequestSummary {
    fn from(report: &RequestReport) -> Self {
        let comment = match &report.comment {
            Some(ReconcileOutcome::Posted { replaced: Some(_), .. }) => "replaced",
            Some(ReconcileOutcome::Posted { replaced: None, .. }) => "posted",
            Some(ReconcileOutcome::TooSimilar { .. }) => "unchanged",
            Some(ReconcileOutcome::NothingToSay | ReconcileOutcome::NoPriorComment) | None => "none",
        };
        Self {
            id: report.request_id.clone(),
            outcome: report.outcome,
            verdict: report.verdict,
            review: report.transition,
            comment,
        }
    }
}

impl RunSummary {
    /// Summarise engine reports
    #[must_use]
    pub fn new(platform: &str, dry_run: bool, reports: &[RequestReport]) -> Self {
        Self {
            platform: platform.to_string(),
            dry_run,
            requests: reports.iter().map(RequestSummary::from).collect(),
        }
    }

    /// Render the summary based on output mode
    pub fn render(&self, mode: OutputMode) {
        match mode {
            OutputMode::Human => self.render_human(),
            OutputMode::Json => self.render_json(),
        }
    }

    fn render_human(&self) {
        if self.requests.is_empty() {
            println!("No requests to review.");
            return;
        }

        let prefix = if self.dry_run { "(dry run) " } else { "" };
        for request in &self.requests {
            let verdict = match request.verdict {
                Verdict::Skipped => "skipped".dimmed(),
                Verdict::Decided(Decision::Accept) => "accepted".green(),
                Verdict::Decided(Decision::Decline) => "declined".red(),
                Verdict::Decided(Decision::Delegate) => "delegated".yellow(),
                Verdict::Decided(Decision::Defer) => "deferred".normal(),
            };
            let review = request
                .review
                .map_or_else(String::new, |state| format!(" [review {state}]"));
            println!("{prefix}{} {verdict}{review}", request.id.bold());
        }
    }

    fn render_json(&self) {
        println!("{}", serde_json::to_string_pretty(self).unwrap_or_default());
    }
}

/// One line of the `fetch` listing
#[derive(Debug, Serialize)]
pub struct FetchRecord {
    /// Request identifier
    pub request: String,
    /// Source and target of each action
    pub actions: Vec<FetchAction>,
}

/// Source and target of one action
#[derive(Debug, Serialize)]
pub struct FetchAction {
    /// Source project
    pub sourceproject: Option<String>,
    /// Source package
    pub sourcepackage: Option<String>,
    /// Target project
    pub targetproject: Option<String>,
    /// Target package
    pub targetpackage: Option<String>,
}

impl From<&Request> for FetchRecord {
    fn from(request: &Request) -> Self {
        let actions = request
            .actions
            .iter()
            .map(|action| FetchAction {
                sourceproject: action.source.as_ref().map(|s| s.project.clone()),
                sourcepackage: action.source.as_ref().and_then(|s| s.package.clone()),
                targetproject: action.target.as_ref().map(|t| t.project.clone()),
                targetpackage: action.target.as_ref().and_then(|t| t.package.clone()),
            })
            .collect();
        Self {
            request: request.id.clone(),
            actions,
        }
    }
}

impl FetchRecord {
    /// Print as a single JSON line
    pub fn render(&self) {
        println!("{}", serde_json::to_string(self).unwrap_or_default());
    }
}
