//! Pluggable action checks
//!
//! The engine dispatches each action to the [`ActionCheck`] registered for
//! its type name, falling back to a default handler. How a check reaches its
//! verdict is opaque to the engine.

use std::collections::HashMap;

use log::{debug, warn};

use crate::core::models::{Action, ActionType, CheckOutcome, Request};
use crate::core::ports::SourceInfoProvider;

use super::comment_log::CommentLog;

/// Number of history revisions [`SourceMatchCheck`] inspects by default
pub const DEFAULT_HISTORY_LIMIT: usize = 5;

/// Everything a check may use while evaluating one request
pub struct CheckContext<'a> {
    /// Source metadata lookups (memoised per cycle)
    pub sources: &'a dyn SourceInfoProvider,
    log: CommentLog,
}

impl std::fmt::Debug for CheckContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckContext").field("log", &self.log).finish_non_exhaustive()
    }
}

impl<'a> CheckContext<'a> {
    /// Fresh context with an empty comment log
    #[must_use]
    pub fn new(sources: &'a dyn SourceInfoProvider) -> Self {
        Self {
            sources,
            log: CommentLog::new(),
        }
    }

    /// Add a line to the audit comment
    pub fn note(&mut self, line: impl Into<String>) {
        self.log.note(line);
    }

    /// Notes collected so far
    #[must_use]
    pub const fn log(&self) -> &CommentLog {
        &self.log
    }
}

/// A check for one kind of action
pub trait ActionCheck {
    /// Evaluate `action` of `request`
    ///
    /// An `Err` is treated as [`CheckOutcome::NoOpinion`] by the engine.
    fn check(&self, ctx: &mut CheckContext<'_>, request: &Request, action: &Action) -> anyhow::Result<CheckOutcome>;
}

/// A source-to-target submission, as seen by [`SourceSubmissionCheck`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSubmission {
    /// Project the sources come from
    pub source_project: String,
    /// Package the sources come from
    pub source_package: String,
    /// Submitted revision
    pub source_revision: Option<String>,
    /// Project receiving the sources
    pub target_project: String,
    /// Package receiving the sources
    pub target_package: String,
}

/// Decides whether a source submission is acceptable
pub trait SourceSubmissionCheck {
    /// Evaluate one submission
    fn check_source_submission(
        &self,
        ctx: &mut CheckContext<'_>,
        submission: &SourceSubmission,
    ) -> anyhow::Result<CheckOutcome>;
}

/// Submission check with no opinion on anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpinion;

impl SourceSubmissionCheck for NoOpinion {
    fn check_source_submission(
        &self,
        _ctx: &mut CheckContext<'_>,
        submission: &SourceSubmission,
    ) -> anyhow::Result<CheckOutcome> {
        debug!(
            "no opinion on {}/{} -> {}/{}",
            submission.source_project,
            submission.source_package,
            submission.target_project,
            submission.target_package
        );
        Ok(CheckOutcome::NoOpinion)
    }
}

/// Accepts a submission whose revision the target package already carries
///
/// The target's head is compared first, then up to `history_limit` past
/// revisions. A target package that does not exist yet gets no opinion.
#[derive(Debug, Clone, Copy)]
pub struct SourceMatchCheck {
    /// How many past revisions to inspect
    pub history_limit: usize,
}

impl Default for SourceMatchCheck {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl SourceSubmissionCheck for SourceMatchCheck {
    fn check_source_submission(
        &self,
        ctx: &mut CheckContext<'_>,
        submission: &SourceSubmission,
    ) -> anyhow::Result<CheckOutcome> {
        let project = &submission.target_project;
        let package = &submission.target_package;
        let Some(revision) = submission.source_revision.as_deref() else {
            ctx.note(format!("{}/{} has no revision to compare", submission.source_project, submission.source_package));
            return Ok(CheckOutcome::NoOpinion);
        };

        debug!("checking {package} in {project}");
        let Some(head) = ctx.sources.source_info(project, package, None)? else {
            debug!("new package");
            return Ok(CheckOutcome::NoOpinion);
        };

        if head.verify_checksum == revision {
            debug!("checksum matches head");
            return Ok(CheckOutcome::Accept);
        }

        if self.history_limit > 0 {
            debug!("{revision} not the latest version, checking history");
            let history = ctx.sources.package_history(project, package, self.history_limit)?;
            if history.iter().take(self.history_limit).any(|r| r == revision) {
                debug!("found {revision} in history");
                return Ok(CheckOutcome::Accept);
            }
        }

        ctx.note(format!("{revision} does not match {project}/{package} or its recent history"));
        Ok(CheckOutcome::Decline)
    }
}

/// Handler for action types without a registered check
#[derive(Debug, Clone, Copy, Default)]
pub struct UnhandledAction;

impl ActionCheck for UnhandledAction {
    fn check(&self, _ctx: &mut CheckContext<'_>, request: &Request, action: &Action) -> anyhow::Result<CheckOutcome> {
        warn!("{}: unhandled action type {}", request.id, action.action_type);
        Ok(CheckOutcome::NoOpinion)
    }
}

/// `submit`: hand the source/target pair to the submission check
pub struct SubmitCheck<'s> {
    submission: &'s dyn SourceSubmissionCheck,
}

impl ActionCheck for SubmitCheck<'_> {
    fn check(&self, ctx: &mut CheckContext<'_>, request: &Request, action: &Action) -> anyhow::Result<CheckOutcome> {
        let Some(submission) = submission_of(action, None) else {
            warn!("{}: submit action without source or target package", request.id);
            return Ok(CheckOutcome::NoOpinion);
        };
        self.submission.check_source_submission(ctx, &submission)
    }
}

/// `maintenance_incident`: check against the release project
///
/// The target package name carries the incident number as a suffix
/// (`vim.1234`), which is dropped.
pub struct MaintenanceIncidentCheck<'s> {
    submission: &'s dyn SourceSubmissionCheck,
}

impl ActionCheck for MaintenanceIncidentCheck<'_> {
    fn check(&self, ctx: &mut CheckContext<'_>, request: &Request, action: &Action) -> anyhow::Result<CheckOutcome> {
        let Some(mut submission) = submission_of(action, action.release_project.as_deref()) else {
            debug!("{}: incident without source or target package", request.id);
            return Ok(CheckOutcome::NoOpinion);
        };
        submission.target_package = strip_incident_suffix(&submission.target_package).to_string();
        self.submission.check_source_submission(ctx, &submission)
    }
}

/// `maintenance_release`: check the released sources against their origin
pub struct MaintenanceReleaseCheck<'s> {
    submission: &'s dyn SourceSubmissionCheck,
}

impl ActionCheck for MaintenanceReleaseCheck<'_> {
    fn check(&self, ctx: &mut CheckContext<'_>, request: &Request, action: &Action) -> anyhow::Result<CheckOutcome> {
        let Some(mut submission) = submission_of(action, None) else {
            warn!("{}: release action without source or target package", request.id);
            return Ok(CheckOutcome::NoOpinion);
        };
        submission.target_package = strip_incident_suffix(&submission.target_package).to_string();

        let info = ctx.sources.source_info(
            &submission.source_project,
            &submission.source_package,
            submission.source_revision.as_deref(),
        )?;
        if let Some(origin) = info.and_then(|i| i.origin_project) {
            debug!("{}: released package originates from {origin}", request.id);
            submission.source_project = origin;
        }

        self.submission.check_source_submission(ctx, &submission)
    }
}

/// Maps action type names to checks
pub struct CheckRegistry<'s> {
    by_type: HashMap<String, Box<dyn ActionCheck + 's>>,
    default: Box<dyn ActionCheck + 's>,
}

impl std::fmt::Debug for CheckRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.by_type.keys().collect();
        types.sort();
        f.debug_struct("CheckRegistry").field("types", &types).finish_non_exhaustive()
    }
}

impl Default for CheckRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s> CheckRegistry<'s> {
    /// Registry where every action gets the default handler
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            default: Box::new(UnhandledAction),
        }
    }

    /// Registry with the submit and maintenance checks wired to `submission`
    #[must_use]
    pub fn standard(submission: &'s dyn SourceSubmissionCheck) -> Self {
        Self::new()
            .with(ActionType::Submit, SubmitCheck { submission })
            .with(ActionType::MaintenanceIncident, MaintenanceIncidentCheck { submission })
            .with(ActionType::MaintenanceRelease, MaintenanceReleaseCheck { submission })
    }

    /// Register `check` for `action_type`, replacing any previous one
    #[must_use]
    pub fn with(mut self, action_type: ActionType, check: impl ActionCheck + 's) -> Self {
        self.by_type.insert(action_type.name().to_string(), Box::new(check));
        self
    }

    /// Replace the default handler
    #[must_use]
    pub fn with_default(mut self, check: impl ActionCheck + 's) -> Self {
        self.default = Box::new(check);
        self
    }

    /// The check responsible for `action_type`
    #[must_use]
    pub fn resolve(&self, action_type: &ActionType) -> &dyn ActionCheck {
        self.by_type
            .get(action_type.name())
            .map_or(self.default.as_ref(), |check| check.as_ref())
    }
}

fn submission_of(action: &Action, target_project: Option<&str>) -> Option<SourceSubmission> {
    let source = action.source.as_ref()?;
    let target = action.target.as_ref()?;
    Some(SourceSubmission {
        source_project: source.project.clone(),
        source_package: source.package.clone()?,
        source_revision: source.revision.clone(),
        target_project: target_project.unwrap_or(&target.project).to_string(),
        target_package: target.package.clone().or_else(|| source.package.clone())?,
    })
}

fn strip_incident_suffix(package: &str) -> &str {
    match package.rsplit_once('.') {
        Some((name, suffix)) if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) => name,
        _ => package,
    }
}
