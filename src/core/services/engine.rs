//! Review decision engine
//!
//! For each request: optional age gate, one check per action (dispatched by
//! type), aggregation, the decision table, one audit comment and at most one
//! review transition. Requests are processed strictly one after another.
//!
//! A failing check degrades to [`CheckOutcome::NoOpinion`]; it never accepts
//! or declines. Collaborator errors propagate to the caller.

use log::{debug, error, info, warn};

use crate::core::models::{
    CheckOutcome, CommentTarget, Decision, Request, ReviewMode, ReviewState, Reviewer, ReviewerIdentity,
    Verdict,
};
use crate::core::ports::{Clock, CommentStore, ProjectConfig, RequestRepository, SourceInfoProvider};

use super::checks::{CheckContext, CheckRegistry};
use super::decision::decide;
use super::reconciler::{CommentReconciler, CommentRequest, ReconcileOutcome};

/// Review message when accepting
pub const ACCEPT_MESSAGE: &str = "ok";
/// Review message when declining
pub const DECLINE_MESSAGE: &str = "review failed";
/// Review message when handing a request to the fallback reviewer
pub const DELEGATE_MESSAGE: &str = "Automated review needs fallback reviewer.";
/// Project config key holding the minimum request age in seconds
pub const DEFAULT_AGE_MIN_KEY: &str = "request-age-min";

/// Per-instance engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Identity written into comment markers
    pub bot_name: String,
    /// User and/or group the bot reviews as
    pub reviewer: ReviewerIdentity,
    /// Who gets delegated reviews
    pub fallback: ReviewerIdentity,
    /// Review policy
    pub review_mode: ReviewMode,
    /// Decide and report, but never mutate
    pub dry_run: bool,
    /// Post audit comments
    pub comment: bool,
    /// Leave multi-action requests to a human
    pub only_one_action: bool,
    /// Explicit minimum request age in seconds, overriding project config
    pub request_age_min: Option<i64>,
    /// Project config key consulted when no explicit minimum is set
    pub request_age_min_key: String,
    /// Minimum age when neither explicit nor project value is set
    pub request_age_min_default: i64,
}

impl EngineConfig {
    /// Defaults for `bot_name` reviewing as `reviewer`
    #[must_use]
    pub fn new(bot_name: impl Into<String>, reviewer: ReviewerIdentity) -> Self {
        Self {
            bot_name: bot_name.into(),
            reviewer,
            fallback: ReviewerIdentity::default(),
            review_mode: ReviewMode::Normal,
            dry_run: false,
            comment: true,
            only_one_action: false,
            request_age_min: None,
            request_age_min_key: DEFAULT_AGE_MIN_KEY.to_string(),
            request_age_min_default: 0,
        }
    }
}

/// The collaborators an engine talks to
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Requests and review transitions
    pub requests: &'a dyn RequestRepository,
    /// Comment storage
    pub comments: &'a dyn CommentStore,
    /// Source metadata for checks
    pub sources: &'a dyn SourceInfoProvider,
    /// Per-project configuration
    pub project_config: &'a dyn ProjectConfig,
    /// Time source for the age gate
    pub clock: &'a dyn Clock,
}

impl std::fmt::Debug for Collaborators<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// What happened to one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReport {
    /// Request identifier
    pub request_id: String,
    /// Aggregated check outcome (`None` when skipped)
    pub outcome: Option<CheckOutcome>,
    /// Skip or decision
    pub verdict: Verdict,
    /// Review transition issued (or that would be, under dry run)
    pub transition: Option<ReviewState>,
    /// Audit comment handling
    pub comment: Option<ReconcileOutcome>,
}

impl RequestReport {
    fn skipped(request: &Request) -> Self {
        Self {
            request_id: request.id.clone(),
            outcome: None,
            verdict: Verdict::Skipped,
            transition: None,
            comment: None,
        }
    }
}

/// Evaluates requests and records verdicts
#[derive(Debug)]
pub struct ReviewEngine<'a> {
    config: EngineConfig,
    ports: Collaborators<'a>,
    checks: CheckRegistry<'a>,
}

impl<'a> ReviewEngine<'a> {
    /// Create an engine
    #[must_use]
    pub const fn new(config: EngineConfig, ports: Collaborators<'a>, checks: CheckRegistry<'a>) -> Self {
        Self { config, ports, checks }
    }

    /// Active settings
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Review every request in order
    pub fn check_requests(&self, requests: &[Request]) -> anyhow::Result<Vec<RequestReport>> {
        let mut reports = Vec::with_capacity(requests.len());
        for request in requests {
            reports.push(self.review_request(request)?);
        }
        Ok(reports)
    }

    /// Review one request: gate, evaluate, comment, transition
    pub fn review_request(&self, request: &Request) -> anyhow::Result<RequestReport> {
        info!("checking {}", request.id);

        if self.request_age_wait(request)? {
            return Ok(RequestReport::skipped(request));
        }

        let mut ctx = CheckContext::new(self.ports.sources);
        let outcome = self.evaluate(&mut ctx, request);
        let decision = decide(self.config.review_mode, outcome);
        debug!("{}: outcome {outcome:?} -> {decision}", request.id);

        if self.config.review_mode == ReviewMode::NoOp {
            info!("{} evaluated as {outcome:?}, review mode {} leaves it alone", request.id, ReviewMode::NoOp);
            return Ok(RequestReport {
                request_id: request.id.clone(),
                outcome: Some(outcome),
                verdict: Verdict::Decided(decision),
                transition: None,
                comment: None,
            });
        }

        let comment = if self.config.comment {
            Some(self.write_comment(request, decision, &ctx.log().lines())?)
        } else {
            None
        };

        let transition = self.apply(request, decision)?;

        Ok(RequestReport {
            request_id: request.id.clone(),
            outcome: Some(outcome),
            verdict: Verdict::Decided(decision),
            transition,
            comment,
        })
    }

    /// Run the check of every action and aggregate the lowest outcome
    pub fn evaluate(&self, ctx: &mut CheckContext<'_>, request: &Request) -> CheckOutcome {
        if request.actions.is_empty() {
            warn!("{}: request has no actions", request.id);
            return CheckOutcome::NoOpinion;
        }

        if self.config.only_one_action && request.actions.len() != 1 {
            ctx.note("Only requests with a single action are handled automatically.");
            return CheckOutcome::NoOpinion;
        }

        let mut overall = CheckOutcome::Accept;
        for action in &request.actions {
            let check = self.checks.resolve(&action.action_type);
            let outcome = match check.check(ctx, request, action) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("{}: check of {} action failed: {e:#}", request.id, action.action_type);
                    CheckOutcome::NoOpinion
                },
            };
            debug!("{}: {} action -> {outcome:?}", request.id, action.action_type);
            overall = overall.combine(outcome);
        }
        overall
    }

    /// Whether `request` is too young to be evaluated this cycle
    ///
    /// The minimum comes from the explicit setting, else the target
    /// project's config key, else the built-in default.
    pub fn request_age_wait(&self, request: &Request) -> anyhow::Result<bool> {
        let age_min = self.request_age_min(request)?;
        let age = request.age(self.ports.clock.now()).num_seconds();
        if age < age_min {
            info!("skipping {} of age {age}s since it is younger than {age_min}s", request.id);
            return Ok(true);
        }
        Ok(false)
    }

    fn request_age_min(&self, request: &Request) -> anyhow::Result<i64> {
        if let Some(explicit) = self.config.request_age_min {
            return Ok(explicit);
        }

        let Some(project) = request.target_project() else {
            return Ok(self.config.request_age_min_default);
        };

        match self.ports.project_config.get(project, &self.config.request_age_min_key)? {
            Some(value) => value.trim().parse().or_else(|_| {
                warn!(
                    "{project}: ignoring non-numeric {} value {value:?}",
                    self.config.request_age_min_key
                );
                Ok(self.config.request_age_min_default)
            }),
            None => Ok(self.config.request_age_min_default),
        }
    }

    fn write_comment(
        &self,
        request: &Request,
        decision: Decision,
        notes: &[String],
    ) -> anyhow::Result<ReconcileOutcome> {
        let reconciler = CommentReconciler::new(self.ports.comments, &self.config.bot_name, self.config.dry_run);
        let target = CommentTarget::Request(request.id.clone());

        let comment = match decision {
            Decision::Defer => CommentRequest::new(target).state("seen"),
            decided => {
                let message = if notes.is_empty() {
                    review_message(decided).to_string()
                } else {
                    notes.join("\n\n")
                };
                CommentRequest::new(target).state("done").result(decided.as_str()).message(message)
            },
        };

        reconciler.reconcile(&comment, notes)
    }

    fn apply(&self, request: &Request, decision: Decision) -> anyhow::Result<Option<ReviewState>> {
        match decision {
            Decision::Defer => {
                info!("{} ignored", request.id);
                Ok(None)
            },
            Decision::Accept => self.set_review(request, ReviewState::Accepted, ACCEPT_MESSAGE),
            Decision::Decline => self.set_review(request, ReviewState::Declined, DECLINE_MESSAGE),
            Decision::Delegate => {
                let fallback = self.config.fallback.reviewers();
                if fallback.is_empty() {
                    warn!("{} needs fallback reviewer but none is configured", request.id);
                    return Ok(None);
                }

                info!("{} needs fallback reviewer", request.id);
                for reviewer in &fallback {
                    self.add_review(request, reviewer, DELEGATE_MESSAGE, false)?;
                }

                if self.ports.requests.closes_review_on_delegate() {
                    self.set_review(request, ReviewState::Accepted, DELEGATE_MESSAGE)
                } else {
                    Ok(None)
                }
            },
        }
    }

    /// Move the bot's own open review to `state`
    ///
    /// Does nothing when the bot has no open review on the request.
    pub fn set_review(
        &self,
        request: &Request,
        state: ReviewState,
        message: &str,
    ) -> anyhow::Result<Option<ReviewState>> {
        if !request.has_open_review_for(&self.config.reviewer) {
            info!("{} review not changed: {} has no open review", request.id, self.config.reviewer);
            return Ok(None);
        }

        info!("{} {state}: {message}", request.id);
        if self.config.dry_run {
            info!("(dry run) would set {} to {state} with message {message}", request.id);
        } else {
            self.ports
                .requests
                .set_review_state(request, &self.config.reviewer, state, message)?;
        }
        Ok(Some(state))
    }

    /// Add an open review for `reviewer`
    ///
    /// An existing open review by the same reviewer is left alone unless
    /// `allow_duplicate` is set. Returns whether a review was (or would be)
    /// added.
    pub fn add_review(
        &self,
        request: &Request,
        reviewer: &Reviewer,
        message: &str,
        allow_duplicate: bool,
    ) -> anyhow::Result<bool> {
        if !allow_duplicate && request.has_open_review(reviewer) {
            debug!("{} already has an open review by {reviewer}", request.id);
            return Ok(false);
        }

        if self.config.dry_run {
            info!("(dry run) would add review by {reviewer} to {}", request.id);
        } else {
            self.ports.requests.add_review(request, reviewer, message)?;
        }
        Ok(true)
    }
}

/// Default review message for a decision
#[must_use]
pub const fn review_message(decision: Decision) -> &'static str {
    match decision {
        Decision::Accept => ACCEPT_MESSAGE,
        Decision::Decline => DECLINE_MESSAGE,
        Decision::Delegate => DELEGATE_MESSAGE,
        Decision::Defer => "",
    }
}
