//! Tests for the review engine against an in-memory platform

use anyhow::bail;
use reviewbot::core::models::{
    Action, ActionType, CheckOutcome, CommentTarget, Decision, PackageRef, Request, ReviewMode, ReviewState,
    Reviewer, ReviewerIdentity, Verdict,
};
use reviewbot::core::services::checks::{ActionCheck, NoOpinion};
use reviewbot::core::services::{
    CheckContext, CheckRegistry, Collaborators, EngineConfig, ReconcileOutcome, ReviewEngine, SourceMatchCheck,
};

use crate::common::fixtures::{hours_ago, submit_request};
use crate::common::mocks::{FakePlatform, FixedClock, Transition};

/// Check returning a fixed outcome, optionally leaving a note
struct Fixed {
    outcome: CheckOutcome,
    note: Option<&'static str>,
}

impl ActionCheck for Fixed {
    fn check(&self, ctx: &mut CheckContext<'_>, _request: &Request, _action: &Action) -> anyhow::Result<CheckOutcome> {
        if let Some(note) = self.note {
            ctx.note(note);
        }
        Ok(self.outcome)
    }
}

struct Failing;

impl ActionCheck for Failing {
    fn check(&self, _ctx: &mut CheckContext<'_>, _request: &Request, _action: &Action) -> anyhow::Result<CheckOutcome> {
        bail!("checker crashed")
    }
}

fn fixed(outcome: CheckOutcome, note: Option<&'static str>) -> CheckRegistry<'static> {
    CheckRegistry::new().with(ActionType::Submit, Fixed { outcome, note })
}

fn config() -> EngineConfig {
    EngineConfig::new("ReviewBot", ReviewerIdentity::new(Some("bot".into()), None))
}

fn ports<'a>(platform: &'a FakePlatform, clock: &'a FixedClock) -> Collaborators<'a> {
    Collaborators {
        requests: platform,
        comments: platform,
        sources: platform,
        project_config: platform,
        clock,
    }
}

fn target(id: &str) -> CommentTarget {
    CommentTarget::Request(id.to_string())
}

#[test]
fn test_accept_posts_one_comment_and_one_transition() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let report = engine.review_request(&submit_request("1")).unwrap();

    assert_eq!(report.verdict, Verdict::Decided(Decision::Accept));
    assert_eq!(report.transition, Some(ReviewState::Accepted));
    assert_eq!(
        *platform.transitions.borrow(),
        vec![Transition {
            request: "1".into(),
            state: ReviewState::Accepted,
            message: "ok".into(),
        }]
    );

    let bodies = platform.comment_bodies(&target("1"));
    assert_eq!(bodies, vec!["ok\n\n<!-- ReviewBot result=accepted state=done -->".to_string()]);
}

#[test]
fn test_second_run_leaves_comment_alone() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), fixed(CheckOutcome::Accept, None));
    let request = submit_request("1");

    engine.review_request(&request).unwrap();
    let report = engine.review_request(&request).unwrap();

    assert!(matches!(report.comment, Some(ReconcileOutcome::TooSimilar { .. })));
    assert_eq!(platform.posted.borrow().len(), 1);
    assert!(platform.deleted.borrow().is_empty());
    assert_eq!(platform.comment_bodies(&target("1")).len(), 1);
}

#[test]
fn test_changed_verdict_replaces_comment() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let request = submit_request("1");

    let first = ReviewEngine::new(config(), ports(&platform, &clock), fixed(CheckOutcome::Accept, None));
    first.review_request(&request).unwrap();

    let second = ReviewEngine::new(
        config(),
        ports(&platform, &clock),
        fixed(CheckOutcome::Decline, Some("vim has no license file")),
    );
    let report = second.review_request(&request).unwrap();

    assert!(matches!(
        report.comment,
        Some(ReconcileOutcome::Posted { replaced: Some(_), .. })
    ));
    let bodies = platform.comment_bodies(&target("1"));
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].starts_with("vim has no license file"));
    assert!(bodies[0].ends_with("<!-- ReviewBot result=declined state=done -->"));
    assert_eq!(platform.transitions.borrow()[1].state, ReviewState::Declined);
    assert_eq!(platform.transitions.borrow()[1].message, "review failed");
}

#[test]
fn test_young_request_is_skipped_without_mutations() {
    let platform = FakePlatform::new();
    platform.set_config("openSUSE:Factory", "request-age-min", "86400");
    let clock = FixedClock::default();
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let mut request = submit_request("1");
    request.created_at = hours_ago(2);

    let report = engine.review_request(&request).unwrap();

    assert_eq!(report.verdict, Verdict::Skipped);
    assert_eq!(report.outcome, None);
    assert_eq!(platform.mutation_count(), 0);
}

#[test]
fn test_explicit_age_minimum_overrides_project_config() {
    let platform = FakePlatform::new();
    platform.set_config("openSUSE:Factory", "request-age-min", "86400");
    let clock = FixedClock::default();
    let mut config = config();
    config.request_age_min = Some(3600);
    let engine = ReviewEngine::new(config, ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let mut request = submit_request("1");
    request.created_at = hours_ago(2);

    let report = engine.review_request(&request).unwrap();
    assert_eq!(report.verdict, Verdict::Decided(Decision::Accept));
}

#[test]
fn test_fallback_on_fail_delegates_and_closes_own_review() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let mut config = config();
    config.review_mode = ReviewMode::FallbackOnFail;
    config.fallback = ReviewerIdentity::new(None, Some("factory-staging".into()));
    let engine = ReviewEngine::new(config, ports(&platform, &clock), fixed(CheckOutcome::Decline, None));

    let report = engine.review_request(&submit_request("1")).unwrap();

    assert_eq!(report.verdict, Verdict::Decided(Decision::Delegate));
    assert_eq!(
        *platform.added_reviews.borrow(),
        vec![("1".to_string(), Reviewer::Group("factory-staging".into()))]
    );
    let transitions = platform.transitions.borrow();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].state, ReviewState::Accepted);
    assert_eq!(transitions[0].message, "Automated review needs fallback reviewer.");
}

#[test]
fn test_delegate_keeps_review_where_platform_does_not_require_closing() {
    let platform = FakePlatform::new().keeping_review_on_delegate();
    let clock = FixedClock::default();
    let mut config = config();
    config.review_mode = ReviewMode::FallbackAlways;
    config.fallback = ReviewerIdentity::new(Some("human".into()), None);
    let engine = ReviewEngine::new(config, ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let report = engine.review_request(&submit_request("1")).unwrap();

    assert_eq!(report.transition, None);
    assert_eq!(platform.added_reviews.borrow().len(), 1);
    assert!(platform.transitions.borrow().is_empty());
}

#[test]
fn test_existing_fallback_review_not_duplicated() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let mut config = config();
    config.review_mode = ReviewMode::FallbackAlways;
    config.fallback = ReviewerIdentity::new(Some("human".into()), None);
    let engine = ReviewEngine::new(config, ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let request = submit_request("1").with_review(reviewbot::core::models::Review::new(
        Reviewer::User("human".into()),
        ReviewState::New,
    ));
    engine.review_request(&request).unwrap();

    assert!(platform.added_reviews.borrow().is_empty());
}

#[test]
fn test_no_op_mode_never_mutates() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let mut config = config();
    config.review_mode = ReviewMode::NoOp;
    let engine = ReviewEngine::new(
        config,
        ports(&platform, &clock),
        fixed(CheckOutcome::Decline, Some("bad")),
    );

    let report = engine.review_request(&submit_request("1")).unwrap();

    assert_eq!(report.outcome, Some(CheckOutcome::Decline));
    assert_eq!(report.comment, None);
    assert_eq!(platform.mutation_count(), 0);
}

#[test]
fn test_dry_run_reports_but_never_mutates() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let mut config = config();
    config.dry_run = true;
    let engine = ReviewEngine::new(config, ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let report = engine.review_request(&submit_request("1")).unwrap();

    assert_eq!(report.transition, Some(ReviewState::Accepted));
    assert!(matches!(report.comment, Some(ReconcileOutcome::Posted { applied: false, .. })));
    assert_eq!(platform.mutation_count(), 0);
}

#[test]
fn test_failing_check_degrades_to_defer() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let engine = ReviewEngine::new(
        config(),
        ports(&platform, &clock),
        CheckRegistry::new().with(ActionType::Submit, Failing),
    );

    let report = engine.review_request(&submit_request("1")).unwrap();

    assert_eq!(report.outcome, Some(CheckOutcome::NoOpinion));
    assert_eq!(report.verdict, Verdict::Decided(Decision::Defer));
    assert_eq!(report.comment, Some(ReconcileOutcome::NothingToSay));
    assert_eq!(platform.mutation_count(), 0);
}

#[test]
fn test_lowest_action_outcome_wins() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let checks = CheckRegistry::new()
        .with(ActionType::Submit, Fixed {
            outcome: CheckOutcome::Accept,
            note: None,
        })
        .with(ActionType::Other("delete".into()), Fixed {
            outcome: CheckOutcome::Decline,
            note: Some("deleting vim breaks the build"),
        });
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), checks);

    let request = submit_request("1").with_action(
        Action::new(ActionType::Other("delete".into())).with_target(PackageRef::package("openSUSE:Factory", "vim")),
    );
    let report = engine.review_request(&request).unwrap();

    assert_eq!(report.outcome, Some(CheckOutcome::Decline));
    assert_eq!(report.transition, Some(ReviewState::Declined));
}

#[test]
fn test_only_one_action_defers_with_seen_comment() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let mut config = config();
    config.only_one_action = true;
    let engine = ReviewEngine::new(config, ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let request = submit_request("1").with_action(
        Action::new(ActionType::Submit)
            .with_source(PackageRef::package("devel:tools", "emacs"))
            .with_target(PackageRef::package("openSUSE:Factory", "emacs")),
    );
    let report = engine.review_request(&request).unwrap();

    assert_eq!(report.verdict, Verdict::Decided(Decision::Defer));
    assert!(platform.transitions.borrow().is_empty());
    let bodies = platform.comment_bodies(&target("1"));
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].ends_with("<!-- ReviewBot state=seen -->"));
}

#[test]
fn test_no_open_review_means_no_transition() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let mut request = submit_request("1");
    request.reviews.clear();
    let report = engine.review_request(&request).unwrap();

    assert_eq!(report.verdict, Verdict::Decided(Decision::Accept));
    assert_eq!(report.transition, None);
    assert!(platform.transitions.borrow().is_empty());
}

#[test]
fn test_comments_disabled() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let mut config = config();
    config.comment = false;
    let engine = ReviewEngine::new(config, ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let report = engine.review_request(&submit_request("1")).unwrap();

    assert_eq!(report.comment, None);
    assert!(platform.posted.borrow().is_empty());
    assert_eq!(platform.transitions.borrow().len(), 1);
}

#[test]
fn test_source_match_through_standard_registry() {
    let platform = FakePlatform::new();
    platform.set_source("openSUSE:Factory", "vim", "abc123");
    let clock = FixedClock::default();
    let source_match = SourceMatchCheck::default();
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), CheckRegistry::standard(&source_match));

    let report = engine.review_request(&submit_request("1")).unwrap();
    assert_eq!(report.verdict, Verdict::Decided(Decision::Accept));

    let no_opinion = NoOpinion;
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), CheckRegistry::standard(&no_opinion));
    let report = engine.review_request(&submit_request("2")).unwrap();
    assert_eq!(report.verdict, Verdict::Decided(Decision::Defer));
}

#[test]
fn test_check_requests_in_order() {
    let platform = FakePlatform::new();
    let clock = FixedClock::default();
    let engine = ReviewEngine::new(config(), ports(&platform, &clock), fixed(CheckOutcome::Accept, None));

    let reports = engine
        .check_requests(&[submit_request("1"), submit_request("2")])
        .unwrap();

    let ids: Vec<_> = reports.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, ["1", "2"]);
    let transitioned: Vec<_> = platform.transitions.borrow().iter().map(|t| t.request.clone()).collect();
    assert_eq!(transitioned, ["1", "2"]);
}
