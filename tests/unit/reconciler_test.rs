//! Tests for managed comment reconciliation

use reviewbot::core::models::CommentTarget;
use reviewbot::core::services::{CommentReconciler, CommentRequest, ReconcileOutcome};

use crate::common::mocks::FakePlatform;

fn target() -> CommentTarget {
    CommentTarget::Request("4711".to_string())
}

fn done(result: &str, message: &str) -> CommentRequest {
    CommentRequest::new(target()).state("done").result(result).message(message)
}

#[test]
fn test_reconcile_is_idempotent() {
    let platform = FakePlatform::new();
    let reconciler = CommentReconciler::new(&platform, "check-source", false);
    let request = done("accepted", "Looks good.");

    let first = reconciler.reconcile(&request, &[]).unwrap();
    let second = reconciler.reconcile(&request, &[]).unwrap();

    assert!(matches!(first, ReconcileOutcome::Posted { replaced: None, applied: true, .. }));
    assert_eq!(second, ReconcileOutcome::TooSimilar { comment_id: "1".into() });
    assert_eq!(platform.comment_bodies(&target()).len(), 1);
}

#[test]
fn test_human_comments_are_never_touched() {
    let platform = FakePlatform::new();
    platform.seed_comment(target(), "alice", "Please have a look");
    let reconciler = CommentReconciler::new(&platform, "check-source", false);

    reconciler.reconcile(&done("accepted", "ok"), &[]).unwrap();
    reconciler
        .reconcile(&done("declined", "missing changelog\nand license"), &[])
        .unwrap();

    let bodies = platform.comment_bodies(&target());
    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0], "Please have a look");
    assert!(bodies[1].ends_with("<!-- check-source result=declined state=done -->"));
    assert_eq!(*platform.deleted.borrow(), vec!["2".to_string()]);
}

#[test]
fn test_other_bots_keep_their_comments() {
    let platform = FakePlatform::new();
    let legal = CommentReconciler::new(&platform, "legal-auto", false);
    let source = CommentReconciler::new(&platform, "check-source", false);

    legal.reconcile(&done("accepted", "legal ok"), &[]).unwrap();
    source.reconcile(&done("declined", "bad\nsources"), &[]).unwrap();
    source.reconcile(&done("accepted", "good"), &[]).unwrap();

    let bodies = platform.comment_bodies(&target());
    assert_eq!(bodies.len(), 2);
    assert!(bodies.iter().any(|b| b.starts_with("legal ok")));
    assert!(bodies.iter().any(|b| b.starts_with("good")));
}

#[test]
fn test_only_replace_without_prior_comment_posts_nothing() {
    let platform = FakePlatform::new();
    let reconciler = CommentReconciler::new(&platform, "check-source", false);

    let outcome = reconciler
        .reconcile(&done("accepted", "ok").only_replace(), &[])
        .unwrap();

    assert_eq!(outcome, ReconcileOutcome::NoPriorComment);
    assert!(platform.posted.borrow().is_empty());
}

#[test]
fn test_only_replace_replaces_existing() {
    let platform = FakePlatform::new();
    let reconciler = CommentReconciler::new(&platform, "check-source", false);
    reconciler.reconcile(&done("declined", "first"), &[]).unwrap();

    let outcome = reconciler
        .reconcile(&done("accepted", "second").only_replace(), &[])
        .unwrap();

    assert!(matches!(outcome, ReconcileOutcome::Posted { replaced: Some(ref id), .. } if id == "1"));
    assert_eq!(platform.comment_bodies(&target()).len(), 1);
}

#[test]
fn test_identical_reposts_reworded_message() {
    let platform = FakePlatform::new();
    let reconciler = CommentReconciler::new(&platform, "check-source", false);
    reconciler.reconcile(&done("accepted", "looks fine"), &[]).unwrap();

    let loose = reconciler.reconcile(&done("accepted", "looks great"), &[]).unwrap();
    assert!(matches!(loose, ReconcileOutcome::TooSimilar { .. }));

    let strict = reconciler
        .reconcile(&done("accepted", "looks great").identical(), &[])
        .unwrap();
    assert!(matches!(strict, ReconcileOutcome::Posted { replaced: Some(_), .. }));
    assert!(platform.comment_bodies(&target())[0].starts_with("looks great"));
}

#[test]
fn test_extra_info_not_identical_still_finds_prior_comment() {
    let platform = FakePlatform::new();
    let reconciler = CommentReconciler::new(&platform, "check-source", false);
    reconciler
        .reconcile(&done("accepted", "one").extra("build", "17"), &[])
        .unwrap();

    let outcome = reconciler
        .reconcile(&done("accepted", "one").extra("build", "18").extra_informational(), &[])
        .unwrap();

    assert!(matches!(outcome, ReconcileOutcome::TooSimilar { .. }));
}

#[test]
fn test_state_change_replaces_previous_comment() {
    let platform = FakePlatform::new();
    let reconciler = CommentReconciler::new(&platform, "check-source", false);

    reconciler
        .reconcile(&CommentRequest::new(target()).state("pending").message("checking"), &[])
        .unwrap();
    reconciler
        .reconcile(&done("accepted", "all checks passed\nsee build log"), &[])
        .unwrap();

    assert_eq!(
        platform.comment_bodies(&target()),
        ["all checks passed\nsee build log\n\n<!-- check-source result=accepted state=done -->"]
    );
}

#[test]
fn test_dry_run_reads_but_never_writes() {
    let platform = FakePlatform::new();
    CommentReconciler::new(&platform, "check-source", false)
        .reconcile(&done("declined", "no"), &[])
        .unwrap();

    let dry = CommentReconciler::new(&platform, "check-source", true);
    let outcome = dry.reconcile(&done("accepted", "yes\nreally"), &[]).unwrap();

    assert!(matches!(outcome, ReconcileOutcome::Posted { replaced: Some(_), applied: false, .. }));
    assert_eq!(platform.posted.borrow().len(), 1);
    assert!(platform.deleted.borrow().is_empty());
}
