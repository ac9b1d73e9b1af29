//! Test data builders

use chrono::{DateTime, Duration, Utc};
use reviewbot::core::models::{Action, ActionType, PackageRef, Request, Review, ReviewState, Reviewer};

/// Fixed "now" used by the fake clock
pub fn now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_709_287_200, 0).unwrap()
}

/// A time `hours` before [`now`]
pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    now() - Duration::hours(hours)
}

/// A submit request from `devel:tools/vim` to `openSUSE:Factory/vim`
/// with an open review by the user `bot`, created two days ago
pub fn submit_request(id: &str) -> Request {
    Request::new(id, "alice", hours_ago(48))
        .with_action(
            Action::new(ActionType::Submit)
                .with_source(PackageRef::package("devel:tools", "vim").at("abc123"))
                .with_target(PackageRef::package("openSUSE:Factory", "vim")),
        )
        .with_review(Review::new(Reviewer::User("bot".into()), ReviewState::New))
}
