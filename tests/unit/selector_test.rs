//! Tests for request selection

use reviewbot::core::models::{ActionType, ProjectFilter, RequestState, ReviewerIdentity};
use reviewbot::core::services::selector::{dedup_by_id, drain_pages};
use reviewbot::core::services::{RequestSelector, Selection};

use crate::common::fixtures::{hours_ago, submit_request};
use crate::common::mocks::FakePlatform;

#[test]
fn test_ids_fetched_in_order_without_duplicates() {
    let platform = FakePlatform::with_requests(vec![submit_request("1"), submit_request("2")]);
    let selector = RequestSelector::new(&platform);

    let requests = selector
        .select(&Selection::Ids(vec!["2".into(), "1".into(), "2".into()]))
        .unwrap();

    let ids: Vec<_> = requests.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["2", "1"]);
}

#[test]
fn test_unknown_id_is_an_error() {
    let platform = FakePlatform::new();
    let selector = RequestSelector::new(&platform);
    assert!(selector.select(&Selection::Ids(vec!["404".into()])).is_err());
}

#[test]
fn test_assigned_to_user_and_group_queries_each_and_dedups() {
    let mut both = submit_request("3");
    both.reviews.push(reviewbot::core::models::Review::new(
        reviewbot::core::models::Reviewer::Group("team".into()),
        reviewbot::core::models::ReviewState::New,
    ));
    let platform = FakePlatform::with_requests(vec![submit_request("1"), both]);
    let selector = RequestSelector::new(&platform);

    let identity = ReviewerIdentity::new(Some("bot".into()), Some("team".into()));
    let requests = selector.select(&Selection::AssignedTo(identity)).unwrap();

    let ids: Vec<_> = requests.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "3"]);
    assert_eq!(platform.searches.borrow().len(), 2);
}

#[test]
fn test_empty_result_is_not_an_error() {
    let platform = FakePlatform::new();
    let selector = RequestSelector::new(&platform);

    let requests = selector
        .select(&Selection::AssignedTo(ReviewerIdentity::new(Some("bot".into()), None)))
        .unwrap();

    assert!(requests.is_empty());
}

#[test]
fn test_project_type_query() {
    let platform = FakePlatform::with_requests(vec![submit_request("1")]);
    let selector = RequestSelector::new(&platform);

    let requests = selector
        .select(&Selection::ProjectType {
            project: "openSUSE:Factory".into(),
            action_type: ActionType::Submit,
        })
        .unwrap();
    assert_eq!(requests.len(), 1);

    let query = &platform.searches.borrow()[0];
    assert_eq!(query.target_project, Some(ProjectFilter::Exact("openSUSE:Factory".into())));
    assert_eq!(query.states, [RequestState::Review, RequestState::New]);
}

#[test]
fn test_namespace_query_honours_horizon() {
    let mut stale = submit_request("old");
    stale.updated_at = hours_ago(72);
    let mut fresh = submit_request("fresh");
    fresh.updated_at = hours_ago(1);
    let mut elsewhere = submit_request("elsewhere");
    elsewhere.updated_at = hours_ago(1);
    elsewhere.actions[0].target = Some(reviewbot::core::models::PackageRef::package("SUSE:SLE-15", "vim"));
    let platform = FakePlatform::with_requests(vec![stale, fresh, elsewhere]);
    let selector = RequestSelector::new(&platform);

    let requests = selector
        .select(&Selection::Namespace {
            prefix: "openSUSE:".into(),
            since: hours_ago(24),
        })
        .unwrap();

    let ids: Vec<_> = requests.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["fresh"]);
}

#[test]
fn test_three_pages_of_two() {
    let pages = vec![vec![1, 2], vec![3, 4], vec![5, 6], vec![]];
    let mut requested = Vec::new();

    let items = drain_pages(
        |page| {
            requested.push(page);
            Ok(pages[(page - 1) as usize].clone())
        },
        |_| false,
    )
    .unwrap();

    assert_eq!(items, [1, 2, 3, 4, 5, 6]);
    assert_eq!(requested, [1, 2, 3, 4]);
}

#[test]
fn test_overlapping_pages_yield_unique_requests() {
    let ids = [["1", "2"], ["2", "3"], ["4", "5"]];
    let pages: Vec<Vec<_>> = ids
        .iter()
        .map(|page| page.iter().map(|id| submit_request(id)).collect())
        .chain(std::iter::once(Vec::new()))
        .collect();

    let drained = drain_pages(|page| Ok(pages[(page - 1) as usize].clone()), |_| false).unwrap();
    assert_eq!(drained.len(), 6);

    let unique = dedup_by_id(drained);
    let ids: Vec<_> = unique.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5"]);
}

#[test]
fn test_drain_stops_once_past_horizon() {
    let mut pages = vec![
        vec![submit_request("new-1"), submit_request("new-2")],
        vec![submit_request("new-3"), submit_request("old-1")],
        vec![submit_request("old-2")],
    ];
    for page in &mut pages {
        for request in page.iter_mut() {
            request.updated_at = if request.id.starts_with("new") { hours_ago(1) } else { hours_ago(48) };
        }
    }
    let mut fetched = 0;

    let drained = drain_pages(
        |page| {
            fetched += 1;
            Ok(pages[(page - 1) as usize].clone())
        },
        |request: &reviewbot::core::models::Request| request.updated_at < hours_ago(24),
    )
    .unwrap();

    let ids: Vec<_> = drained.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["new-1", "new-2", "new-3"]);
    assert_eq!(fetched, 2);
}
