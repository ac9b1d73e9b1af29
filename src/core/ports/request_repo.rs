//! Request repository port
//!
//! Defines the interface for reading requests and issuing review transitions.

use super::super::models::{Request, RequestQuery, ReviewState, Reviewer, ReviewerIdentity};

/// Access to change requests on a review platform
///
/// Implementations translate the platform's native representation into
/// [`Request`]. Errors are transport or decode failures and are never
/// retried by the caller.
pub trait RequestRepository {
    /// Fetch one request, including its full review history
    fn fetch_request(&self, id: &str) -> anyhow::Result<Request>;

    /// Find all requests matching the query
    fn search_requests(&self, query: &RequestQuery) -> anyhow::Result<Vec<Request>>;

    /// Move the review owned by `reviewer` to `state`
    fn set_review_state(
        &self,
        request: &Request,
        reviewer: &ReviewerIdentity,
        state: ReviewState,
        message: &str,
    ) -> anyhow::Result<()>;

    /// Add a new open review for `reviewer`
    fn add_review(&self, request: &Request, reviewer: &Reviewer, message: &str) -> anyhow::Result<()>;

    /// Whether the bot's own review must be closed after delegating
    ///
    /// Platforms where an open bot review blocks the request return `true`.
    fn closes_review_on_delegate(&self) -> bool {
        true
    }
}
