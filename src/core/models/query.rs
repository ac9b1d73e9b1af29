//! Backend-agnostic request search predicate
//!
//! Query-language backends compile a [`RequestQuery`] into their own syntax;
//! listing backends apply [`RequestQuery::matches`] client-side.

use chrono::{DateTime, Utc};

use super::request::{ActionType, Request, RequestState};
use super::review::{Reviewer, ReviewerIdentity};

/// How a request's target project is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFilter {
    /// Target project equals the name
    Exact(String),
    /// Target project starts with the prefix
    Prefix(String),
}

impl ProjectFilter {
    /// Whether `project` passes the filter
    #[must_use]
    pub fn matches(&self, project: &str) -> bool {
        match self {
            Self::Exact(name) => project == name,
            Self::Prefix(prefix) => project.starts_with(prefix.as_str()),
        }
    }
}

/// A search predicate over requests
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestQuery {
    /// Accepted request states (empty means any)
    pub states: Vec<RequestState>,
    /// Only requests with an open review by this user or group
    pub reviewer: Option<ReviewerIdentity>,
    /// Target project constraint on any action
    pub target_project: Option<ProjectFilter>,
    /// Action type constraint (combined with the project on the same action)
    pub action_type: Option<ActionType>,
    /// Only requests changed at or after this time
    pub since: Option<DateTime<Utc>>,
}

impl RequestQuery {
    /// Requests in review with an open review assigned to `reviewer`
    #[must_use]
    pub fn assigned_to(reviewer: ReviewerIdentity) -> Self {
        Self {
            states: vec![RequestState::Review],
            reviewer: Some(reviewer),
            ..Self::default()
        }
    }

    /// New or in-review requests of `action_type` against `project`
    #[must_use]
    pub fn project_type(project: impl Into<String>, action_type: ActionType) -> Self {
        Self {
            states: vec![RequestState::Review, RequestState::New],
            target_project: Some(ProjectFilter::Exact(project.into())),
            action_type: Some(action_type),
            ..Self::default()
        }
    }

    /// Recently changed requests against projects under `prefix`
    #[must_use]
    pub fn namespace(prefix: impl Into<String>, since: DateTime<Utc>) -> Self {
        Self {
            states: vec![RequestState::New, RequestState::Review, RequestState::Accepted],
            target_project: Some(ProjectFilter::Prefix(prefix.into())),
            since: Some(since),
            ..Self::default()
        }
    }

    /// Evaluate the predicate against a request
    #[must_use]
    pub fn matches(&self, request: &Request) -> bool {
        if !self.states.is_empty() && !self.states.contains(&request.state) {
            return false;
        }

        if let Some(since) = self.since {
            if request.updated_at < since {
                return false;
            }
        }

        if let Some(reviewer) = &self.reviewer {
            if !request.has_open_review_for(reviewer) {
                return false;
            }
        }

        if self.target_project.is_none() && self.action_type.is_none() {
            return true;
        }

        request.actions.iter().any(|action| {
            let project_ok = self
                .target_project
                .as_ref()
                .is_none_or(|filter| action.target_project().is_some_and(|p| filter.matches(p)));
            let type_ok = self.action_type.as_ref().is_none_or(|t| &action.action_type == t);
            project_ok && type_ok
        })
    }

    /// Reviewers the query asks about, user first
    #[must_use]
    pub fn reviewers(&self) -> Vec<Reviewer> {
        self.reviewer.as_ref().map(ReviewerIdentity::reviewers).unwrap_or_default()
    }
}
