//! Change requests, their actions and reviews
//!
//! A [`Request`] is created by the review platform before the bot sees it.
//! The bot never deletes one; it only mutates it through review transitions.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::review::{Review, ReviewState, Reviewer, ReviewerIdentity};

/// Lifecycle state of a request as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    /// Freshly created, no reviews requested yet
    New,
    /// Waiting on one or more open reviews
    Review,
    /// Accepted and applied
    Accepted,
    /// Declined by a reviewer
    Declined,
    /// Withdrawn by the creator
    Revoked,
    /// Replaced by a newer request
    Superseded,
    /// Any state the bot does not model
    Other,
}

impl RequestState {
    /// Platform name of the state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Review => "review",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Revoked => "revoked",
            Self::Superseded => "superseded",
            Self::Other => "other",
        }
    }

    /// Parse a platform state name; unknown names map to [`RequestState::Other`]
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "new" => Self::New,
            "review" => Self::Review,
            "accepted" => Self::Accepted,
            "declined" => Self::Declined,
            "revoked" => Self::Revoked,
            "superseded" => Self::Superseded,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type of a request action
///
/// The bot dispatches checks on [`ActionType::name`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Submit a package from one project to another
    Submit,
    /// Open a maintenance incident
    MaintenanceIncident,
    /// Release a maintenance incident
    MaintenanceRelease,
    /// Any other action type (delete, change_devel, ...)
    Other(String),
}

impl ActionType {
    /// Canonical type name used for check dispatch
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Submit => "submit",
            Self::MaintenanceIncident => "maintenance_incident",
            Self::MaintenanceRelease => "maintenance_release",
            Self::Other(name) => name,
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ActionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.replace('-', "_").as_str() {
            "submit" => Self::Submit,
            "maintenance_incident" => Self::MaintenanceIncident,
            "maintenance_release" => Self::MaintenanceRelease,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl Serialize for ActionType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A project/package/revision reference
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PackageRef {
    /// Project (or organisation) name
    pub project: String,
    /// Package (or repository) name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Revision (checksum or commit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl PackageRef {
    /// Reference to a package without a pinned revision
    #[must_use]
    pub fn package(project: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            package: Some(package.into()),
            revision: None,
        }
    }

    /// Pin the reference to a revision
    #[must_use]
    pub fn at(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }
}

/// A typed operation within a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    /// What the action does
    #[serde(rename = "type")]
    pub action_type: ActionType,
    /// Where the change comes from
    pub source: Option<PackageRef>,
    /// Where the change goes
    pub target: Option<PackageRef>,
    /// Release project of a maintenance incident
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_project: Option<String>,
}

impl Action {
    /// Create an action without references
    #[must_use]
    pub const fn new(action_type: ActionType) -> Self {
        Self {
            action_type,
            source: None,
            target: None,
            release_project: None,
        }
    }

    /// Set the source reference
    #[must_use]
    pub fn with_source(mut self, source: PackageRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the target reference
    #[must_use]
    pub fn with_target(mut self, target: PackageRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Target project, if the action has one
    #[must_use]
    pub fn target_project(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.project.as_str())
    }
}

/// A change request under review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    /// Platform identifier
    pub id: String,
    /// Login of the creator
    pub creator: String,
    /// When the request was created
    pub created_at: DateTime<Utc>,
    /// When the request last changed
    pub updated_at: DateTime<Utc>,
    /// Current lifecycle state
    pub state: RequestState,
    /// Free-text description
    pub description: String,
    /// Ordered actions
    pub actions: Vec<Action>,
    /// Open and closed reviews
    pub reviews: Vec<Review>,
}

impl Request {
    /// Create an empty request in review state
    #[must_use]
    pub fn new(id: impl Into<String>, creator: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            creator: creator.into(),
            created_at,
            updated_at: created_at,
            state: RequestState::Review,
            description: String::new(),
            actions: Vec::new(),
            reviews: Vec::new(),
        }
    }

    /// Append an action
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Append a review
    #[must_use]
    pub fn with_review(mut self, review: Review) -> Self {
        self.reviews.push(review);
        self
    }

    /// Age of the request relative to `now`
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.created_at
    }

    /// Target project of the first action
    #[must_use]
    pub fn target_project(&self) -> Option<&str> {
        self.actions.iter().find_map(Action::target_project)
    }

    /// Whether `reviewer` has an open review on this request
    #[must_use]
    pub fn has_open_review(&self, reviewer: &Reviewer) -> bool {
        self.reviews
            .iter()
            .any(|r| r.state == ReviewState::New && &r.reviewer == reviewer)
    }

    /// Whether the bot's user or group has an open review on this request
    #[must_use]
    pub fn has_open_review_for(&self, identity: &ReviewerIdentity) -> bool {
        identity.reviewers().iter().any(|r| self.has_open_review(r))
    }
}
