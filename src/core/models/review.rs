//! Reviews attached to requests and the identities that own them

use serde::Serialize;

/// Who a review is assigned to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reviewer {
    /// A single user
    User(String),
    /// A group of users
    Group(String),
    /// Maintainers of a project
    Project(String),
    /// Maintainers of a package
    Package {
        /// Project containing the package
        project: String,
        /// Package name
        package: String,
    },
}

impl std::fmt::Display for Reviewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(user) => write!(f, "user {user}"),
            Self::Group(group) => write!(f, "group {group}"),
            Self::Project(project) => write!(f, "project {project}"),
            Self::Package { project, package } => write!(f, "package {project}/{package}"),
        }
    }
}

/// State of a single review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    /// Open, waiting for the reviewer
    New,
    /// Approved
    Accepted,
    /// Rejected
    Declined,
    /// Replaced by another review
    Superseded,
}

impl ReviewState {
    /// Platform name of the state
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Superseded => "superseded",
        }
    }
}

impl std::fmt::Display for ReviewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReviewState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "superseded" => Ok(Self::Superseded),
            _ => Err(format!("Invalid review state: {s}")),
        }
    }
}

/// A review record on a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    /// Owner of the review
    pub reviewer: Reviewer,
    /// Current state
    pub state: ReviewState,
    /// Message left with the last transition
    pub message: Option<String>,
}

impl Review {
    /// Create a review without a message
    #[must_use]
    pub const fn new(reviewer: Reviewer, state: ReviewState) -> Self {
        Self {
            reviewer,
            state,
            message: None,
        }
    }
}

/// The user and/or group a bot reviews as
///
/// At least one of the two is set once configuration has been validated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReviewerIdentity {
    /// Reviewer user name
    pub user: Option<String>,
    /// Reviewer group name
    pub group: Option<String>,
}

impl ReviewerIdentity {
    /// Create an identity
    #[must_use]
    pub const fn new(user: Option<String>, group: Option<String>) -> Self {
        Self { user, group }
    }

    /// Whether neither user nor group is set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.user.is_none() && self.group.is_none()
    }

    /// The identity as review owners, user first
    #[must_use]
    pub fn reviewers(&self) -> Vec<Reviewer> {
        self.user
            .iter()
            .map(|u| Reviewer::User(u.clone()))
            .chain(self.group.iter().map(|g| Reviewer::Group(g.clone())))
            .collect()
    }
}

impl std::fmt::Display for ReviewerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.user, &self.group) {
            (Some(user), Some(group)) => write!(f, "{user} ({group})"),
            (Some(user), None) => f.write_str(user),
            (None, Some(group)) => write!(f, "@{group}"),
            (None, None) => f.write_str("<nobody>"),
        }
    }
}
