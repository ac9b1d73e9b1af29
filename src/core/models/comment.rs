//! Comments and the entities they are attached to

use chrono::{DateTime, Utc};

/// Entity a comment is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommentTarget {
    /// A change request
    Request(String),
    /// A project
    Project(String),
    /// A package inside a project
    Package {
        /// Project containing the package
        project: String,
        /// Package name
        package: String,
    },
}

impl std::fmt::Display for CommentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Request(id) => f.write_str(id),
            Self::Project(project) => f.write_str(project),
            Self::Package { project, package } => write!(f, "{project}/{package}"),
        }
    }
}

/// A posted comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Platform identifier, opaque to the bot
    pub id: String,
    /// Login of the author
    pub author: String,
    /// When the comment was posted, if known
    pub created_at: Option<DateTime<Utc>>,
    /// Full body including any marker
    pub body: String,
}
