//! Source revision metadata

use serde::Serialize;

/// Metadata for one revision of a package's sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    /// Checksum identifying the expanded sources
    pub verify_checksum: String,
    /// Project the package originates from (links, forks)
    pub origin_project: Option<String>,
}
