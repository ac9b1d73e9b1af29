//! Source metadata port

use super::super::models::SourceInfo;

/// Lookup of package source metadata
pub trait SourceInfoProvider {
    /// Metadata for `project/package` at `revision` (head when `None`)
    ///
    /// Returns `Ok(None)` when the package does not exist.
    fn source_info(
        &self,
        project: &str,
        package: &str,
        revision: Option<&str>,
    ) -> anyhow::Result<Option<SourceInfo>>;

    /// Checksums of the last `limit` revisions, newest first
    fn package_history(&self, project: &str, package: &str, limit: usize) -> anyhow::Result<Vec<String>>;
}
