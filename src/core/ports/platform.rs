//! Platform bundle
//!
//! A backend provides every collaborator the core needs. Accessors return
//! the same object viewed through each port.

use super::{CommentStore, ProjectConfig, RequestRepository, SourceInfoProvider};

/// A review platform backend
pub trait Platform {
    /// Short platform name for logs
    fn name(&self) -> &'static str;

    /// The backend as a request repository
    fn requests(&self) -> &dyn RequestRepository;

    /// The backend as a comment store
    fn comments(&self) -> &dyn CommentStore;

    /// The backend as a source metadata provider
    fn sources(&self) -> &dyn SourceInfoProvider;

    /// The backend's remote per-project configuration
    fn project_config(&self) -> &dyn ProjectConfig;
}
