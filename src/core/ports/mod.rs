//! Port traits (interfaces) for external dependencies
//!
//! These traits define the boundaries between the review core and the
//! review platform (requests, comments, source metadata, project config).
//!
//! Implementations live in the `adapters` module.
//!
//! ## Design Principle
//!
//! The core depends only on these traits, never on a concrete platform.
//! Build-service and git-forge backends are two implementations of the
//! same capability set, selected by configuration.

mod clock;
mod comment_store;
mod platform;
mod project_config;
mod request_repo;
mod source_info;
mod wait;

pub use clock::{Clock, SystemClock};
pub use comment_store::CommentStore;
pub use platform::Platform;
pub use project_config::ProjectConfig;
pub use request_repo::RequestRepository;
pub use source_info::SourceInfoProvider;
pub use wait::Wait;

#[cfg(test)]
pub use clock::MockClock;
#[cfg(test)]
pub use comment_store::MockCommentStore;
#[cfg(test)]
pub use wait::MockWait;
