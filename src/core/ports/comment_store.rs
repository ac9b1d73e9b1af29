//! Comment store port

use super::super::models::{Comment, CommentTarget};

/// Storage for comments on requests, projects and packages
#[cfg_attr(test, mockall::automock)]
pub trait CommentStore {
    /// List all comments on `target`, oldest first when the platform orders them
    fn list_comments(&self, target: &CommentTarget) -> anyhow::Result<Vec<Comment>>;

    /// Post a new comment
    fn add_comment(&self, target: &CommentTarget, body: &str) -> anyhow::Result<()>;

    /// Delete a comment by its identifier
    fn delete_comment(&self, id: &str) -> anyhow::Result<()>;
}
