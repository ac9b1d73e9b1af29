//! Check explicit requests

use super::Session;
use reviewbot::core::services::Selection;

/// Review the requests named by `ids`, once
pub fn id(session: &Session, ids: Vec<String>) -> anyhow::Result<()> {
    let selection = Selection::Ids(ids);
    session.run_reviews(None, |_| Ok(selection.clone()))
}
