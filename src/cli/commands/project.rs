//! Check requests of one type against a project

use super::Session;
use reviewbot::core::models::ActionType;
use reviewbot::core::services::Selection;

/// Review open requests of `action_type` targeting `project`
pub fn project(session: &Session, project: String, action_type: &str, interval: Option<u64>) -> anyhow::Result<()> {
    let Ok(action_type) = action_type.parse::<ActionType>();
    let selection = Selection::ProjectType { project, action_type };
    session.run_reviews(interval, |_| Ok(selection.clone()))
}
