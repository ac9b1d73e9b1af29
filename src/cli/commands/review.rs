//! Check requests assigned to the bot

use super::Session;
use reviewbot::core::services::Selection;

/// Review everything with an open review by the bot's user or group
pub fn review(session: &Session, interval: Option<u64>) -> anyhow::Result<()> {
    session.run_reviews(interval, |settings| Ok(Selection::AssignedTo(settings.reviewer()?)))
}
