//! List recently changed requests

use chrono::{Duration, Utc};
use log::info;

use super::Session;
use reviewbot::core::services::{RequestSelector, Selection};
use reviewbot::output::FetchRecord;

/// Print requests under `namespace` changed within the last day, one JSON object per line
pub fn fetch(session: &Session, namespace: &str) -> anyhow::Result<()> {
    let settings = session.settings()?;
    let platform = session.connect(&settings)?;

    let selection = Selection::Namespace {
        prefix: namespace.to_string(),
        since: Utc::now() - Duration::days(1),
    };
    let requests = RequestSelector::new(platform.requests()).select(&selection)?;
    info!("{} request(s) under {namespace} changed since yesterday", requests.len());

    for request in &requests {
        FetchRecord::from(request).render();
    }
    Ok(())
}
