//! Request selection
//!
//! Turns a [`Selection`] into the list of requests to review. Results are
//! deduplicated by identifier, keeping first-seen order.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::core::models::{ActionType, Request, RequestQuery, ReviewerIdentity};
use crate::core::ports::RequestRepository;

/// Which requests a run should look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Explicit request identifiers
    Ids(Vec<String>),
    /// Requests with an open review for the bot's user or group
    AssignedTo(ReviewerIdentity),
    /// Requests of `action_type` targeting `project`
    ProjectType {
        /// Target project
        project: String,
        /// Action type
        action_type: ActionType,
    },
    /// Requests targeting any project under `prefix`, updated since `since`
    Namespace {
        /// Project name prefix
        prefix: String,
        /// Oldest update time of interest
        since: DateTime<Utc>,
    },
}

/// Resolves selections against a request repository
pub struct RequestSelector<'a> {
    requests: &'a dyn RequestRepository,
}

impl std::fmt::Debug for RequestSelector<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSelector").finish_non_exhaustive()
    }
}

impl<'a> RequestSelector<'a> {
    /// Create a selector over `requests`
    #[must_use]
    pub const fn new(requests: &'a dyn RequestRepository) -> Self {
        Self { requests }
    }

    /// Fetch every request the selection names
    ///
    /// An empty result is not an error.
    pub fn select(&self, selection: &Selection) -> anyhow::Result<Vec<Request>> {
        let requests = match selection {
            Selection::Ids(ids) => ids
                .iter()
                .map(|id| self.requests.fetch_request(id))
                .collect::<anyhow::Result<Vec<_>>>()?,
            Selection::AssignedTo(identity) => {
                let mut found = Vec::new();
                for query in assigned_queries(identity) {
                    found.extend(self.requests.search_requests(&query)?);
                }
                found
            },
            Selection::ProjectType { project, action_type } => self
                .requests
                .search_requests(&RequestQuery::project_type(project.clone(), action_type.clone()))?,
            Selection::Namespace { prefix, since } => self
                .requests
                .search_requests(&RequestQuery::namespace(prefix.clone(), *since))?,
        };

        let requests = dedup_by_id(requests);
        info!("selected {} request(s)", requests.len());
        Ok(requests)
    }
}

/// One query per configured reviewer, user first
fn assigned_queries(identity: &ReviewerIdentity) -> Vec<RequestQuery> {
    let users = identity.user.iter().map(|u| ReviewerIdentity::new(Some(u.clone()), None));
    let groups = identity.group.iter().map(|g| ReviewerIdentity::new(None, Some(g.clone())));
    users.chain(groups).map(RequestQuery::assigned_to).collect()
}

/// Drop repeated identifiers, keeping the first occurrence
#[must_use]
pub fn dedup_by_id(requests: Vec<Request>) -> Vec<Request> {
    let mut seen = HashSet::new();
    requests
        .into_iter()
        .filter(|r| {
            let fresh = seen.insert(r.id.clone());
            if !fresh {
                debug!("dropping duplicate {}", r.id);
            }
            fresh
        })
        .collect()
}

/// Collect items from a page-numbered listing
///
/// Pages are requested from 1 upwards until one comes back empty, or until
/// an item satisfies `past_horizon`; that item and everything after it is
/// dropped.
pub fn drain_pages<T, F, H>(mut fetch_page: F, mut past_horizon: H) -> anyhow::Result<Vec<T>>
where
    F: FnMut(u32) -> anyhow::Result<Vec<T>>,
    H: FnMut(&T) -> bool,
{
    let mut items = Vec::new();
    for page in 1.. {
        let batch = fetch_page(page)?;
        if batch.is_empty() {
            break;
        }
        for item in batch {
            if past_horizon(&item) {
                return Ok(items);
            }
            items.push(item);
        }
    }
    Ok(items)
}
