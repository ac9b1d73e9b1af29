//! Mock implementations of port traits for testing
//!
//! [`FakePlatform`] keeps requests, comments and configuration in memory and
//! records every mutation so tests can count them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use reviewbot::core::models::{
    Comment, CommentTarget, Request, RequestQuery, ReviewState, Reviewer, ReviewerIdentity, SourceInfo,
};
use reviewbot::core::ports::{
    Clock, CommentStore, Platform, ProjectConfig, RequestRepository, SourceInfoProvider,
};

use super::fixtures;

/// A review transition issued through the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub request: String,
    pub state: ReviewState,
    pub message: String,
}

/// In-memory platform
pub struct FakePlatform {
    requests: RefCell<Vec<Request>>,
    comments: RefCell<Vec<(CommentTarget, Comment)>>,
    next_comment: Cell<u32>,
    sources: RefCell<HashMap<(String, String), SourceInfo>>,
    history: RefCell<HashMap<(String, String), Vec<String>>>,
    config: RefCell<HashMap<(String, String), String>>,
    closes_on_delegate: bool,
    pub transitions: RefCell<Vec<Transition>>,
    pub added_reviews: RefCell<Vec<(String, Reviewer)>>,
    pub posted: RefCell<Vec<String>>,
    pub deleted: RefCell<Vec<String>>,
    pub searches: RefCell<Vec<RequestQuery>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            comments: RefCell::new(Vec::new()),
            next_comment: Cell::new(1),
            sources: RefCell::new(HashMap::new()),
            history: RefCell::new(HashMap::new()),
            config: RefCell::new(HashMap::new()),
            closes_on_delegate: true,
            transitions: RefCell::new(Vec::new()),
            added_reviews: RefCell::new(Vec::new()),
            posted: RefCell::new(Vec::new()),
            deleted: RefCell::new(Vec::new()),
            searches: RefCell::new(Vec::new()),
        }
    }

    pub fn with_requests(requests: Vec<Request>) -> Self {
        let platform = Self::new();
        *platform.requests.borrow_mut() = requests;
        platform
    }

    /// A forge-like platform where delegating leaves the bot review open
    pub fn keeping_review_on_delegate(mut self) -> Self {
        self.closes_on_delegate = false;
        self
    }

    pub fn set_config(&self, project: &str, key: &str, value: &str) {
        self.config
            .borrow_mut()
            .insert((project.to_string(), key.to_string()), value.to_string());
    }

    pub fn set_source(&self, project: &str, package: &str, checksum: &str) {
        self.sources.borrow_mut().insert(
            (project.to_string(), package.to_string()),
            SourceInfo {
                verify_checksum: checksum.to_string(),
                origin_project: None,
            },
        );
    }

    /// Seed a comment as if someone had posted it earlier
    pub fn seed_comment(&self, target: CommentTarget, author: &str, body: &str) -> String {
        self.store_comment(target, author, body)
    }

    /// Bodies of the comments currently on `target`
    pub fn comment_bodies(&self, target: &CommentTarget) -> Vec<String> {
        self.comments
            .borrow()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, c)| c.body.clone())
            .collect()
    }

    /// Number of mutating calls of any kind
    pub fn mutation_count(&self) -> usize {
        self.transitions.borrow().len()
            + self.added_reviews.borrow().len()
            + self.posted.borrow().len()
            + self.deleted.borrow().len()
    }

    fn store_comment(&self, target: CommentTarget, author: &str, body: &str) -> String {
        let n = self.next_comment.get();
        self.next_comment.set(n + 1);
        let comment = Comment {
            id: n.to_string(),
            author: author.to_string(),
            created_at: Some(fixtures::hours_ago(100) + Duration::seconds(i64::from(n))),
            body: body.to_string(),
        };
        self.comments.borrow_mut().push((target, comment));
        n.to_string()
    }
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestRepository for FakePlatform {
    fn fetch_request(&self, id: &str) -> anyhow::Result<Request> {
        self.requests
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("request {id} not found"))
    }

    fn search_requests(&self, query: &RequestQuery) -> anyhow::Result<Vec<Request>> {
        self.searches.borrow_mut().push(query.clone());
        Ok(self.requests.borrow().iter().filter(|r| query.matches(r)).cloned().collect())
    }

    fn set_review_state(
        &self,
        request: &Request,
        _reviewer: &ReviewerIdentity,
        state: ReviewState,
        message: &str,
    ) -> anyhow::Result<()> {
        self.transitions.borrow_mut().push(Transition {
            request: request.id.clone(),
            state,
            message: message.to_string(),
        });
        Ok(())
    }

    fn add_review(&self, request: &Request, reviewer: &Reviewer, _message: &str) -> anyhow::Result<()> {
        self.added_reviews.borrow_mut().push((request.id.clone(), reviewer.clone()));
        Ok(())
    }

    fn closes_review_on_delegate(&self) -> bool {
        self.closes_on_delegate
    }
}

impl CommentStore for FakePlatform {
    fn list_comments(&self, target: &CommentTarget) -> anyhow::Result<Vec<Comment>> {
        Ok(self
            .comments
            .borrow()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, c)| c.clone())
            .collect())
    }

    fn add_comment(&self, target: &CommentTarget, body: &str) -> anyhow::Result<()> {
        self.posted.borrow_mut().push(body.to_string());
        self.store_comment(target.clone(), "bot", body);
        Ok(())
    }

    fn delete_comment(&self, id: &str) -> anyhow::Result<()> {
        self.deleted.borrow_mut().push(id.to_string());
        self.comments.borrow_mut().retain(|(_, c)| c.id != id);
        Ok(())
    }
}

impl SourceInfoProvider for FakePlatform {
    fn source_info(
        &self,
        project: &str,
        package: &str,
        _revision: Option<&str>,
    ) -> anyhow::Result<Option<SourceInfo>> {
        Ok(self
            .sources
            .borrow()
            .get(&(project.to_string(), package.to_string()))
            .cloned())
    }

    fn package_history(&self, project: &str, package: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        Ok(self
            .history
            .borrow()
            .get(&(project.to_string(), package.to_string()))
            .map(|h| h.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

impl ProjectConfig for FakePlatform {
    fn get(&self, project: &str, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.config.borrow().get(&(project.to_string(), key.to_string())).cloned())
    }
}

impl Platform for FakePlatform {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn requests(&self) -> &dyn RequestRepository {
        self
    }

    fn comments(&self) -> &dyn CommentStore {
        self
    }

    fn sources(&self) -> &dyn SourceInfoProvider {
        self
    }

    fn project_config(&self) -> &dyn ProjectConfig {
        self
    }
}

/// Clock stuck at one instant
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(fixtures::now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
