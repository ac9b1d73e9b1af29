//! CI action backend
//!
//! Runs inside a Gitea (or GitHub) Actions job. The only request is the pull
//! request that triggered the workflow, read from the `GITHUB_CONTEXT`
//! environment variable (`${{ toJSON(github) }}`). There is no API to talk
//! to: comments and review changes are logged, not sent.

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Deserialize;

use crate::core::models::{
    Action, ActionType, Comment, CommentTarget, PackageRef, Request, RequestQuery, ReviewState, Reviewer,
    ReviewerIdentity, SourceInfo,
};
use crate::core::ports::{CommentStore, Platform, ProjectConfig, RequestRepository, SourceInfoProvider};

/// Environment variable holding the workflow context
pub const CONTEXT_ENV: &str = "GITHUB_CONTEXT";

/// Id given to the triggering pull request
pub const REQUEST_ID: &str = "1";

#[derive(Debug, Deserialize)]
struct Context {
    sha: String,
    event: Event,
}

#[derive(Debug, Deserialize)]
struct Event {
    pull_request: PullRequest,
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    head: Branch,
    base: Branch,
    user: User,
    created_at: DateTime<Utc>,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Branch {
    repo: Repo,
}

#[derive(Debug, Deserialize)]
struct Repo {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

fn split_full_name(full_name: &str) -> anyhow::Result<PackageRef> {
    let (owner, repo) = full_name
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("invalid repository name {full_name:?}, expected owner/repo"))?;
    Ok(PackageRef::package(owner, repo))
}

/// The triggering pull request as the single request
#[derive(Debug, Clone)]
pub struct ActionPlatform {
    request: Request,
}

impl ActionPlatform {
    /// Read the context from [`CONTEXT_ENV`]
    pub fn from_env() -> anyhow::Result<Self> {
        let context = std::env::var(CONTEXT_ENV)
            .map_err(|_| anyhow::anyhow!("{CONTEXT_ENV} is not set; the action platform only runs inside a workflow"))?;
        Self::from_context(&context)
    }

    /// Build from the JSON workflow context
    pub fn from_context(json: &str) -> anyhow::Result<Self> {
        let context: Context =
            serde_json::from_str(json).map_err(|e| anyhow::anyhow!("invalid {CONTEXT_ENV}: {e}"))?;
        let pull = context.event.pull_request;

        let action = Action::new(ActionType::Submit)
            .with_source(split_full_name(&pull.head.repo.full_name)?.at(context.sha))
            .with_target(split_full_name(&pull.base.repo.full_name)?);

        let mut request = Request::new(REQUEST_ID, pull.user.login, pull.created_at).with_action(action);
        request.description = pull.body.unwrap_or_default();
        Ok(Self { request })
    }

    /// The request under review
    #[must_use]
    pub const fn request(&self) -> &Request {
        &self.request
    }
}

impl RequestRepository for ActionPlatform {
    fn fetch_request(&self, id: &str) -> anyhow::Result<Request> {
        if id != REQUEST_ID {
            debug!("request {id} resolves to the triggering pull request");
        }
        Ok(self.request.clone())
    }

    fn search_requests(&self, _query: &RequestQuery) -> anyhow::Result<Vec<Request>> {
        Ok(vec![self.request.clone()])
    }

    fn set_review_state(
        &self,
        request: &Request,
        _reviewer: &ReviewerIdentity,
        state: ReviewState,
        message: &str,
    ) -> anyhow::Result<()> {
        info!("{} {state}: {message}", request.id);
        Ok(())
    }

    fn add_review(&self, request: &Request, reviewer: &Reviewer, _message: &str) -> anyhow::Result<()> {
        info!("{} needs a review by {reviewer}", request.id);
        Ok(())
    }
}

impl CommentStore for ActionPlatform {
    fn list_comments(&self, _target: &CommentTarget) -> anyhow::Result<Vec<Comment>> {
        Ok(Vec::new())
    }

    fn add_comment(&self, target: &CommentTarget, body: &str) -> anyhow::Result<()> {
        info!("comment on {target}:\n{body}");
        Ok(())
    }

    fn delete_comment(&self, _id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

impl SourceInfoProvider for ActionPlatform {
    fn source_info(&self, _project: &str, _package: &str, _revision: Option<&str>) -> anyhow::Result<Option<SourceInfo>> {
        Ok(None)
    }

    fn package_history(&self, _project: &str, _package: &str, _limit: usize) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

impl ProjectConfig for ActionPlatform {
    fn get(&self, _project: &str, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

impl Platform for ActionPlatform {
    fn name(&self) -> &'static str {
        "action"
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
