//! Gitea backend
//!
//! Pull requests stand in for requests: the target project is the base
//! repository's organisation and the package is the repository. Request ids
//! are `owner/repo#number`, comment ids `owner/repo/id`.
//!
//! Gitea has no request query language, so searches walk organisations,
//! repositories and pull requests page by page and filter client-side.
//! There is no remote per-project configuration.

mod types;

use log::debug;

use crate::adapters::http::{ApiError, HttpClient};
use crate::core::models::{
    Comment, CommentTarget, ProjectFilter, Request, RequestQuery, RequestState, ReviewState, Reviewer,
    ReviewerIdentity, SourceInfo,
};
use crate::core::ports::{CommentStore, Platform, ProjectConfig, RequestRepository, SourceInfoProvider};
use crate::core::services::selector::drain_pages;

use types::{
    BranchInfo, Commit, CreateComment, CreateReview, IssueComment, Organization, PullRequest, PullReview,
    Repository, ReviewRequest,
};

/// Items requested per listing page
pub const PAGE_SIZE: u32 = 50;

/// Gitea API client
#[derive(Debug)]
pub struct GiteaPlatform {
    http: HttpClient,
}

fn not_found_as_empty<T>(result: Result<Vec<T>, ApiError>) -> Result<Vec<T>, ApiError> {
    match result {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

impl GiteaPlatform {
    /// Wrap an HTTP client pointed at `<host>/api/v1`
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn split_id(id: &str) -> anyhow::Result<(&str, &str, u64)> {
        types::parse_request_id(id).ok_or_else(|| anyhow::anyhow!("invalid pull request id {id:?}, expected owner/repo#number"))
    }

    fn page<T: serde::de::DeserializeOwned>(
        &self,
        segments: &[&str],
        extra: &[(&str, &str)],
        page: u32,
    ) -> Result<Vec<T>, ApiError> {
        let page = page.to_string();
        let limit = PAGE_SIZE.to_string();
        let mut query = vec![("page", page.as_str()), ("limit", limit.as_str())];
        query.extend_from_slice(extra);
        self.http.get_json(self.http.url(segments, &query))
    }

    fn organisations(&self, filter: Option<&ProjectFilter>) -> anyhow::Result<Vec<String>> {
        if let Some(ProjectFilter::Exact(org)) = filter {
            return Ok(vec![org.clone()]);
        }

        let orgs: Vec<Organization> = drain_pages(|page| self.page(&["orgs"], &[], page).map_err(Into::into), |_| false)?;
        Ok(orgs
            .into_iter()
            .filter_map(Organization::into_name)
            .filter(|name| filter.is_none_or(|f| f.matches(name)))
            .collect())
    }

    fn repositories(&self, org: &str) -> anyhow::Result<Vec<Repository>> {
        drain_pages(
            |page| not_found_as_empty(self.page(&["orgs", org, "repos"], &[], page)).map_err(Into::into),
            |_| false,
        )
    }

    fn pulls(&self, owner: &str, repo: &str, query: &RequestQuery) -> anyhow::Result<Vec<Request>> {
        let open_only = !query.states.is_empty()
            && query.states.iter().all(|s| matches!(s, RequestState::New | RequestState::Review));
        let state = if open_only { "open" } else { "all" };
        let extra = [("state", state), ("sort", "recentupdate")];

        let pulls: Vec<PullRequest> = drain_pages(
            |page| not_found_as_empty(self.page(&["repos", owner, repo, "pulls"], &extra, page)).map_err(Into::into),
            |pull: &PullRequest| query.since.is_some_and(|since| pull.updated_at < since),
        )?;
        Ok(pulls.into_iter().map(|pull| pull.into_request(owner, repo)).collect())
    }

    fn reviews(&self, owner: &str, repo: &str, number: u64) -> anyhow::Result<Vec<PullReview>> {
        let number = number.to_string();
        let segments = ["repos", owner, repo, "pulls", number.as_str(), "reviews"];
        drain_pages(|page| self.page(&segments, &[], page).map_err(Into::into), |_| false)
    }

    fn issue_target(target: &CommentTarget) -> anyhow::Result<(&str, &str, u64)> {
        match target {
            CommentTarget::Request(id) => Self::split_id(id),
            other => anyhow::bail!("comments on {other} are not supported on gitea"),
        }
    }
}

impl RequestRepository for GiteaPlatform {
    fn fetch_request(&self, id: &str) -> anyhow::Result<Request> {
        let (owner, repo, number) = Self::split_id(id)?;
        let number_param = number.to_string();
        let url = self.http.url(&["repos", owner, repo, "pulls", number_param.as_str()], &[]);
        let pull: PullRequest = self.http.get_json(url)?;

        let mut request = pull.into_request(owner, repo);
        request
            .reviews
            .extend(self.reviews(owner, repo, number)?.into_iter().filter_map(PullReview::into_review));
        Ok(request)
    }

    fn search_requests(&self, query: &RequestQuery) -> anyhow::Result<Vec<Request>> {
        let mut found = Vec::new();
        for org in self.organisations(query.target_project.as_ref())? {
            for repo in self.repositories(&org)? {
                debug!("listing pull requests of {org}/{}", repo.name);
                found.extend(
                    self.pulls(&org, &repo.name, query)?
                        .into_iter()
                        .filter(|request| query.matches(request)),
                );
            }
        }
        Ok(found)
    }

    fn set_review_state(
        &self,
        request: &Request,
        _reviewer: &ReviewerIdentity,
        state: ReviewState,
        message: &str,
    ) -> anyhow::Result<()> {
        let event = match state {
            ReviewState::Accepted => "APPROVED",
            ReviewState::Declined => "REQUEST_CHANGES",
            other => anyhow::bail!("cannot move a gitea review to {other}"),
        };

        let (owner, repo, number) = Self::split_id(&request.id)?;
        let number = number.to_string();
        let url = self.http.url(&["repos", owner, repo, "pulls", number.as_str(), "reviews"], &[]);
        self.http.post_json(url, &CreateReview { event, body: message })?;
        Ok(())
    }

    fn add_review(&self, request: &Request, reviewer: &Reviewer, _message: &str) -> anyhow::Result<()> {
        let body = match reviewer {
            Reviewer::User(user) => ReviewRequest {
                reviewers: vec![user.as_str()],
                team_reviewers: Vec::new(),
            },
            Reviewer::Group(team) => ReviewRequest {
                reviewers: Vec::new(),
                team_reviewers: vec![team.as_str()],
            },
            other => anyhow::bail!("cannot request a review from {other} on gitea"),
        };

        let (owner, repo, number) = Self::split_id(&request.id)?;
        let number = number.to_string();
        let url = self.http.url(&["repos", owner, repo, "pulls", number.as_str(), "requested_reviewers"], &[]);
        self.http.post_json(url, &body)?;
        Ok(())
    }

    fn closes_review_on_delegate(&self) -> bool {
        false
    }
}

impl CommentStore for GiteaPlatform {
    fn list_comments(&self, target: &CommentTarget) -> anyhow::Result<Vec<Comment>> {
        let (owner, repo, number) = Self::issue_target(target)?;
        let number = number.to_string();
        let url = self.http.url(&["repos", owner, repo, "issues", number.as_str(), "comments"], &[]);
        let comments: Vec<IssueComment> = self.http.get_json(url)?;
        Ok(comments.into_iter().map(|c| c.into_comment(owner, repo)).collect())
    }

    fn add_comment(&self, target: &CommentTarget, body: &str) -> anyhow::Result<()> {
        let (owner, repo, number) = Self::issue_target(target)?;
        let number = number.to_string();
        let url = self.http.url(&["repos", owner, repo, "issues", number.as_str(), "comments"], &[]);
        self.http.post_json(url, &CreateComment { body })?;
        Ok(())
    }

    fn delete_comment(&self, id: &str) -> anyhow::Result<()> {
        let (owner, repo, comment) = types::parse_comment_id(id)
            .ok_or_else(|| anyhow::anyhow!("invalid comment id {id:?}, expected owner/repo/id"))?;
        let url = self.http.url(&["repos", owner, repo, "issues", "comments", comment], &[]);
        self.http.delete(url)?;
        Ok(())
    }
}

impl SourceInfoProvider for GiteaPlatform {
    fn source_info(
        &self,
        project: &str,
        package: &str,
        revision: Option<&str>,
    ) -> anyhow::Result<Option<SourceInfo>> {
        let lookup = match revision {
            Some(sha) => self
                .http
                .get_json::<Commit>(self.http.url(&["repos", project, package, "git", "commits", sha], &[]))
                .map(|commit| commit.sha),
            None => self
                .http
                .get_json::<Repository>(self.http.url(&["repos", project, package], &[]))
                .and_then(|repo| {
                    let url = self.http.url(&["repos", project, package, "branches", repo.default_branch.as_str()], &[]);
                    self.http.get_json::<BranchInfo>(url)
                })
                .map(|branch| branch.commit.id),
        };

        match lookup {
            Ok(sha) => Ok(Some(SourceInfo {
                verify_checksum: sha,
                origin_project: None,
            })),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn package_history(&self, project: &str, package: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        let limit_param = limit.to_string();
        let url = self.http.url(
            &["repos", project, package, "commits"],
            &[("limit", limit_param.as_str()), ("stat", "false")],
        );
        match self.http.get_json::<Vec<Commit>>(url) {
            Ok(commits) => Ok(commits.into_iter().map(|c| c.sha).take(limit).collect()),
            Err(e) if e.is_not_found() => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl ProjectConfig for GiteaPlatform {
    fn get(&self, project: &str, key: &str) -> anyhow::Result<Option<String>> {
        debug!("{project}: no remote config for {key} on gitea");
        Ok(None)
    }
}

impl Platform for GiteaPlatform {
    fn name(&self) -> &'static str {
        "gitea"
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
