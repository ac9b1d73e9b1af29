//! Gitea REST payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::{
    Action, ActionType, Comment, PackageRef, Request, RequestState, Review, ReviewState, Reviewer,
};

#[derive(Debug, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct Team {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Organization {
    pub fn into_name(self) -> Option<String> {
        self.name.filter(|n| !n.is_empty()).or(self.username)
    }
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub name: String,
    pub owner: User,
    #[serde(default)]
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
pub struct Branch {
    pub sha: String,
    pub repo: Option<Repository>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub user: User,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub state: String,
    #[serde(default)]
    pub merged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub head: Branch,
    #[serde(default)]
    pub requested_reviewers: Option<Vec<User>>,
    #[serde(default)]
    pub requested_reviewers_teams: Option<Vec<Team>>,
}

impl PullRequest {
    /// Convert to a domain request with a single submit action
    ///
    /// Requested reviewers and teams become open reviews.
    pub fn into_request(self, owner: &str, repo: &str) -> Request {
        let mut request = Request::new(request_id(owner, repo, self.number), self.user.login, self.created_at);
        request.updated_at = self.updated_at;
        request.state = match (self.state.as_str(), self.merged) {
            ("open", _) => RequestState::Review,
            (_, true) => RequestState::Accepted,
            _ => RequestState::Revoked,
        };
        request.description = if self.body.is_empty() {
            self.title
        } else {
            format!("{}\n\n{}", self.title, self.body)
        };

        let source = self.head.repo.map(|r| PackageRef {
            project: r.owner.login,
            package: Some(r.name),
            revision: Some(self.head.sha),
        });
        let target = PackageRef {
            project: owner.to_string(),
            package: Some(repo.to_string()),
            revision: None,
        };
        let mut action = Action::new(ActionType::Submit).with_target(target);
        action.source = source;
        request.actions.push(action);

        let users = self.requested_reviewers.unwrap_or_default().into_iter().map(|u| Reviewer::User(u.login));
        let teams = self
            .requested_reviewers_teams
            .unwrap_or_default()
            .into_iter()
            .map(|t| Reviewer::Group(t.name));
        request.reviews = users.chain(teams).map(|r| Review::new(r, ReviewState::New)).collect();
        request
    }
}

#[derive(Debug, Deserialize)]
pub struct PullReview {
    pub user: Option<User>,
    pub team: Option<Team>,
    pub state: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub dismissed: bool,
}

impl PullReview {
    /// Closed reviews; pending and comment-only reviews are skipped
    pub fn into_review(self) -> Option<Review> {
        if self.dismissed {
            return None;
        }
        let state = match self.state.as_str() {
            "APPROVED" => ReviewState::Accepted,
            "REQUEST_CHANGES" => ReviewState::Declined,
            _ => return None,
        };
        let reviewer = match (self.team, self.user) {
            (Some(team), _) => Reviewer::Group(team.name),
            (None, Some(user)) => Reviewer::User(user.login),
            (None, None) => return None,
        };
        Some(Review {
            reviewer,
            state,
            message: Some(self.body).filter(|b| !b.is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub user: User,
    #[serde(default)]
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl IssueComment {
    pub fn into_comment(self, owner: &str, repo: &str) -> Comment {
        Comment {
            id: format!("{owner}/{repo}/{}", self.id),
            author: self.user.login,
            created_at: Some(self.created_at),
            body: self.body,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BranchInfo {
    pub commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
pub struct BranchCommit {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct Commit {
    pub sha: String,
}

#[derive(Debug, Serialize)]
pub struct CreateReview<'a> {
    pub event: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ReviewRequest<'a> {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reviewers: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub team_reviewers: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct CreateComment<'a> {
    pub body: &'a str,
}

/// `owner/repo#number`
pub fn request_id(owner: &str, repo: &str, number: u64) -> String {
    format!("{owner}/{repo}#{number}")
}

/// Split `owner/repo#number`
pub fn parse_request_id(id: &str) -> Option<(&str, &str, u64)> {
    let (path, number) = id.rsplit_once('#')?;
    let (owner, repo) = path.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo, number.parse().ok()?))
}

/// Split `owner/repo/id`
pub fn parse_comment_id(id: &str) -> Option<(&str, &str, &str)> {
    let mut parts = id.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(owner), Some(repo), Some(number)) if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) => {
            Some((owner, repo, number))
        },
        _ => None,
    }
}
