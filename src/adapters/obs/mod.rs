//! Open Build Service backend
//!
//! Requests, reviews and comments are XML over HTTP. Searches use the
//! server-side XPath query language. Per-project configuration lives in the
//! `OSRT:Config` project attribute as `key = value` lines.

mod xml;
mod xpath;

use std::collections::HashMap;

use log::{debug, warn};

use crate::adapters::http::{ApiError, HttpClient};
use crate::core::models::{
    Comment, CommentTarget, Request, RequestQuery, ReviewState, Reviewer, ReviewerIdentity, SourceInfo,
};
use crate::core::ports::{CommentStore, Platform, ProjectConfig, RequestRepository, SourceInfoProvider};

use xml::{AttributesXml, CollectionXml, CommentXml, CommentsXml, RequestXml, RevisionListXml, SourceInfoXml};

/// Attribute holding per-project bot configuration
pub const CONFIG_ATTRIBUTE: &str = "OSRT:Config";

/// Build service API client
#[derive(Debug)]
pub struct ObsPlatform {
    http: HttpClient,
}

impl ObsPlatform {
    /// Wrap an HTTP client pointed at the API root
    #[must_use]
    pub const fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn get_xml<T: serde::de::DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<T, ApiError> {
        let url = self.http.url(segments, query);
        let text = self.http.get_text(url.clone())?;
        xml::parse(url.as_str(), &text)
    }

    fn comment_segments(target: &CommentTarget) -> Vec<&str> {
        match target {
            CommentTarget::Request(id) => vec!["comments", "request", id.as_str()],
            CommentTarget::Project(project) => vec!["comments", "project", project.as_str()],
            CommentTarget::Package { project, package } => {
                vec!["comments", "package", project.as_str(), package.as_str()]
            },
        }
    }
}

fn reviewer_params(reviewer: &Reviewer) -> Vec<(&'static str, &str)> {
    match reviewer {
        Reviewer::User(user) => vec![("by_user", user.as_str())],
        Reviewer::Group(group) => vec![("by_group", group.as_str())],
        Reviewer::Project(project) => vec![("by_project", project.as_str())],
        Reviewer::Package { project, package } => vec![("by_project", project.as_str()), ("by_package", package.as_str())],
    }
}

/// The bot review to transition: the group review when it is open, else the user's
fn owned_review(request: &Request, identity: &ReviewerIdentity) -> Option<Reviewer> {
    let group = identity.group.as_ref().map(|g| Reviewer::Group(g.clone()));
    if let Some(group) = group.filter(|g| request.has_open_review(g)) {
        return Some(group);
    }
    identity.user.as_ref().map(|u| Reviewer::User(u.clone()))
}

impl RequestRepository for ObsPlatform {
    fn fetch_request(&self, id: &str) -> anyhow::Result<Request> {
        let url = self.http.url(&["request", id], &[("withfullhistory", "1")]);
        let xml: RequestXml = xml::parse(url.as_str(), &self.http.get_text(url.clone())?)?;
        Ok(xml.into_request(url.as_str())?)
    }

    fn search_requests(&self, query: &RequestQuery) -> anyhow::Result<Vec<Request>> {
        let expression = xpath::compile(query);
        debug!("searching requests: {expression}");
        let url = self.http.url(
            &["search", "request"],
            &[("match", expression.as_str()), ("withfullhistory", "1")],
        );
        let collection: CollectionXml = xml::parse(url.as_str(), &self.http.get_text(url.clone())?)?;

        let mut requests = Vec::with_capacity(collection.requests.len());
        for entry in collection.requests {
            match entry.into_request(url.as_str()) {
                Ok(request) => requests.push(request),
                Err(e) => warn!("skipping undated search result: {e}"),
            }
        }
        Ok(requests)
    }

    fn set_review_state(
        &self,
        request: &Request,
        reviewer: &ReviewerIdentity,
        state: ReviewState,
        message: &str,
    ) -> anyhow::Result<()> {
        let Some(owner) = owned_review(request, reviewer) else {
            anyhow::bail!("{}: no reviewer configured to change review state", request.id);
        };

        let mut query = vec![("cmd", "changereviewstate"), ("newstate", state.as_str())];
        query.extend(reviewer_params(&owner));
        self.http.post_text(self.http.url(&["request", request.id.as_str()], &query), message)?;
        Ok(())
    }

    fn add_review(&self, request: &Request, reviewer: &Reviewer, message: &str) -> anyhow::Result<()> {
        let mut query = vec![("cmd", "addreview")];
        query.extend(reviewer_params(reviewer));
        self.http.post_text(self.http.url(&["request", request.id.as_str()], &query), message)?;
        Ok(())
    }
}

impl CommentStore for ObsPlatform {
    fn list_comments(&self, target: &CommentTarget) -> anyhow::Result<Vec<Comment>> {
        let comments: CommentsXml = self.get_xml(&Self::comment_segments(target), &[])?;
        Ok(comments.comments.into_iter().map(CommentXml::into_comment).collect())
    }

    fn add_comment(&self, target: &CommentTarget, body: &str) -> anyhow::Result<()> {
        self.http.post_text(self.http.url(&Self::comment_segments(target), &[]), body)?;
        Ok(())
    }

    fn delete_comment(&self, id: &str) -> anyhow::Result<()> {
        self.http.delete(self.http.url(&["comment", id], &[]))?;
        Ok(())
    }
}

impl SourceInfoProvider for ObsPlatform {
    fn source_info(
        &self,
        project: &str,
        package: &str,
        revision: Option<&str>,
    ) -> anyhow::Result<Option<SourceInfo>> {
        let mut query = vec![("view", "info")];
        if let Some(rev) = revision {
            query.push(("rev", rev));
        }

        let info: SourceInfoXml = match self.get_xml(&["source", project, package], &query) {
            Ok(info) => info,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = info.error {
            debug!("{project}/{package}: {error}");
            return Ok(None);
        }

        Ok(info.verifymd5.map(|verify_checksum| SourceInfo {
            verify_checksum,
            origin_project: info.originproject,
        }))
    }

    fn package_history(&self, project: &str, package: &str, limit: usize) -> anyhow::Result<Vec<String>> {
        let limit_param = limit.to_string();
        let history: RevisionListXml = match self.get_xml(
            &["source", project, package, "_history"],
            &[("limit", limit_param.as_str())],
        ) {
            Ok(history) => history,
            Err(e) if e.is_not_found() => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        // interconnected instances ignore `limit`
        Ok(history
            .revisions
            .into_iter()
            .rev()
            .filter_map(|r| r.srcmd5)
            .take(limit)
            .collect())
    }
}

impl ProjectConfig for ObsPlatform {
    fn get(&self, project: &str, key: &str) -> anyhow::Result<Option<String>> {
        let attributes: AttributesXml = match self.get_xml(&["source", project, "_attribute", CONFIG_ATTRIBUTE], &[]) {
            Ok(attributes) => attributes,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let values: HashMap<&str, &str> = attributes
            .attributes
            .iter()
            .flat_map(|a| a.values.iter())
            .flat_map(|v| xml::parse_config_lines(v))
            .collect();
        Ok(values.get(key).map(|v| (*v).to_string()))
    }
}

impl Platform for ObsPlatform {
    fn name(&self) -> &'static str {
        "obs"
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
