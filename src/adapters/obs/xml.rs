//! Build service XML documents and their conversion to domain types

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::adapters::http::ApiError;
use crate::core::models::{
    Action, ActionType, Comment, PackageRef, Request, RequestState, Review, ReviewState, Reviewer,
};

/// `<collection>` returned by request searches
#[derive(Debug, Deserialize)]
pub struct CollectionXml {
    #[serde(rename = "request", default)]
    pub requests: Vec<RequestXml>,
}

/// `<request>`
#[derive(Debug, Deserialize)]
pub struct RequestXml {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@creator", default)]
    pub creator: String,
    #[serde(rename = "action", default)]
    pub actions: Vec<ActionXml>,
    pub state: StateXml,
    #[serde(rename = "review", default)]
    pub reviews: Vec<ReviewXml>,
    #[serde(rename = "history", default)]
    pub history: Vec<HistoryXml>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ActionXml {
    #[serde(rename = "@type")]
    pub action_type: String,
    pub source: Option<RefXml>,
    pub target: Option<RefXml>,
}

#[derive(Debug, Deserialize)]
pub struct RefXml {
    #[serde(rename = "@project")]
    pub project: String,
    #[serde(rename = "@package")]
    pub package: Option<String>,
    #[serde(rename = "@rev")]
    pub rev: Option<String>,
    #[serde(rename = "@releaseproject")]
    pub release_project: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StateXml {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@when")]
    pub when: Option<String>,
    #[serde(rename = "@created")]
    pub created: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewXml {
    #[serde(rename = "@state")]
    pub state: String,
    #[serde(rename = "@by_user")]
    pub by_user: Option<String>,
    #[serde(rename = "@by_group")]
    pub by_group: Option<String>,
    #[serde(rename = "@by_project")]
    pub by_project: Option<String>,
    #[serde(rename = "@by_package")]
    pub by_package: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryXml {
    #[serde(rename = "@when")]
    pub when: Option<String>,
}

/// `<comments>`
#[derive(Debug, Deserialize)]
pub struct CommentsXml {
    #[serde(rename = "comment", default)]
    pub comments: Vec<CommentXml>,
}

#[derive(Debug, Deserialize)]
pub struct CommentXml {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@who", default)]
    pub who: String,
    #[serde(rename = "@when")]
    pub when: Option<String>,
    #[serde(rename = "$text", default)]
    pub body: String,
}

/// `<sourceinfo>`
#[derive(Debug, Deserialize)]
pub struct SourceInfoXml {
    #[serde(rename = "@verifymd5")]
    pub verifymd5: Option<String>,
    #[serde(default)]
    pub originproject: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `<revisionlist>`
#[derive(Debug, Deserialize)]
pub struct RevisionListXml {
    #[serde(rename = "revision", default)]
    pub revisions: Vec<RevisionXml>,
}

#[derive(Debug, Deserialize)]
pub struct RevisionXml {
    #[serde(default)]
    pub srcmd5: Option<String>,
}

/// `<attributes>`
#[derive(Debug, Deserialize)]
pub struct AttributesXml {
    #[serde(rename = "attribute", default)]
    pub attributes: Vec<AttributeXml>,
}

#[derive(Debug, Deserialize)]
pub struct AttributeXml {
    #[serde(rename = "value", default)]
    pub values: Vec<String>,
}

/// Parse an XML document from `url`
pub fn parse<T: DeserializeOwned>(url: &str, text: &str) -> Result<T, ApiError> {
    quick_xml::de::from_str(text).map_err(|e| ApiError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// Parse the timestamp formats the build service emits
#[must_use]
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S UTC", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

impl RequestXml {
    /// Convert to the domain request
    ///
    /// A request without any parseable timestamp is a decode error: its age
    /// is unknown, so the age gate could not hold it back.
    pub fn into_request(self, url: &str) -> Result<Request, ApiError> {
        let updated_at = self.state.when.as_deref().and_then(parse_time);
        let created_at = self
            .state
            .created
            .as_deref()
            .and_then(parse_time)
            .or_else(|| self.history.first().and_then(|h| h.when.as_deref()).and_then(parse_time))
            .or(updated_at)
            .ok_or_else(|| ApiError::Decode {
                url: url.to_string(),
                message: format!("request {} has no creation time", self.id),
            })?;

        let mut request = Request::new(self.id, self.creator, created_at);
        request.updated_at = updated_at.unwrap_or(created_at);
        request.state = RequestState::from_name(&self.state.name);
        request.description = self.description.unwrap_or_default();
        request.actions = self.actions.into_iter().map(ActionXml::into_action).collect();
        request.reviews = self.reviews.into_iter().filter_map(ReviewXml::into_review).collect();
        Ok(request)
    }
}

impl ActionXml {
    fn into_action(self) -> Action {
        let Ok(action_type) = self.action_type.parse::<ActionType>();
        let release_project = self.target.as_ref().and_then(|t| t.release_project.clone());
        Action {
            action_type,
            source: self.source.map(RefXml::into_ref),
            target: self.target.map(RefXml::into_ref),
            release_project,
        }
    }
}

impl RefXml {
    fn into_ref(self) -> PackageRef {
        PackageRef {
            project: self.project,
            package: self.package,
            revision: self.rev,
        }
    }
}

impl ReviewXml {
    fn into_review(self) -> Option<Review> {
        let reviewer = match (self.by_user, self.by_group, self.by_project, self.by_package) {
            (Some(user), ..) => Reviewer::User(user),
            (None, Some(group), ..) => Reviewer::Group(group),
            (None, None, Some(project), Some(package)) => Reviewer::Package { project, package },
            (None, None, Some(project), None) => Reviewer::Project(project),
            (None, None, None, _) => return None,
        };
        let state = self.state.parse().unwrap_or(ReviewState::Superseded);
        Some(Review {
            reviewer,
            state,
            message: self.comment.filter(|c| !c.is_empty()),
        })
    }
}

impl CommentXml {
    /// Convert to the domain comment
    pub fn into_comment(self) -> Comment {
        Comment {
            created_at: self.when.as_deref().and_then(parse_time),
            id: self.id,
            author: self.who,
            body: self.body,
        }
    }
}

/// Parse `key = value` lines of a project config attribute
pub fn parse_config_lines(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines().filter_map(|line| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        Some((key.trim(), value.trim()))
    })
}
