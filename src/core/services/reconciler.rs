//! Comment reconciliation
//!
//! Keeps at most one managed comment per bot (and bot suffix) on a target.
//! Repeated runs with the same verdict do not re-post; a changed verdict
//! replaces the previous comment instead of adding another one.
//!
//! Collaborator errors propagate unchanged. Nothing here retries.

use std::collections::BTreeMap;

use log::debug;

use crate::core::models::{Comment, CommentTarget};
use crate::core::ports::CommentStore;

use super::marker::{self, MarkerInfo};

/// What the bot wants a target's managed comment to say
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRequest {
    /// Where the comment lives
    pub target: CommentTarget,
    /// Logical state (`done`, `seen`, ...)
    pub state: String,
    /// Verdict, if any
    pub result: Option<String>,
    /// Explicit body; the collected check notes are used when `None`
    pub message: Option<String>,
    /// Extra marker fields
    pub extra_info: BTreeMap<String, String>,
    /// Whether extra fields take part in finding the previous comment
    pub extra_info_identical: bool,
    /// Compare bodies exactly instead of by line count
    pub identical: bool,
    /// Only post when replacing a previous comment
    pub only_replace: bool,
    /// Appended to the bot identity as `bot::suffix`
    pub bot_name_suffix: Option<String>,
}

impl CommentRequest {
    /// A `done` comment with no result on `target`
    #[must_use]
    pub fn new(target: CommentTarget) -> Self {
        Self {
            target,
            state: "done".to_string(),
            result: None,
            message: None,
            extra_info: BTreeMap::new(),
            extra_info_identical: true,
            identical: false,
            only_replace: false,
            bot_name_suffix: None,
        }
    }

    /// Set the state
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set the result
    #[must_use]
    pub fn result(mut self, result: impl Into<String>) -> Self {
        self.result = Some(result.into());
        self
    }

    /// Set an explicit message
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Add an extra marker field
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_info.insert(key.into(), value.into());
        self
    }

    /// Extra fields are informational only and do not identify the comment
    #[must_use]
    pub const fn extra_informational(mut self) -> Self {
        self.extra_info_identical = false;
        self
    }

    /// Require byte-identical bodies to suppress a post
    #[must_use]
    pub const fn identical(mut self) -> Self {
        self.identical = true;
        self
    }

    /// Only post when a previous comment is replaced
    #[must_use]
    pub const fn only_replace(mut self) -> Self {
        self.only_replace = true;
        self
    }

    /// Keep a separate comment thread under `bot::suffix`
    #[must_use]
    pub fn bot_name_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.bot_name_suffix = Some(suffix.into());
        self
    }
}

/// What a reconcile call did (or would do under dry run)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// No message and no collected notes
    NothingToSay,
    /// The previous comment is close enough; nothing posted
    TooSimilar {
        /// The comment left in place
        comment_id: String,
    },
    /// `only_replace` was set and there was nothing to replace
    NoPriorComment,
    /// A new comment was (or would be) posted
    Posted {
        /// The comment deleted to make room, if any
        replaced: Option<String>,
        /// The full marked body
        body: String,
        /// `false` under dry run
        applied: bool,
    },
}

/// Posts and replaces the bot's managed comments
pub struct CommentReconciler<'a> {
    store: &'a dyn CommentStore,
    bot_name: String,
    dry_run: bool,
}

impl std::fmt::Debug for CommentReconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentReconciler")
            .field("bot_name", &self.bot_name)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl<'a> CommentReconciler<'a> {
    /// Create a reconciler writing as `bot_name`
    #[must_use]
    pub fn new(store: &'a dyn CommentStore, bot_name: impl Into<String>, dry_run: bool) -> Self {
        Self {
            store,
            bot_name: bot_name.into(),
            dry_run,
        }
    }

    /// Bring the target's managed comment in line with `request`
    ///
    /// `collected` supplies the body when `request.message` is `None`.
    pub fn reconcile(&self, request: &CommentRequest, collected: &[String]) -> anyhow::Result<ReconcileOutcome> {
        let key = request.target.to_string();

        let message = match &request.message {
            Some(message) => message.clone(),
            None if collected.is_empty() => {
                debug!("skipping empty comment for {key}");
                return Ok(ReconcileOutcome::NothingToSay);
            },
            None => collected.join("\n\n"),
        };

        let bot = match &request.bot_name_suffix {
            Some(suffix) => format!("{}::{suffix}", self.bot_name),
            None => self.bot_name.clone(),
        };

        let mut info = MarkerInfo::new(&request.state, request.result.as_deref());
        if request.extra_info_identical {
            info.extend(&request.extra_info);
        }

        let comments = self.store.list_comments(&request.target)?;
        let previous = find_latest(&comments, &bot, Some(&info));

        if !request.extra_info_identical {
            info.extend(&request.extra_info);
        }

        let body = marker::truncate(&marker::encode(&message, &bot, &info), marker::MAX_COMMENT_LENGTH);

        if let Some(comment) = previous {
            if is_too_similar(comment, &body, request.identical) {
                debug!("previous comment too similar on {key}");
                return Ok(ReconcileOutcome::TooSimilar {
                    comment_id: comment.id.clone(),
                });
            }
        }

        let previous = previous.or_else(|| {
            debug!("broadening search to include any state on {key}");
            find_latest(&comments, &bot, None)
        });

        let replaced = match previous {
            Some(comment) => {
                debug!("removing previous comment on {key}");
                if !self.dry_run {
                    self.store.delete_comment(&comment.id)?;
                }
                Some(comment.id.clone())
            },
            None if request.only_replace => {
                debug!("no previous comment to replace on {key}");
                return Ok(ReconcileOutcome::NoPriorComment);
            },
            None => None,
        };

        debug!("adding comment to {key}: {body}");
        if !self.dry_run {
            self.store.add_comment(&request.target, &body)?;
        }

        Ok(ReconcileOutcome::Posted {
            replaced,
            body,
            applied: !self.dry_run,
        })
    }
}

/// Most recent comment carrying `bot`'s marker, optionally matching `info`
///
/// Ties on the timestamp (or missing timestamps) go to the later list entry.
#[must_use]
pub fn find_latest<'c>(comments: &'c [Comment], bot: &str, info: Option<&MarkerInfo>) -> Option<&'c Comment> {
    comments
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            marker::decode_for(&c.body, bot).is_some_and(|m| info.is_none_or(|i| i.matches(&m.info)))
        })
        .max_by_key(|(idx, c)| (c.created_at, *idx))
        .map(|(_, c)| c)
}

/// Whether posting `body` over `previous` would only add noise
///
/// Without `identical` this compares line counts only, so a reworded
/// message with the same shape is not re-posted.
#[must_use]
pub fn is_too_similar(previous: &Comment, body: &str, identical: bool) -> bool {
    if identical {
        marker::strip(&previous.body) == marker::strip(body)
    } else {
        previous.body.matches('\n').count() == body.matches('\n').count()
    }
}
