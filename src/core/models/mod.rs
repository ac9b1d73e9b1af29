//! Domain models for reviewbot
//!
//! Pure data structures with no I/O dependencies.
//!
//! - [`Request`] - A change request with its actions and reviews
//! - [`CheckOutcome`] - Tri-state result of a check
//! - [`Decision`] - What the bot does with a request
//! - [`ReviewMode`] - Policy mapping outcomes to decisions
//! - [`Comment`] - A posted comment and its [`CommentTarget`]
//! - [`RequestQuery`] - Backend-agnostic search predicate

mod comment;
mod outcome;
mod query;
mod request;
mod review;
mod review_mode;
mod source;

pub use comment::{Comment, CommentTarget};
pub use outcome::{CheckOutcome, Decision, Verdict};
pub use query::{ProjectFilter, RequestQuery};
pub use request::{Action, ActionType, PackageRef, Request, RequestState};
pub use review::{Review, ReviewState, Reviewer, ReviewerIdentity};
pub use review_mode::{ModeParseError, ReviewMode};
pub use source::SourceInfo;
