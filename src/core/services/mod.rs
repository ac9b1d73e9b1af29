//! Business logic services
//!
//! Orchestration over domain models. Services talk to the outside world
//! only through the port traits.
//!
//! - [`marker`] - Machine-readable comment markers
//! - [`reconciler`] - One managed comment per bot and target
//! - [`checks`] - Per-action checks and their registry
//! - [`decision`] - Outcome × mode decision table
//! - [`engine`] - Request evaluation and review transitions
//! - [`selector`] - Which requests to look at
//! - [`runner`] - One-shot and interval polling

pub mod cache;
pub mod checks;
pub mod comment_log;
pub mod decision;
pub mod engine;
pub mod marker;
pub mod reconciler;
pub mod runner;
pub mod selector;

pub use cache::{CachedProjectConfig, CachedSources, SessionCache};
pub use checks::{ActionCheck, CheckContext, CheckRegistry, SourceMatchCheck, SourceSubmission, SourceSubmissionCheck};
pub use comment_log::CommentLog;
pub use decision::decide;
pub use engine::{Collaborators, EngineConfig, RequestReport, ReviewEngine};
pub use marker::{Marker, MarkerInfo};
pub use reconciler::{CommentReconciler, CommentRequest, ReconcileOutcome};
pub use runner::PollingRunner;
pub use selector::{RequestSelector, Selection};
