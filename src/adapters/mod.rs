//! Adapter implementations for port traits
//!
//! Concrete implementations that do I/O:
//!
//! - `action` - Single pull request from a CI workflow context
//! - `http` - Blocking HTTP client and [`ApiError`](http::ApiError)
//! - `obs/` - Open Build Service backend (XML, XPath search)
//! - `gitea/` - Gitea backend (JSON REST, paginated listing)
//! - `project_config` - Local config tables layered over the remote store
//! - `wait` - Timed and operator-interruptible pauses

pub mod action;
pub mod gitea;
pub mod http;
pub mod obs;
pub mod project_config;
pub mod wait;

pub use action::ActionPlatform;
pub use gitea::GiteaPlatform;
pub use http::{ApiError, Auth, HttpClient};
pub use obs::ObsPlatform;
pub use project_config::LayeredProjectConfig;
pub use wait::{InteractiveWait, TimedWait};
