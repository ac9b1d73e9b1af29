//! Command implementations

mod fetch;
mod id;
mod project;
mod review;
mod session;

pub use fetch::fetch;
pub use id::id;
pub use project::project;
pub use review::review;
pub use session::Session;
