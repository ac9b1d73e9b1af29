//! Common test utilities shared across test types
//!
//! - `mocks.rs` - In-memory platform and fixed clock
//! - `fixtures.rs` - Request builders

pub mod fixtures;
pub mod mocks;
