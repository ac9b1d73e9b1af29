//! Core review logic
//!
//! No I/O lives here. Everything the core needs from a review platform is
//! reached through the port traits.
//!
//! ## Architecture
//!
//! - `models/` - Domain types (Request, Review, CheckOutcome, Decision)
//! - `services/` - Marker codec, reconciler, engine, selector, runner
//! - `ports/` - Trait definitions for platform collaborators

pub mod models;
pub mod ports;
pub mod services;
