//! # Scuffle Common
//!
//! Common types, utilities, and shared abstractions for Project Scuffle.
//!
//! This crate provides foundational types used across all Scuffle subsystems:
//! - Actor identifiers
//! - Simulation time
//! - World-space coordinate helpers
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod time;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::time::*;
}

pub use prelude::*;
