//! # Scuffle Gameplay
//!
//! Gameplay systems for Project Scuffle.
//!
//! This crate provides the combat core of an arena brawler:
//! - Actors (player, stationary dummy, chasing enemy)
//! - Health with the alive/dead state machine and timed respawn
//! - Recoil windows and the knockback/recoil policy table
//! - Area attack resolution
//! - Input application, enemy AI and a minimal kinematic body
//! - Notifications for presentation collaborators
//! - The arena that drives all of it one tick at a time

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod actor;
pub mod ai;
pub mod arena;
pub mod combat;
pub mod controller;
pub mod events;
pub mod health;
pub mod physics;
pub mod recoil;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::actor::*;
    pub use crate::ai::*;
    pub use crate::arena::*;
    pub use crate::combat::*;
    pub use crate::controller::*;
    pub use crate::events::*;
    pub use crate::health::*;
    pub use crate::physics::*;
    pub use crate::recoil::*;
}

pub use prelude::*;
