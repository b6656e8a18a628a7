//! Minimal kinematic body for arena actors.
//!
//! Stands in for an engine rigid body: velocity integration, gravity, and a
//! flat ground plane. Knockback and jumps are plain velocity changes.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default gravity acceleration (units/s², negative = down).
pub const DEFAULT_GRAVITY: f32 = -20.0;

/// Physics configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Vertical acceleration
    pub gravity: f32,
    /// Height of the ground plane
    pub ground_height: f32,
    /// Fraction of horizontal velocity lost per second while grounded
    pub ground_friction: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            ground_height: 0.0,
            ground_friction: 8.0,
        }
    }
}

/// Velocity state of an actor that participates in physics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Current velocity
    pub velocity: Vec3,
    /// Standing on the ground
    pub grounded: bool,
}

impl Body {
    /// Creates a body at rest on the ground.
    #[must_use]
    pub const fn grounded() -> Self {
        Self {
            velocity: Vec3::ZERO,
            grounded: true,
        }
    }

    /// Adds an instantaneous velocity change.
    pub fn apply_velocity_change(&mut self, delta: Vec3) {
        self.velocity += delta;
        if delta.y > 0.0 {
            self.grounded = false;
        }
    }

    /// Sets the horizontal velocity, keeping the vertical component.
    pub fn set_horizontal(&mut self, x: f32, z: f32) {
        self.velocity.x = x;
        self.velocity.z = z;
    }

    /// Horizontal speed.
    #[must_use]
    pub fn horizontal_speed(&self) -> f32 {
        self.velocity.x.hypot(self.velocity.z)
    }

    /// Integrates `position` over `dt` seconds.
    pub fn integrate(&mut self, position: &mut Vec3, dt: f32, config: &PhysicsConfig) {
        if !self.grounded {
            self.velocity.y += config.gravity * dt;
        }

        *position += self.velocity * dt;

        if position.y <= config.ground_height {
            position.y = config.ground_height;
            if self.velocity.y < 0.0 {
                self.velocity.y = 0.0;
            }
            self.grounded = self.velocity.y <= 0.0;
        }

        if self.grounded {
            let keep = (1.0 - config.ground_friction * dt).max(0.0);
            self.velocity.x *= keep;
            self.velocity.z *= keep;
        }
    }
}
