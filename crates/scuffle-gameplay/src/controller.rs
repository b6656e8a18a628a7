//! Per-tick input application.
//!
//! Turns one tick of [`ActorInput`] into movement and, at most, one
//! [`AttackRequest`]. Dead or recoiling actors discard their input and stop
//! moving horizontally. Attack cooldown lives here, on the attacker, not in
//! the resolver.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use scuffle_common::{from_planar, ActorId, SimTime};

use crate::actor::Actor;

/// One tick of input for an actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorInput {
    /// Desired movement on the ground plane (x, z); clamped to unit length
    pub movement: Vec2,
    /// Jump pressed this tick
    pub jump: bool,
    /// Attack pressed this tick
    pub attack: bool,
}

impl ActorInput {
    /// No input.
    pub const IDLE: Self = Self {
        movement: Vec2::ZERO,
        jump: false,
        attack: false,
    };

    /// Movement only.
    #[must_use]
    pub fn moving(x: f32, z: f32) -> Self {
        Self {
            movement: Vec2::new(x, z),
            ..Self::IDLE
        }
    }

    /// Adds an attack press.
    #[must_use]
    pub fn with_attack(mut self) -> Self {
        self.attack = true;
        self
    }

    /// Adds a jump press.
    #[must_use]
    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }
}

/// An attack the controller has allowed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackRequest {
    /// Attacking actor
    pub attacker: ActorId,
    /// Reach of the attack sphere
    pub range: f32,
    /// Damage per target
    pub damage: i32,
}

/// What the controller did with an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputOutcome {
    /// Input applied normally
    Applied,
    /// Actor is dead; input discarded
    Dead,
    /// Actor is recoiling; input discarded
    Blocked,
}

/// Applies `input` to `actor` at `now`.
///
/// Returns the outcome and an attack request if an attack was pressed,
/// allowed by the actor's configuration, and off cooldown.
pub fn apply_input(
    actor: &mut Actor,
    input: &ActorInput,
    now: SimTime,
) -> (InputOutcome, Option<AttackRequest>) {
    if !actor.is_alive() {
        stop_horizontal(actor);
        return (InputOutcome::Dead, None);
    }
    if actor.recoil().is_blocked(now) {
        stop_horizontal(actor);
        return (InputOutcome::Blocked, None);
    }

    let direction = from_planar(input.movement.clamp_length_max(1.0));
    let speed = actor.config().move_speed;
    let jump_velocity = actor.config().jump_velocity;
    actor.face(direction);

    if let Some(body) = actor.body_mut() {
        body.set_horizontal(direction.x * speed, direction.z * speed);
        if input.jump && body.grounded && jump_velocity > 0.0 {
            body.apply_velocity_change(Vec3::new(0.0, jump_velocity, 0.0));
        }
    }

    let mut request = None;
    if input.attack && actor.config().can_attack() && actor.attack_ready(now) {
        actor.start_attack_cooldown(now);
        request = Some(AttackRequest {
            attacker: actor.id(),
            range: actor.config().attack_range,
            damage: actor.config().attack_damage,
        });
    }

    (InputOutcome::Applied, request)
}

fn stop_horizontal(actor: &mut Actor) {
    if let Some(body) = actor.body_mut() {
        body.set_horizontal(0.0, 0.0);
    }
}
