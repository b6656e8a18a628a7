//! Arena actors: the player and the enemy archetypes.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scuffle_common::{
    ensure_non_negative, ensure_non_negative_finite, ensure_positive, flatten, planar_direction,
    ActorId, ScuffleError, ScuffleResult, SimTime,
};

use crate::events::{CombatNotification, NotificationSink};
use crate::health::{ActorHealth, DamageResult, DEFAULT_RESPAWN_DELAY};
use crate::physics::Body;
use crate::recoil::{HitReaction, RecoilController, RecoilPolicy};

/// Kind of actor, consulted by the recoil policy and the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Player-controlled fighter
    Player,
    /// Training dummy: never moves, never attacks, never reacts
    StationaryEnemy,
    /// Enemy that chases and punches the player
    ChasingEnemy,
}

impl ActorKind {
    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Player => "Player",
            Self::StationaryEnemy => "Dummy",
            Self::ChasingEnemy => "Chaser",
        }
    }

    /// Whether this kind respawns on its own after dying.
    #[must_use]
    pub const fn auto_respawns(self) -> bool {
        !matches!(self, Self::Player)
    }
}

/// Static per-actor configuration supplied at spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Maximum hit points
    pub max_hp: i32,
    /// Horizontal movement speed (units/s)
    pub move_speed: f32,
    /// Upward velocity of a jump
    pub jump_velocity: f32,
    /// Reach of the attack sphere
    pub attack_range: f32,
    /// Damage per attack (0 = cannot attack)
    pub attack_damage: i32,
    /// Minimum time between attack attempts (seconds)
    pub attack_cooldown: f32,
    /// Distance at which a chaser notices the player
    pub detection_radius: f32,
    /// Automatic respawn delay after death (None = respawn driven externally)
    pub respawn_delay: Option<f32>,
    /// Damage flash duration (seconds)
    pub flash_duration: f32,
    /// Whether the actor has a physics body (knockback is skipped without one)
    pub has_body: bool,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self::for_kind(ActorKind::Player)
    }
}

impl ActorConfig {
    /// Default configuration for an actor kind.
    #[must_use]
    pub fn for_kind(kind: ActorKind) -> Self {
        match kind {
            ActorKind::Player => Self {
                max_hp: 100,
                move_speed: 5.0,
                jump_velocity: 7.0,
                attack_range: 1.5,
                attack_damage: 10,
                attack_cooldown: 0.5,
                detection_radius: 0.0,
                respawn_delay: None,
                flash_duration: 0.1,
                has_body: true,
            },
            ActorKind::StationaryEnemy => Self {
                max_hp: 50,
                move_speed: 0.0,
                jump_velocity: 0.0,
                attack_range: 0.0,
                attack_damage: 0,
                attack_cooldown: 0.0,
                detection_radius: 0.0,
                respawn_delay: Some(DEFAULT_RESPAWN_DELAY),
                flash_duration: 0.1,
                has_body: false,
            },
            ActorKind::ChasingEnemy => Self {
                max_hp: 50,
                move_speed: 3.5,
                jump_velocity: 0.0,
                attack_range: 1.5,
                attack_damage: 10,
                attack_cooldown: 1.5,
                detection_radius: 12.0,
                respawn_delay: Some(DEFAULT_RESPAWN_DELAY),
                flash_duration: 0.1,
                has_body: true,
            },
        }
    }

    /// Set max hit points.
    #[must_use]
    pub fn with_max_hp(mut self, max_hp: i32) -> Self {
        self.max_hp = max_hp;
        self
    }

    /// Set attack parameters.
    #[must_use]
    pub fn with_attack(mut self, range: f32, damage: i32, cooldown: f32) -> Self {
        self.attack_range = range;
        self.attack_damage = damage;
        self.attack_cooldown = cooldown;
        self
    }

    /// Set automatic respawn delay.
    #[must_use]
    pub fn with_respawn_delay(mut self, delay: Option<f32>) -> Self {
        self.respawn_delay = delay;
        self
    }

    /// Set whether the actor has a physics body.
    #[must_use]
    pub fn with_body(mut self, has_body: bool) -> Self {
        self.has_body = has_body;
        self
    }

    /// Rejects values an actor cannot be built from: non-positive `max_hp`
    /// or `respawn_delay`, and negative or non-finite tuning values.
    pub fn check(&self) -> ScuffleResult<()> {
        if self.max_hp <= 0 {
            return Err(ScuffleError::invalid(
                "max_hp",
                format!("must be > 0, got {}", self.max_hp),
            ));
        }
        if let Some(delay) = self.respawn_delay {
            ensure_positive("respawn_delay", delay)?;
        }
        ensure_non_negative_finite("move_speed", self.move_speed)?;
        ensure_non_negative_finite("jump_velocity", self.jump_velocity)?;
        ensure_non_negative_finite("attack_range", self.attack_range)?;
        ensure_non_negative("attack_damage", self.attack_damage)?;
        ensure_non_negative_finite("attack_cooldown", self.attack_cooldown)?;
        ensure_non_negative_finite("detection_radius", self.detection_radius)?;
        ensure_non_negative_finite("flash_duration", self.flash_duration)?;
        Ok(())
    }

    /// Whether this configuration allows attacking at all.
    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.attack_damage > 0 && self.attack_range > 0.0
    }
}

/// Snapshot of the attacking actor taken before resolving a hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackerInfo {
    /// Attacker ID
    pub id: ActorId,
    /// Attacker kind
    pub kind: ActorKind,
    /// Attacker position
    pub position: Vec3,
    /// Attacker facing
    pub facing: Vec3,
}

/// Outcome of [`Actor::take_hit`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitOutcome {
    /// Health result
    pub damage: DamageResult,
    /// Knockback velocity change decided by the policy
    pub knockback: Vec3,
    /// Whether the knockback reached a physics body
    pub knockback_applied: bool,
    /// End of the recoil window started by this hit
    pub recoil_until: Option<SimTime>,
}

impl HitOutcome {
    const fn ignored() -> Self {
        Self {
            damage: DamageResult::NoOp,
            knockback: Vec3::ZERO,
            knockback_applied: false,
            recoil_until: None,
        }
    }
}

/// An actor in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    id: ActorId,
    kind: ActorKind,
    config: ActorConfig,
    /// Current position
    pub position: Vec3,
    /// Horizontal facing direction (unit length)
    pub facing: Vec3,
    spawn_anchor: Vec3,
    health: ActorHealth,
    recoil: RecoilController,
    body: Option<Body>,
    next_attack_at: Option<SimTime>,
}

impl Actor {
    /// Creates an actor at its spawn anchor.
    pub fn new(kind: ActorKind, config: ActorConfig, position: Vec3) -> ScuffleResult<Self> {
        Self::with_id(ActorId::new(), kind, config, position)
    }

    /// Creates an actor with an explicit ID.
    pub fn with_id(
        id: ActorId,
        kind: ActorKind,
        config: ActorConfig,
        position: Vec3,
    ) -> ScuffleResult<Self> {
        config.check()?;
        let mut health =
            ActorHealth::new(id, config.max_hp)?.with_flash_duration(config.flash_duration)?;
        if let Some(delay) = config.respawn_delay {
            health = health.with_respawn_delay(delay)?;
        }
        Ok(Self {
            id,
            kind,
            body: config.has_body.then(Body::grounded),
            config,
            position,
            facing: Vec3::Z,
            spawn_anchor: position,
            health,
            recoil: RecoilController::new(),
            next_attack_at: None,
        })
    }

    /// Actor ID.
    #[must_use]
    pub const fn id(&self) -> ActorId {
        self.id
    }

    /// Actor kind.
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        self.kind
    }

    /// Static configuration.
    #[must_use]
    pub const fn config(&self) -> &ActorConfig {
        &self.config
    }

    /// Spawn anchor.
    #[must_use]
    pub const fn spawn_anchor(&self) -> Vec3 {
        self.spawn_anchor
    }

    /// Moves the spawn anchor (takes effect on next respawn).
    pub fn set_spawn_anchor(&mut self, anchor: Vec3) {
        self.spawn_anchor = anchor;
    }

    /// Health state.
    #[must_use]
    pub const fn health(&self) -> &ActorHealth {
        &self.health
    }

    /// Recoil state.
    #[must_use]
    pub const fn recoil(&self) -> &RecoilController {
        &self.recoil
    }

    /// Mutable recoil state.
    pub fn recoil_mut(&mut self) -> &mut RecoilController {
        &mut self.recoil
    }

    /// Physics body, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Mutable physics body, if any.
    pub fn body_mut(&mut self) -> Option<&mut Body> {
        self.body.as_mut()
    }

    /// Whether the actor is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    /// Whether attacks may target this actor.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.is_alive()
    }

    /// Whether the actor may act (move/attack) at `now`.
    #[must_use]
    pub fn can_act(&self, now: SimTime) -> bool {
        self.is_alive() && !self.recoil.is_blocked(now)
    }

    /// Whether the attack cooldown has elapsed at `now`.
    #[must_use]
    pub fn attack_ready(&self, now: SimTime) -> bool {
        self.next_attack_at.map_or(true, |at| at.has_passed(now))
    }

    /// Starts the attack cooldown at `now`.
    pub fn start_attack_cooldown(&mut self, now: SimTime) {
        self.next_attack_at = Some(now.after(self.config.attack_cooldown));
    }

    /// Points the actor along a horizontal direction. Zero vectors are ignored.
    pub fn face(&mut self, direction: Vec3) {
        let dir = flatten(direction).normalize_or_zero();
        if dir != Vec3::ZERO {
            self.facing = dir;
        }
    }

    /// Snapshot used when this actor attacks.
    #[must_use]
    pub fn attacker_info(&self) -> AttackerInfo {
        AttackerInfo {
            id: self.id,
            kind: self.kind,
            position: self.position,
            facing: self.facing,
        }
    }

    /// Applies a hit of `amount` damage.
    ///
    /// With an attacker, the policy decides knockback and recoil. Knockback
    /// is skipped when the actor has no body; damage and death still apply.
    /// Nothing changes when an error is returned.
    pub fn take_hit<S: NotificationSink + ?Sized>(
        &mut self,
        amount: i32,
        attacker: Option<&AttackerInfo>,
        policy: &RecoilPolicy,
        now: SimTime,
        sink: &mut S,
    ) -> ScuffleResult<HitOutcome> {
        ensure_non_negative("damage", amount)?;
        let reaction = attacker.map_or(HitReaction::NONE, |a| policy.reaction(a.kind, self.kind));
        reaction.check()?;

        let damage = self
            .health
            .take_damage(amount, attacker.map(|a| a.id), now, sink)?;
        if !damage.landed() {
            return Ok(HitOutcome::ignored());
        }

        let mut outcome = HitOutcome {
            damage,
            ..HitOutcome::ignored()
        };
        let Some(attacker) = attacker else {
            return Ok(outcome);
        };

        let mut direction = planar_direction(attacker.position, self.position);
        if direction == Vec3::ZERO {
            direction = flatten(attacker.facing).normalize_or_zero();
        }
        outcome.knockback = reaction.knockback(direction);

        if outcome.knockback != Vec3::ZERO {
            if let Some(body) = self.body.as_mut() {
                body.apply_velocity_change(outcome.knockback);
                outcome.knockback_applied = true;
            } else {
                debug!(actor = %self.id, "no body, knockback skipped");
            }
        }

        if reaction.stuns() && self.is_alive() {
            let until = self.recoil.apply_recoil(reaction.recoil, now)?;
            sink.emit(CombatNotification::RecoilStarted {
                actor: self.id,
                until,
            });
            outcome.recoil_until = Some(until);
        }

        Ok(outcome)
    }

    /// Restores up to `amount` hit points.
    pub fn heal<S: NotificationSink + ?Sized>(
        &mut self,
        amount: i32,
        sink: &mut S,
    ) -> ScuffleResult<i32> {
        self.health.heal(amount, sink)
    }

    /// Brings a dead actor back at its spawn anchor with full health.
    /// Returns false (no-op) if the actor is alive.
    pub fn respawn<S: NotificationSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        if !self.health.revive() {
            return false;
        }
        self.position = self.spawn_anchor;
        self.recoil.reset();
        self.next_attack_at = None;
        if let Some(body) = self.body.as_mut() {
            *body = Body::grounded();
        }
        sink.emit(CombatNotification::HealthChanged {
            actor: self.id,
            current: self.health.current(),
            max: self.health.max(),
        });
        sink.emit(CombatNotification::Respawned {
            actor: self.id,
            position: self.position,
        });
        true
    }
}
