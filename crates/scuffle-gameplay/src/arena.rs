//! The arena: actor roster, simulation clock, and the per-tick update.
//!
//! [`Arena::step`] runs one tick in a fixed order:
//! 1. Advance the clock.
//! 2. Expire recoil flags and fire due respawns.
//! 3. Gather input (queued input, else AI) and apply it through the
//!    controller, collecting attack requests.
//! 4. Resolve attacks in request order.
//! 5. Integrate bodies of living actors.
//!
//! Everything happens synchronously inside the step.

use std::collections::BTreeMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use scuffle_common::{within_sphere, ActorId, ScuffleError, ScuffleResult, SimClock, SimTime};

use crate::actor::{Actor, ActorConfig, ActorKind, HitOutcome};
use crate::ai::{self, EnemyIntent, TargetView};
use crate::combat::{AttackEvent, CombatResolver, CombatWorld};
use crate::controller::{self, ActorInput, InputOutcome};
use crate::events::NotificationHub;
use crate::physics::PhysicsConfig;
use crate::recoil::RecoilPolicy;

// ============================================================================
// Roster
// ============================================================================

/// Owned set of actors, keyed by ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    actors: BTreeMap<ActorId, Actor>,
}

impl Roster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an actor, returning its ID.
    pub fn insert(&mut self, actor: Actor) -> ActorId {
        let id = actor.id();
        self.actors.insert(id, actor);
        id
    }

    /// Looks up an actor.
    #[must_use]
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Looks up an actor mutably.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Iterates over actors in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Iterates mutably over actors in ID order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.values_mut()
    }

    /// Number of actors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Whether the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl CombatWorld for Roster {
    fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.get(id)
    }

    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.get_mut(id)
    }

    fn actors_within(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
        self.actors
            .values()
            .filter(|a| within_sphere(center, radius, a.position))
            .map(Actor::id)
            .collect()
    }
}

// ============================================================================
// Arena
// ============================================================================

/// Arena-wide configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Physics tuning
    pub physics: PhysicsConfig,
    /// Knockback/recoil table
    pub policy: RecoilPolicy,
}

/// What happened during one [`Arena::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    /// Tick number (1-based)
    pub tick: u64,
    /// Time at the end of the step
    pub time: SimTime,
    /// Attacks resolved this tick
    pub attacks: Vec<AttackEvent>,
    /// Actors that respawned this tick
    pub respawned: Vec<ActorId>,
    /// Actors whose input was discarded because of recoil
    pub blocked: Vec<ActorId>,
}

/// The simulation.
#[derive(Debug, Default)]
pub struct Arena {
    roster: Roster,
    clock: SimClock,
    resolver: CombatResolver,
    physics: PhysicsConfig,
    hub: NotificationHub,
    /// Input queued for the next step
    inputs: BTreeMap<ActorId, ActorInput>,
    /// Last AI decision per enemy
    intents: BTreeMap<ActorId, EnemyIntent>,
}

impl Arena {
    /// Creates an empty arena. Fails if the recoil policy holds non-finite
    /// or negative values.
    pub fn new(config: ArenaConfig) -> ScuffleResult<Self> {
        Ok(Self {
            resolver: CombatResolver::new(config.policy)?,
            physics: config.physics,
            ..Self::default()
        })
    }

    /// Spawns an actor at `position`, which becomes its spawn anchor.
    pub fn spawn(
        &mut self,
        kind: ActorKind,
        config: ActorConfig,
        position: Vec3,
    ) -> ScuffleResult<ActorId> {
        let actor = Actor::new(kind, config, position)?;
        let id = self.roster.insert(actor);
        info!(actor = %id, kind = kind.display_name(), ?position, "actor spawned");
        Ok(id)
    }

    /// Spawns an actor with the default configuration for its kind.
    pub fn spawn_default(&mut self, kind: ActorKind, position: Vec3) -> ScuffleResult<ActorId> {
        self.spawn(kind, ActorConfig::for_kind(kind), position)
    }

    /// Current simulation time.
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.clock.now()
    }

    /// Ticks run so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Looks up an actor.
    #[must_use]
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.roster.get(id)
    }

    /// Looks up an actor mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.roster.get_mut(id)
    }

    /// The roster.
    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Notification hub, for subscribing presentation collaborators.
    pub fn hub_mut(&mut self) -> &mut NotificationHub {
        &mut self.hub
    }

    /// Recoil policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RecoilPolicy {
        self.resolver.policy()
    }

    /// Last AI decision for an enemy.
    #[must_use]
    pub fn intent(&self, id: ActorId) -> Option<EnemyIntent> {
        self.intents.get(&id).copied()
    }

    /// Queues input for the next step. Queued input overrides AI for that
    /// tick; a second call before the step replaces the first.
    pub fn set_input(&mut self, id: ActorId, input: ActorInput) -> ScuffleResult<()> {
        self.require(id)?;
        self.inputs.insert(id, input);
        Ok(())
    }

    /// Applies damage from outside an attack (hazards, scripts).
    pub fn damage(
        &mut self,
        target: ActorId,
        amount: i32,
        attacker: Option<ActorId>,
    ) -> ScuffleResult<HitOutcome> {
        let info = attacker
            .map(|id| self.require(id).map(Actor::attacker_info))
            .transpose()?;
        let now = self.clock.now();
        let policy = self.resolver.policy();
        let actor = self
            .roster
            .get_mut(target)
            .ok_or(ScuffleError::UnknownActor(target))?;
        actor.take_hit(amount, info.as_ref(), policy, now, &mut self.hub)
    }

    /// Heals an actor. Returns hit points restored.
    pub fn heal(&mut self, id: ActorId, amount: i32) -> ScuffleResult<i32> {
        let actor = self
            .roster
            .get_mut(id)
            .ok_or(ScuffleError::UnknownActor(id))?;
        actor.heal(amount, &mut self.hub)
    }

    /// Respawns a dead actor now. Returns false if it was alive.
    pub fn respawn(&mut self, id: ActorId) -> ScuffleResult<bool> {
        let actor = self
            .roster
            .get_mut(id)
            .ok_or(ScuffleError::UnknownActor(id))?;
        let respawned = actor.respawn(&mut self.hub);
        if respawned {
            info!(actor = %id, "actor respawned");
        }
        Ok(respawned)
    }

    /// Resolves an attack immediately, bypassing controller gating.
    pub fn resolve_attack(
        &mut self,
        attacker: ActorId,
        range: f32,
        damage: i32,
    ) -> ScuffleResult<AttackEvent> {
        let now = self.clock.now();
        self.resolver
            .resolve_attack(&mut self.roster, attacker, range, damage, now, &mut self.hub)
    }

    /// Runs one tick of `dt` seconds.
    pub fn step(&mut self, dt: f32) -> ScuffleResult<StepReport> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(ScuffleError::invalid(
                "dt",
                format!("must be finite and >= 0, got {dt}"),
            ));
        }

        let now = self.clock.advance(dt);
        let mut report = StepReport {
            tick: self.clock.tick(),
            time: now,
            ..StepReport::default()
        };

        for actor in self.roster.iter_mut() {
            actor.recoil_mut().expire(now);
            if actor.health().respawn_due(now) && actor.respawn(&mut self.hub) {
                info!(actor = %actor.id(), "actor respawned");
                report.respawned.push(actor.id());
            }
        }

        let players = TargetView::players(self.roster.iter());
        let mut requests = Vec::new();
        for actor in self.roster.iter_mut() {
            let id = actor.id();
            let input = match self.inputs.remove(&id) {
                Some(input) => input,
                None if actor.kind() == ActorKind::Player => ActorInput::IDLE,
                None => {
                    let (intent, input) = ai::think(actor, &players);
                    self.intents.insert(id, intent);
                    input
                },
            };

            let (outcome, request) = controller::apply_input(actor, &input, now);
            if outcome == InputOutcome::Blocked {
                report.blocked.push(id);
            }
            requests.extend(request);
        }

        for request in requests {
            // An earlier attack this tick may have killed the attacker.
            if !self.roster.get(request.attacker).is_some_and(Actor::is_alive) {
                continue;
            }
            let event = self.resolver.resolve_attack(
                &mut self.roster,
                request.attacker,
                request.range,
                request.damage,
                now,
                &mut self.hub,
            )?;
            report.attacks.push(event);
        }

        for actor in self.roster.iter_mut().filter(|a| a.is_alive()) {
            let mut position = actor.position;
            if let Some(body) = actor.body_mut() {
                body.integrate(&mut position, dt, &self.physics);
            }
            actor.position = position;
        }

        trace!(tick = report.tick, attacks = report.attacks.len(), "step complete");
        Ok(report)
    }

    fn require(&self, id: ActorId) -> ScuffleResult<&Actor> {
        self.roster.get(id).ok_or(ScuffleError::UnknownActor(id))
    }
}
