//! Attack resolution.
//!
//! This module provides:
//! - The broad-phase/actor-access seam ([`CombatWorld`])
//! - [`CombatResolver`], which applies one area attack to every actor in reach
//! - [`AttackEvent`], the transient record of what an attack did
//!
//! The resolver decides what happens when an attack connects. When an attack
//! may be attempted (cooldown, recoil, death) is the attacker's controller's
//! business; the resolver keeps no state between calls.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scuffle_common::{ensure_positive, ActorId, ScuffleError, ScuffleResult, SimTime};

use crate::actor::Actor;
use crate::events::{CombatNotification, NotificationSink};
use crate::recoil::RecoilPolicy;

/// Access to actors for attack resolution.
///
/// `actors_within` is the broad-phase query: every actor whose position lies
/// inside the sphere (surface included), in no particular order.
pub trait CombatWorld {
    /// Looks up an actor.
    fn actor(&self, id: ActorId) -> Option<&Actor>;

    /// Looks up an actor mutably.
    fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor>;

    /// All actors within `radius` of `center`.
    fn actors_within(&self, center: Vec3, radius: f32) -> Vec<ActorId>;
}

/// One target hit by an attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackHit {
    /// Actor that was hit
    pub target: ActorId,
    /// Hit points actually removed
    pub damage_dealt: i32,
    /// Knockback velocity change decided for the target
    pub knockback: Vec3,
    /// Whether the hit killed the target
    pub killed: bool,
}

/// Result of one attack resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackEvent {
    /// Attacking actor
    pub attacker: ActorId,
    /// Time of the attack
    pub time: SimTime,
    /// Every target hit, in no particular order
    pub hits: Vec<AttackHit>,
}

impl AttackEvent {
    /// Whether anything was hit.
    #[must_use]
    pub fn landed(&self) -> bool {
        !self.hits.is_empty()
    }

    /// Total damage dealt across all targets.
    #[must_use]
    pub fn total_damage(&self) -> i32 {
        self.hits.iter().map(|h| h.damage_dealt).sum()
    }

    /// The hit on `target`, if any.
    #[must_use]
    pub fn hit_on(&self, target: ActorId) -> Option<&AttackHit> {
        self.hits.iter().find(|h| h.target == target)
    }

    /// Number of targets killed.
    #[must_use]
    pub fn kills(&self) -> usize {
        self.hits.iter().filter(|h| h.killed).count()
    }
}

/// Applies area attacks.
#[derive(Debug, Clone, Default)]
pub struct CombatResolver {
    /// Knockback/recoil table
    policy: RecoilPolicy,
}

impl CombatResolver {
    /// Creates a resolver with the given policy. Rejects a policy holding
    /// non-finite or negative values.
    pub fn new(policy: RecoilPolicy) -> ScuffleResult<Self> {
        policy.check()?;
        Ok(Self { policy })
    }

    /// Recoil policy in use.
    #[must_use]
    pub const fn policy(&self) -> &RecoilPolicy {
        &self.policy
    }

    /// Replaces the recoil policy. The current policy is kept on error.
    pub fn set_policy(&mut self, policy: RecoilPolicy) -> ScuffleResult<()> {
        policy.check()?;
        self.policy = policy;
        Ok(())
    }

    /// Resolves an attack by `attacker` hitting everything within `range`
    /// for `damage`.
    ///
    /// Every other living actor in the sphere takes the hit; dead actors are
    /// not targetable. Each landed hit emits
    /// [`CombatNotification::AttackLanded`].
    pub fn resolve_attack<W, S>(
        &self,
        world: &mut W,
        attacker: ActorId,
        range: f32,
        damage: i32,
        now: SimTime,
        sink: &mut S,
    ) -> ScuffleResult<AttackEvent>
    where
        W: CombatWorld + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let range = ensure_positive("range", range)?;
        if damage <= 0 {
            return Err(ScuffleError::invalid(
                "damage",
                format!("must be > 0, got {damage}"),
            ));
        }

        let info = world
            .actor(attacker)
            .map(Actor::attacker_info)
            .ok_or(ScuffleError::UnknownActor(attacker))?;

        let mut event = AttackEvent {
            attacker,
            time: now,
            hits: Vec::new(),
        };

        // Every reaction is checked before the first hit is applied.
        let mut targets = Vec::new();
        for target_id in world.actors_within(info.position, range) {
            if target_id == attacker {
                continue;
            }
            let Some(target) = world.actor(target_id).filter(|t| t.is_targetable()) else {
                continue;
            };
            self.policy.reaction(info.kind, target.kind()).check()?;
            targets.push(target_id);
        }

        for target_id in targets {
            let Some(target) = world.actor_mut(target_id) else {
                continue;
            };

            let outcome = target.take_hit(damage, Some(&info), &self.policy, now, sink)?;
            if !outcome.damage.landed() {
                continue;
            }

            sink.emit(CombatNotification::AttackLanded {
                attacker,
                target: target_id,
                damage: outcome.damage.dealt(),
                position: target.position,
            });
            event.hits.push(AttackHit {
                target: target_id,
                damage_dealt: outcome.damage.dealt(),
                knockback: outcome.knockback,
                killed: outcome.damage.is_kill(),
            });
        }

        debug!(
            attacker = %attacker,
            targets = event.hits.len(),
            total = event.total_damage(),
            "attack resolved"
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorConfig, ActorKind};
    use crate::events::NotificationKind;
    use crate::recoil::{PUNCH_FORCE, PUNCH_UPWARD};
    use scuffle_common::within_sphere;

    /// Brute-force world for resolver tests.
    #[derive(Default)]
    struct TestWorld {
        actors: Vec<Actor>,
    }

    impl TestWorld {
        fn add(&mut self, kind: ActorKind, position: Vec3) -> ActorId {
            let actor =
                Actor::new(kind, ActorConfig::for_kind(kind), position).expect("valid actor");
            let id = actor.id();
            self.actors.push(actor);
            id
        }

        fn hp(&self, id: ActorId) -> i32 {
            self.actor(id).map_or(-1, |a| a.health().current())
        }
    }

    impl CombatWorld for TestWorld {
        fn actor(&self, id: ActorId) -> Option<&Actor> {
            self.actors.iter().find(|a| a.id() == id)
        }

        fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
            self.actors.iter_mut().find(|a| a.id() == id)
        }

        fn actors_within(&self, center: Vec3, radius: f32) -> Vec<ActorId> {
            self.actors
                .iter()
                .filter(|a| within_sphere(center, radius, a.position))
                .map(Actor::id)
                .collect()
        }
    }

    #[test]
    fn test_only_actors_in_range_are_hit() {
        let mut world = TestWorld::default();
        let player = world.add(ActorKind::Player, Vec3::ZERO);
        let near = world.add(ActorKind::StationaryEnemy, Vec3::new(1.0, 0.0, 0.0));
        let edge = world.add(ActorKind::StationaryEnemy, Vec3::new(0.0, 0.0, 1.9));
        let far = world.add(ActorKind::StationaryEnemy, Vec3::new(-3.0, 0.0, 0.0));

        let resolver = CombatResolver::default();
        let event = resolver
            .resolve_attack(&mut world, player, 2.0, 10, SimTime::ZERO, &mut ())
            .expect("valid attack");

        assert_eq!(event.hits.len(), 2);
        assert!(event.hit_on(near).is_some());
        assert!(event.hit_on(edge).is_some());
        assert!(event.hit_on(far).is_none());
        assert_eq!(world.hp(near), 40);
        assert_eq!(world.hp(edge), 40);
        assert_eq!(world.hp(far), 50);
        assert_eq!(world.hp(player), 100);
        assert_eq!(event.total_damage(), 20);
    }

    #[test]
    fn test_knockback_by_victim_kind() {
        let mut world = TestWorld::default();
        let player = world.add(ActorKind::Player, Vec3::ZERO);
        let dummy = world.add(ActorKind::StationaryEnemy, Vec3::new(1.0, 0.0, 0.0));
        let chaser = world.add(ActorKind::ChasingEnemy, Vec3::new(-1.0, 0.0, 0.0));

        let resolver = CombatResolver::default();
        let event = resolver
            .resolve_attack(&mut world, player, 1.5, 5, SimTime::ZERO, &mut ())
            .expect("valid attack");

        let dummy_hit = event.hit_on(dummy).expect("dummy hit");
        assert_eq!(dummy_hit.knockback.length(), 0.0);

        let chaser_hit = event.hit_on(chaser).expect("chaser hit");
        let expected = PUNCH_FORCE.hypot(PUNCH_UPWARD);
        assert!((chaser_hit.knockback.length() - expected).abs() < 1e-5);
        assert!(chaser_hit.knockback.x < 0.0);
    }

    #[test]
    fn test_dead_actors_are_skipped() {
        let mut world = TestWorld::default();
        let player = world.add(ActorKind::Player, Vec3::ZERO);
        let dummy = world.add(ActorKind::StationaryEnemy, Vec3::X);

        let resolver = CombatResolver::default();
        let first = resolver
            .resolve_attack(&mut world, player, 2.0, 100, SimTime::ZERO, &mut ())
            .expect("valid attack");
        assert_eq!(first.kills(), 1);
        assert_eq!(first.hit_on(dummy).map(|h| h.damage_dealt), Some(50));

        let second = resolver
            .resolve_attack(&mut world, player, 2.0, 100, SimTime::ZERO, &mut ())
            .expect("valid attack");
        assert!(!second.landed());
    }

    #[test]
    fn test_attack_landed_notifications() {
        let mut world = TestWorld::default();
        let player = world.add(ActorKind::Player, Vec3::ZERO);
        world.add(ActorKind::StationaryEnemy, Vec3::X);
        world.add(ActorKind::StationaryEnemy, Vec3::NEG_X);

        let mut events = Vec::new();
        CombatResolver::default()
            .resolve_attack(&mut world, player, 2.0, 10, SimTime::ZERO, &mut events)
            .expect("valid attack");

        let landed = events
            .iter()
            .filter(|e| e.kind() == NotificationKind::AttackLanded)
            .count();
        assert_eq!(landed, 2);
    }

    #[test]
    fn test_invalid_arguments() {
        let mut world = TestWorld::default();
        let player = world.add(ActorKind::Player, Vec3::ZERO);
        let resolver = CombatResolver::default();

        assert!(resolver
            .resolve_attack(&mut world, player, 0.0, 10, SimTime::ZERO, &mut ())
            .is_err());
        assert!(resolver
            .resolve_attack(&mut world, player, 2.0, -5, SimTime::ZERO, &mut ())
            .is_err());
        assert_eq!(
            resolver.resolve_attack(
                &mut world,
                ActorId::from_raw(u64::MAX),
                2.0,
                10,
                SimTime::ZERO,
                &mut ()
            ),
            Err(ScuffleError::UnknownActor(ActorId::from_raw(u64::MAX)))
        );
    }

    #[test]
    fn test_bad_policy_rejected() {
        let infinite_stun = RecoilPolicy {
            punch_stun: f32::INFINITY,
            ..RecoilPolicy::default()
        };
        assert!(CombatResolver::new(infinite_stun.clone()).is_err());

        let mut resolver = CombatResolver::default();
        assert!(resolver.set_policy(infinite_stun).is_err());
        assert_eq!(resolver.policy(), &RecoilPolicy::default());
    }

    #[test]
    fn test_overflowing_reaction_leaves_world_untouched() {
        let mut world = TestWorld::default();
        let player = world.add(ActorKind::Player, Vec3::ZERO);
        let dummy = world.add(ActorKind::StationaryEnemy, Vec3::X);
        let other = world.add(ActorKind::Player, Vec3::NEG_X);

        // Every value is finite, but player-on-player knockback overflows.
        let policy = RecoilPolicy {
            punch_force: f32::MAX,
            default_knockback_ratio: 2.0,
            ..RecoilPolicy::default()
        };
        let resolver = CombatResolver::new(policy).expect("finite policy");
        let mut events = Vec::new();
        let result =
            resolver.resolve_attack(&mut world, player, 2.0, 10, SimTime::ZERO, &mut events);

        assert!(result.is_err());
        assert_eq!(world.hp(dummy), 50);
        assert_eq!(world.hp(other), 100);
        assert!(events.is_empty());
    }

    #[test]
    fn test_resolver_is_stateless() {
        let mut world = TestWorld::default();
        let player = world.add(ActorKind::Player, Vec3::ZERO);
        let dummy = world.add(ActorKind::StationaryEnemy, Vec3::X);
        let resolver = CombatResolver::default();

        for _ in 0..3 {
            resolver
                .resolve_attack(&mut world, player, 2.0, 10, SimTime::ZERO, &mut ())
                .expect("valid attack");
        }
        assert_eq!(world.hp(dummy), 20);
    }
}
