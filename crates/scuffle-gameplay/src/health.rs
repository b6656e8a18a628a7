//! Actor hit points and the alive/dead state machine.
//!
//! ```text
//! Alive --(hp reaches 0)--> Dead --(respawn deadline or respawn())--> Alive
//! ```
//!
//! Damage and healing are ignored while dead. Non-player actors schedule
//! their own respawn deadline on death; players leave that to whoever
//! controls them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use scuffle_common::{
    ensure_non_negative, ensure_non_negative_finite, ensure_positive, ActorId, ScuffleError,
    ScuffleResult, SimTime,
};

use crate::events::{CombatNotification, NotificationSink};

/// Default delay before a dead non-player actor respawns, in seconds.
pub const DEFAULT_RESPAWN_DELAY: f32 = 10.0;

/// Default duration of the damage flash, in seconds.
pub const DEFAULT_FLASH_DURATION: f32 = 0.1;

/// Life state of an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifeState {
    /// Can act and be targeted.
    Alive,
    /// Ignores damage and healing until respawned.
    Dead,
}

/// Outcome of [`ActorHealth::take_damage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageResult {
    /// Actor was already dead; nothing changed.
    NoOp,
    /// Damage applied, actor survived.
    Damaged {
        /// Hit points actually removed
        dealt: i32,
        /// Hit points left
        remaining: i32,
    },
    /// Damage applied and the actor died.
    Killed {
        /// Hit points actually removed
        dealt: i32,
    },
}

impl DamageResult {
    /// Hit points actually removed.
    #[must_use]
    pub const fn dealt(&self) -> i32 {
        match self {
            Self::NoOp => 0,
            Self::Damaged { dealt, .. } | Self::Killed { dealt } => *dealt,
        }
    }

    /// Whether the damage was applied at all.
    #[must_use]
    pub const fn landed(&self) -> bool {
        !matches!(self, Self::NoOp)
    }

    /// Whether this hit killed the actor.
    #[must_use]
    pub const fn is_kill(&self) -> bool {
        matches!(self, Self::Killed { .. })
    }
}

/// Hit points, death state, respawn deadline and damage flash for one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorHealth {
    /// Owning actor
    owner: ActorId,
    /// Maximum hit points
    max_hp: i32,
    /// Current hit points
    current_hp: i32,
    /// Alive or dead
    state: LifeState,
    /// Automatic respawn delay (None = respawn is driven externally)
    respawn_delay: Option<f32>,
    /// Pending respawn deadline while dead
    respawn_deadline: Option<SimTime>,
    /// Damage flash duration
    flash_duration: f32,
    /// End of the current damage flash
    flash_until: Option<SimTime>,
}

impl ActorHealth {
    /// Creates full health for `owner`. Respawn is driven externally unless
    /// [`with_respawn_delay`](Self::with_respawn_delay) is set.
    pub fn new(owner: ActorId, max_hp: i32) -> ScuffleResult<Self> {
        if max_hp <= 0 {
            return Err(ScuffleError::invalid(
                "max_hp",
                format!("must be > 0, got {max_hp}"),
            ));
        }
        Ok(Self {
            owner,
            max_hp,
            current_hp: max_hp,
            state: LifeState::Alive,
            respawn_delay: None,
            respawn_deadline: None,
            flash_duration: DEFAULT_FLASH_DURATION,
            flash_until: None,
        })
    }

    /// Schedules an automatic respawn `delay` seconds after each death.
    pub fn with_respawn_delay(mut self, delay: f32) -> ScuffleResult<Self> {
        self.respawn_delay = Some(ensure_positive("respawn_delay", delay)?);
        Ok(self)
    }

    /// Sets the damage flash duration. Zero disables the flash.
    pub fn with_flash_duration(mut self, duration: f32) -> ScuffleResult<Self> {
        self.flash_duration = ensure_non_negative_finite("flash_duration", duration)?;
        Ok(self)
    }

    /// Owning actor.
    #[must_use]
    pub const fn owner(&self) -> ActorId {
        self.owner
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> i32 {
        self.current_hp
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> i32 {
        self.max_hp
    }

    /// Life state.
    #[must_use]
    pub const fn state(&self) -> LifeState {
        self.state
    }

    /// Whether the actor is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    /// Health as a fraction of max (0.0 - 1.0).
    #[must_use]
    pub fn fraction(&self) -> f32 {
        self.current_hp as f32 / self.max_hp as f32
    }

    /// Automatic respawn delay, if any.
    #[must_use]
    pub const fn respawn_delay(&self) -> Option<f32> {
        self.respawn_delay
    }

    /// Pending respawn deadline.
    #[must_use]
    pub const fn respawn_deadline(&self) -> Option<SimTime> {
        self.respawn_deadline
    }

    /// Whether a scheduled respawn is due at `now`.
    #[must_use]
    pub fn respawn_due(&self, now: SimTime) -> bool {
        self.state == LifeState::Dead && self.respawn_deadline.is_some_and(|d| d.has_passed(now))
    }

    /// Whether the damage flash is showing at `now`.
    #[must_use]
    pub fn is_flashing(&self, now: SimTime) -> bool {
        self.flash_until.is_some_and(|until| now < until)
    }

    /// Applies `amount` damage.
    ///
    /// Returns [`DamageResult::NoOp`] while dead. Hit points never drop
    /// below zero.
    pub fn take_damage<S: NotificationSink + ?Sized>(
        &mut self,
        amount: i32,
        source: Option<ActorId>,
        now: SimTime,
        sink: &mut S,
    ) -> ScuffleResult<DamageResult> {
        let amount = ensure_non_negative("damage", amount)?;
        if self.state == LifeState::Dead {
            return Ok(DamageResult::NoOp);
        }

        let before = self.current_hp;
        self.current_hp = (self.current_hp - amount).max(0);
        let dealt = before - self.current_hp;
        self.flash_until = Some(now.after(self.flash_duration));

        sink.emit(CombatNotification::HealthChanged {
            actor: self.owner,
            current: self.current_hp,
            max: self.max_hp,
        });
        debug!(actor = %self.owner, dealt, remaining = self.current_hp, "damage taken");

        if self.current_hp > 0 {
            return Ok(DamageResult::Damaged {
                dealt,
                remaining: self.current_hp,
            });
        }

        self.die(source, now, sink);
        Ok(DamageResult::Killed { dealt })
    }

    /// Restores up to `amount` hit points, capped at max. Returns the amount
    /// actually restored; zero while dead.
    pub fn heal<S: NotificationSink + ?Sized>(
        &mut self,
        amount: i32,
        sink: &mut S,
    ) -> ScuffleResult<i32> {
        let amount = ensure_non_negative("heal", amount)?;
        if self.state == LifeState::Dead {
            return Ok(0);
        }

        let before = self.current_hp;
        self.current_hp = self.current_hp.saturating_add(amount).min(self.max_hp);
        sink.emit(CombatNotification::HealthChanged {
            actor: self.owner,
            current: self.current_hp,
            max: self.max_hp,
        });
        Ok(self.current_hp - before)
    }

    /// Resets to full health if dead. Returns false (and does nothing) if
    /// already alive.
    ///
    /// Position restore and the respawn notification belong to the owning
    /// actor; see [`Actor::respawn`](crate::actor::Actor::respawn).
    pub fn revive(&mut self) -> bool {
        if self.state == LifeState::Alive {
            return false;
        }
        self.current_hp = self.max_hp;
        self.state = LifeState::Alive;
        self.respawn_deadline = None;
        self.flash_until = None;
        true
    }

    fn die<S: NotificationSink + ?Sized>(
        &mut self,
        killer: Option<ActorId>,
        now: SimTime,
        sink: &mut S,
    ) {
        self.state = LifeState::Dead;
        self.respawn_deadline = self.respawn_delay.map(|delay| now.after(delay));
        info!(
            actor = %self.owner,
            killer = ?killer,
            respawn_at = ?self.respawn_deadline,
            "actor died"
        );
        sink.emit(CombatNotification::Died {
            actor: self.owner,
            killer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn enemy(max_hp: i32) -> ActorHealth {
        ActorHealth::new(ActorId::from_raw(1), max_hp)
            .and_then(|h| h.with_respawn_delay(DEFAULT_RESPAWN_DELAY))
            .expect("valid health")
    }

    #[test]
    fn test_repeated_damage_sequence() {
        let mut health = enemy(50);
        let mut seen = Vec::new();
        for _ in 0..3 {
            health
                .take_damage(10, None, SimTime::ZERO, &mut ())
                .expect("valid damage");
            seen.push(health.current());
            assert!(health.is_alive());
        }
        assert_eq!(seen, vec![40, 30, 20]);
    }

    #[test]
    fn test_lethal_damage_schedules_respawn() {
        let mut health = enemy(50);
        health
            .take_damage(35, None, SimTime::ZERO, &mut ())
            .expect("valid damage");
        assert_eq!(health.current(), 15);

        let now = SimTime::from_secs(4.0);
        let mut events = Vec::new();
        let result = health
            .take_damage(20, Some(ActorId::from_raw(9)), now, &mut events)
            .expect("valid damage");

        assert_eq!(result, DamageResult::Killed { dealt: 15 });
        assert_eq!(health.current(), 0);
        assert_eq!(health.state(), LifeState::Dead);
        assert_eq!(health.respawn_deadline(), Some(SimTime::from_secs(14.0)));
        assert!(matches!(
            events.last(),
            Some(CombatNotification::Died { killer: Some(k), .. }) if k.raw() == 9
        ));
    }

    #[test]
    fn test_player_death_schedules_nothing() {
        let mut player = ActorHealth::new(ActorId::from_raw(1), 10).expect("valid health");
        player
            .take_damage(10, None, SimTime::ZERO, &mut ())
            .expect("valid damage");
        assert!(!player.is_alive());
        assert_eq!(player.respawn_deadline(), None);
        assert!(!player.respawn_due(SimTime::from_secs(1000.0)));
    }

    #[test]
    fn test_respawn_due_on_deadline() {
        let mut health = enemy(5);
        health
            .take_damage(5, None, SimTime::ZERO, &mut ())
            .expect("valid damage");
        assert!(!health.respawn_due(SimTime::from_secs(9.99)));
        assert!(health.respawn_due(SimTime::from_secs(10.0)));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut health = enemy(50);
        health
            .take_damage(5, None, SimTime::ZERO, &mut ())
            .expect("valid damage");
        let restored = health.heal(100, &mut ()).expect("valid heal");
        assert_eq!(restored, 5);
        assert_eq!(health.current(), 50);
    }

    #[test]
    fn test_heal_while_dead_is_noop() {
        let mut health = enemy(5);
        health
            .take_damage(5, None, SimTime::ZERO, &mut ())
            .expect("valid damage");
        let mut events = Vec::new();
        assert_eq!(health.heal(3, &mut events), Ok(0));
        assert_eq!(health.current(), 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        let mut health = enemy(50);
        assert!(health.take_damage(-1, None, SimTime::ZERO, &mut ()).is_err());
        assert!(health.heal(-1, &mut ()).is_err());
        assert_eq!(health.current(), 50);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(ActorHealth::new(ActorId::from_raw(1), 0).is_err());
        assert!(ActorHealth::new(ActorId::from_raw(1), 10)
            .and_then(|h| h.with_respawn_delay(-1.0))
            .is_err());
    }

    #[test]
    fn test_revive_only_from_dead() {
        let mut health = enemy(50);
        assert!(!health.revive());

        health
            .take_damage(50, None, SimTime::ZERO, &mut ())
            .expect("valid damage");
        assert!(health.revive());
        assert_eq!(health.current(), 50);
        assert!(health.is_alive());
        assert_eq!(health.respawn_deadline(), None);
    }

    #[test]
    fn test_damage_flash_window() {
        let mut health = enemy(50)
            .with_flash_duration(0.25)
            .expect("valid duration");
        let now = SimTime::from_secs(1.0);
        health.take_damage(1, None, now, &mut ()).expect("valid damage");
        assert!(health.is_flashing(SimTime::from_secs(1.1)));
        assert!(!health.is_flashing(SimTime::from_secs(1.25)));
    }

    #[test]
    fn test_flash_duration_rejects_bad_values() {
        assert!(enemy(50).with_flash_duration(-3.0).is_err());
        assert!(enemy(50).with_flash_duration(f32::NAN).is_err());
        let health = enemy(50).with_flash_duration(0.0).expect("zero disables flash");
        assert!(!health.is_flashing(SimTime::ZERO));
    }

    proptest! {
        #[test]
        fn prop_damage_clamps_at_zero(
            max in 1i32..500,
            hits in prop::collection::vec(0i32..200, 0..20),
        ) {
            let mut health = enemy(max);
            for d in hits {
                let before = health.current();
                let alive = health.is_alive();
                health.take_damage(d, None, SimTime::ZERO, &mut ()).expect("valid damage");
                prop_assert!(health.current() >= 0);
                if alive && d <= before {
                    prop_assert_eq!(health.current(), before - d);
                } else if alive {
                    prop_assert_eq!(health.current(), 0);
                    prop_assert!(!health.is_alive());
                }
            }
        }

        #[test]
        fn prop_heal_never_exceeds_max(max in 1i32..500, dmg in 0i32..500, heal in 0i32..1000) {
            let mut health = enemy(max);
            health
                .take_damage(dmg.min(max - 1), None, SimTime::ZERO, &mut ())
                .expect("valid damage");
            health.heal(heal, &mut ()).expect("valid heal");
            prop_assert!(health.current() <= health.max());
        }

        #[test]
        fn prop_dead_actors_are_immune(max in 1i32..200, d in 0i32..1000) {
            let mut health = enemy(max);
            health.take_damage(max, None, SimTime::ZERO, &mut ()).expect("valid damage");
            let result = health.take_damage(d, None, SimTime::ZERO, &mut ()).expect("valid damage");
            prop_assert_eq!(result, DamageResult::NoOp);
            prop_assert_eq!(health.current(), 0);
            prop_assert!(!health.is_alive());
        }

        #[test]
        fn prop_revive_restores_max(max in 1i32..500, dmg in 0i32..500) {
            let mut health = enemy(max);
            health.take_damage(max + dmg, None, SimTime::ZERO, &mut ()).expect("valid damage");
            prop_assert!(health.revive());
            prop_assert_eq!(health.current(), health.max());
            prop_assert!(health.is_alive());
        }
    }
}
