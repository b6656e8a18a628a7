//! Hit recoil: the short window after being hit during which an actor
//! cannot act, and the policy table deciding knockback and recoil per
//! attacker/victim pairing.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scuffle_common::{ensure_non_negative_finite, ensure_positive, ScuffleResult, SimTime, UP};

use crate::actor::ActorKind;

// ============================================================================
// Recoil Window
// ============================================================================

/// Per-actor "cannot act" window.
///
/// The deadline is authoritative. The `in_recoil` flag is only cleared by
/// [`RecoilController::expire`] and may lag behind it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecoilController {
    /// Advisory flag
    in_recoil: bool,
    /// End of the current window
    recoil_end: Option<SimTime>,
}

impl RecoilController {
    /// Creates a controller with no active window.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a recoil window of `duration` seconds at `now`, replacing any
    /// window still running. Returns the new end time.
    pub fn apply_recoil(&mut self, duration: f32, now: SimTime) -> ScuffleResult<SimTime> {
        let duration = ensure_positive("recoil_duration", duration)?;
        let end = now.after(duration);
        if let Some(previous) = self.recoil_end.filter(|_| self.in_recoil) {
            debug!(%previous, %end, "recoil window replaced");
        }
        self.in_recoil = true;
        self.recoil_end = Some(end);
        Ok(end)
    }

    /// Whether the actor is blocked from acting at `now`.
    #[must_use]
    pub fn is_blocked(&self, now: SimTime) -> bool {
        self.recoil_end.is_some_and(|end| now < end)
    }

    /// Advisory flag; may still be set after the window ended.
    #[must_use]
    pub const fn in_recoil(&self) -> bool {
        self.in_recoil
    }

    /// End of the current (or last) window.
    #[must_use]
    pub const fn recoil_end(&self) -> Option<SimTime> {
        self.recoil_end
    }

    /// Seconds left in the window at `now`.
    #[must_use]
    pub fn remaining(&self, now: SimTime) -> f32 {
        self.recoil_end.map_or(0.0, |end| now.until(end))
    }

    /// Clears the flag once the deadline has passed. Returns true if the
    /// window ended on this call.
    pub fn expire(&mut self, now: SimTime) -> bool {
        if self.in_recoil && !self.is_blocked(now) {
            self.in_recoil = false;
            return true;
        }
        false
    }

    /// Drops any window (used on respawn).
    pub fn reset(&mut self) {
        self.in_recoil = false;
        self.recoil_end = None;
    }
}

// ============================================================================
// Policy Table
// ============================================================================

/// Player punch horizontal knockback force.
pub const PUNCH_FORCE: f32 = 8.0;
/// Player punch upward knockback force.
pub const PUNCH_UPWARD: f32 = 3.0;
/// Time a punched chasing enemy cannot act, in seconds.
pub const PUNCH_STUN: f32 = 0.6;
/// Knockback fraction applied to pairings with no special rule.
pub const DEFAULT_KNOCKBACK_RATIO: f32 = 0.7;
/// Chasing enemy hit horizontal knockback force.
pub const CHASER_HIT_FORCE: f32 = 10.0;
/// Chasing enemy hit upward knockback force.
pub const CHASER_HIT_UPWARD: f32 = 4.0;
/// Time the player cannot act after a chasing enemy hit, in seconds.
pub const CHASER_HIT_RECOIL: f32 = 1.0;

/// Knockback and recoil applied to a victim for one hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReaction {
    /// Horizontal knockback force
    pub force: f32,
    /// Upward knockback force
    pub upward: f32,
    /// Recoil window in seconds (0 = none)
    pub recoil: f32,
}

impl HitReaction {
    /// No knockback, no recoil.
    pub const NONE: Self = Self {
        force: 0.0,
        upward: 0.0,
        recoil: 0.0,
    };

    /// Knockback velocity change along a horizontal unit `direction`.
    #[must_use]
    pub fn knockback(&self, direction: Vec3) -> Vec3 {
        direction * self.force + UP * self.upward
    }

    /// Whether the victim enters recoil.
    #[must_use]
    pub fn stuns(&self) -> bool {
        self.recoil > 0.0
    }

    /// Rejects non-finite or negative components.
    pub fn check(&self) -> ScuffleResult<()> {
        ensure_non_negative_finite("knockback_force", self.force)?;
        ensure_non_negative_finite("knockback_upward", self.upward)?;
        ensure_non_negative_finite("recoil_duration", self.recoil)?;
        Ok(())
    }

    /// Scales both knockback components.
    #[must_use]
    pub fn scaled(self, ratio: f32) -> Self {
        Self {
            force: self.force * ratio,
            upward: self.upward * ratio,
            recoil: self.recoil,
        }
    }
}

/// Tunable knockback/recoil table keyed on attacker and victim kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoilPolicy {
    /// Player punch horizontal force
    pub punch_force: f32,
    /// Player punch upward force
    pub punch_upward: f32,
    /// Stun on a punched chasing enemy (seconds)
    pub punch_stun: f32,
    /// Fraction of knockback for pairings without a special rule
    pub default_knockback_ratio: f32,
    /// Chasing enemy hit horizontal force
    pub chaser_hit_force: f32,
    /// Chasing enemy hit upward force
    pub chaser_hit_upward: f32,
    /// Recoil inflicted on the player by a chasing enemy (seconds)
    pub chaser_hit_recoil: f32,
}

impl Default for RecoilPolicy {
    fn default() -> Self {
        Self {
            punch_force: PUNCH_FORCE,
            punch_upward: PUNCH_UPWARD,
            punch_stun: PUNCH_STUN,
            default_knockback_ratio: DEFAULT_KNOCKBACK_RATIO,
            chaser_hit_force: CHASER_HIT_FORCE,
            chaser_hit_upward: CHASER_HIT_UPWARD,
            chaser_hit_recoil: CHASER_HIT_RECOIL,
        }
    }
}

impl RecoilPolicy {
    /// Looks up the reaction for `attacker` hitting `victim`.
    #[must_use]
    pub fn reaction(&self, attacker: ActorKind, victim: ActorKind) -> HitReaction {
        match (attacker, victim) {
            // Dummies never attack and never react.
            (ActorKind::StationaryEnemy, _) | (_, ActorKind::StationaryEnemy) => HitReaction::NONE,
            (ActorKind::Player, ActorKind::ChasingEnemy) => HitReaction {
                force: self.punch_force,
                upward: self.punch_upward,
                recoil: self.punch_stun,
            },
            (ActorKind::ChasingEnemy, ActorKind::Player) => HitReaction {
                force: self.chaser_hit_force,
                upward: self.chaser_hit_upward,
                recoil: self.chaser_hit_recoil,
            },
            (ActorKind::Player, ActorKind::Player) => HitReaction {
                force: self.punch_force,
                upward: self.punch_upward,
                recoil: 0.0,
            }
            .scaled(self.default_knockback_ratio),
            (ActorKind::ChasingEnemy, ActorKind::ChasingEnemy) => HitReaction {
                force: self.chaser_hit_force,
                upward: self.chaser_hit_upward,
                recoil: 0.0,
            }
            .scaled(self.default_knockback_ratio),
        }
    }

    /// Rejects any non-finite or negative value.
    pub fn check(&self) -> ScuffleResult<()> {
        ensure_non_negative_finite("punch_force", self.punch_force)?;
        ensure_non_negative_finite("punch_upward", self.punch_upward)?;
        ensure_non_negative_finite("punch_stun", self.punch_stun)?;
        ensure_non_negative_finite("default_knockback_ratio", self.default_knockback_ratio)?;
        ensure_non_negative_finite("chaser_hit_force", self.chaser_hit_force)?;
        ensure_non_negative_finite("chaser_hit_upward", self.chaser_hit_upward)?;
        ensure_non_negative_finite("chaser_hit_recoil", self.chaser_hit_recoil)?;
        Ok(())
    }

    /// Clamps every value to be finite and non-negative.
    pub fn validate(&mut self) {
        for value in [
            &mut self.punch_force,
            &mut self.punch_upward,
            &mut self.punch_stun,
            &mut self.default_knockback_ratio,
            &mut self.chaser_hit_force,
            &mut self.chaser_hit_upward,
            &mut self.chaser_hit_recoil,
        ] {
            if !value.is_finite() || *value < 0.0 {
                *value = 0.0;
            }
        }
    }
}
