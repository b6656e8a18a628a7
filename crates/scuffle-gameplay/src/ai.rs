//! Enemy behavior.
//!
//! Chasing enemies pick the nearest living player inside their detection
//! radius, walk towards it, and punch once in reach. Stationary dummies do
//! nothing. Behavior only produces [`ActorInput`]; the controller still
//! applies recoil, death and cooldown gating.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use scuffle_common::{flatten, ActorId};

use crate::actor::{Actor, ActorKind};
use crate::controller::ActorInput;

/// Current intent of an enemy, exposed for presentation/debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyIntent {
    /// No target
    Idle,
    /// Moving towards a target
    Chase(ActorId),
    /// Target in reach
    Attack(ActorId),
}

/// A potential target as seen by the AI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    /// Target ID
    pub id: ActorId,
    /// Target position
    pub position: Vec3,
}

impl TargetView {
    /// Builds a view of every living player among `actors`.
    pub fn players<'a>(actors: impl IntoIterator<Item = &'a Actor>) -> Vec<Self> {
        actors
            .into_iter()
            .filter(|a| a.kind() == ActorKind::Player && a.is_alive())
            .map(|a| Self {
                id: a.id(),
                position: a.position,
            })
            .collect()
    }
}

/// Decides this tick's input for an enemy.
#[must_use]
pub fn think(actor: &Actor, players: &[TargetView]) -> (EnemyIntent, ActorInput) {
    if actor.kind() != ActorKind::ChasingEnemy || !actor.is_alive() {
        return (EnemyIntent::Idle, ActorInput::IDLE);
    }

    let config = actor.config();
    let nearest = players
        .iter()
        .map(|p| (p, flatten(p.position - actor.position)))
        .filter(|(_, offset)| offset.length() <= config.detection_radius)
        .min_by(|(_, a), (_, b)| a.length_squared().total_cmp(&b.length_squared()));

    let Some((target, offset)) = nearest else {
        return (EnemyIntent::Idle, ActorInput::IDLE);
    };

    let direction = offset.normalize_or_zero();
    let facing = Vec2::new(direction.x, direction.z);

    if offset.length() <= config.attack_range {
        return (EnemyIntent::Attack(target.id), ActorInput::IDLE.with_attack());
    }

    (
        EnemyIntent::Chase(target.id),
        ActorInput {
            movement: facing,
            ..ActorInput::IDLE
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorConfig;

    fn chaser_at(position: Vec3) -> Actor {
        Actor::new(
            ActorKind::ChasingEnemy,
            ActorConfig::for_kind(ActorKind::ChasingEnemy),
            position,
        )
        .expect("valid actor")
    }

    fn target(raw: u64, position: Vec3) -> TargetView {
        TargetView {
            id: ActorId::from_raw(raw),
            position,
        }
    }

    #[test]
    fn test_idle_without_targets() {
        let chaser = chaser_at(Vec3::ZERO);
        let (intent, input) = think(&chaser, &[]);
        assert_eq!(intent, EnemyIntent::Idle);
        assert_eq!(input, ActorInput::IDLE);
    }

    #[test]
    fn test_ignores_targets_outside_detection() {
        let chaser = chaser_at(Vec3::ZERO);
        let (intent, _) = think(&chaser, &[target(1, Vec3::new(50.0, 0.0, 0.0))]);
        assert_eq!(intent, EnemyIntent::Idle);
    }

    #[test]
    fn test_chases_nearest() {
        let chaser = chaser_at(Vec3::ZERO);
        let players = [
            target(1, Vec3::new(8.0, 0.0, 0.0)),
            target(2, Vec3::new(0.0, 0.0, -4.0)),
        ];
        let (intent, input) = think(&chaser, &players);
        assert_eq!(intent, EnemyIntent::Chase(ActorId::from_raw(2)));
        assert!((input.movement - Vec2::new(0.0, -1.0)).length() < 1e-5);
        assert!(!input.attack);
    }

    #[test]
    fn test_attacks_in_reach() {
        let chaser = chaser_at(Vec3::ZERO);
        let (intent, input) = think(&chaser, &[target(1, Vec3::new(1.0, 0.0, 0.0))]);
        assert_eq!(intent, EnemyIntent::Attack(ActorId::from_raw(1)));
        assert!(input.attack);
    }

    #[test]
    fn test_dummy_never_thinks() {
        let dummy = Actor::new(
            ActorKind::StationaryEnemy,
            ActorConfig::for_kind(ActorKind::StationaryEnemy),
            Vec3::ZERO,
        )
        .expect("valid actor");
        let (intent, _) = think(&dummy, &[target(1, Vec3::X)]);
        assert_eq!(intent, EnemyIntent::Idle);
    }
}
