//! Headless skirmish loop.
//!
//! Drives the arena at a fixed timestep, plays the player with a simple
//! autopilot, and stands in for the UI: it watches for the player's death
//! and respawns them after a countdown.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use glam::{Vec2, Vec3};
use tracing::{debug, info, warn};

use scuffle_common::{flatten, ActorId, SimTime};
use scuffle_gameplay::{
    Actor, ActorInput, ActorKind, Arena, CombatNotification, NotificationKind,
};

use crate::config::SimConfig;

/// Capacity of the notification channel drained every tick.
const NOTIFICATION_CAPACITY: usize = 1024;

/// Totals collected over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks simulated
    pub ticks: u64,
    /// Attacks that hit at least one target
    pub attacks_landed: u64,
    /// Total damage dealt by all attacks
    pub damage_dealt: i64,
    /// Deaths of any actor
    pub deaths: u64,
    /// Respawns of any actor
    pub respawns: u64,
    /// Deaths of the player
    pub player_deaths: u64,
}

/// Respawn countdown the UI would show for a dead player.
#[derive(Debug, Clone, Copy, Default)]
struct PlayerCountdown {
    respawn_at: Option<SimTime>,
}

impl PlayerCountdown {
    fn start(&mut self, now: SimTime, delay: f32) {
        self.respawn_at = Some(now.after(delay));
    }

    fn due(&self, now: SimTime) -> bool {
        self.respawn_at.is_some_and(|at| at.has_passed(now))
    }

    fn clear(&mut self) {
        self.respawn_at = None;
    }
}

/// A running skirmish.
pub struct Skirmish {
    config: SimConfig,
    arena: Arena,
    player: Option<ActorId>,
    notifications: Receiver<CombatNotification>,
    countdown: PlayerCountdown,
    summary: RunSummary,
}

impl Skirmish {
    /// Builds the arena and spawns the configured roster.
    pub fn new(config: SimConfig) -> Result<Self> {
        let mut arena =
            Arena::new(config.arena.clone()).context("invalid arena configuration")?;
        let notifications = arena
            .hub_mut()
            .subscribe_channel(&NotificationKind::ALL, NOTIFICATION_CAPACITY);

        let mut player = None;
        for entry in &config.roster {
            let id = arena
                .spawn(entry.kind, entry.actor_config(), Vec3::from(entry.position))
                .with_context(|| format!("spawning {:?} at {:?}", entry.kind, entry.position))?;
            if entry.kind == ActorKind::Player && player.is_none() {
                player = Some(id);
            }
        }

        Ok(Self {
            config,
            arena,
            player,
            notifications,
            countdown: PlayerCountdown::default(),
            summary: RunSummary::default(),
        })
    }

    /// The arena.
    #[must_use]
    pub const fn arena(&self) -> &Arena {
        &self.arena
    }

    /// The first configured player, if any.
    #[must_use]
    pub const fn player(&self) -> Option<ActorId> {
        self.player
    }

    /// Runs one fixed tick.
    pub fn tick(&mut self) -> Result<()> {
        let now = self.arena.now();

        if let Some(player) = self.player {
            if self.countdown.due(now) {
                self.countdown.clear();
                self.arena.respawn(player)?;
            }
            if self.config.autopilot {
                if let Some(input) = autopilot(&self.arena, player) {
                    if let Err(e) = self.arena.set_input(player, input) {
                        warn!("Autopilot input rejected: {e}");
                    }
                }
            }
        }

        let report = self.arena.step(self.config.dt())?;
        self.summary.ticks = report.tick;
        for event in report.attacks.iter().filter(|e| e.landed()) {
            self.summary.attacks_landed += 1;
            self.summary.damage_dealt += i64::from(event.total_damage());
        }

        self.drain_notifications();
        Ok(())
    }

    /// Runs the configured number of ticks and returns the totals.
    pub fn run(mut self) -> Result<RunSummary> {
        let total = self.config.total_ticks();
        info!(
            ticks = total,
            actors = self.arena().roster().len(),
            player = ?self.player(),
            "Skirmish starting"
        );

        for _ in 0..total {
            self.tick()?;
        }

        info!(
            ticks = self.summary.ticks,
            attacks = self.summary.attacks_landed,
            damage = self.summary.damage_dealt,
            deaths = self.summary.deaths,
            respawns = self.summary.respawns,
            "Skirmish finished"
        );
        Ok(self.summary)
    }

    fn drain_notifications(&mut self) {
        let now = self.arena.now();
        while let Ok(notification) = self.notifications.try_recv() {
            if self.config.log_notifications {
                debug!(?notification, "notification");
            }
            match notification {
                CombatNotification::Died { actor, killer } => {
                    self.summary.deaths += 1;
                    if Some(actor) == self.player {
                        self.summary.player_deaths += 1;
                        self.countdown.start(now, self.config.player_respawn_delay);
                        info!(
                            killer = ?killer,
                            respawn_in = self.config.player_respawn_delay,
                            "Player down"
                        );
                    }
                },
                CombatNotification::Respawned { .. } => self.summary.respawns += 1,
                _ => {},
            }
        }
    }
}

/// Walks the player to the nearest living enemy and punches when in reach.
fn autopilot(arena: &Arena, player: ActorId) -> Option<ActorInput> {
    let me = arena.actor(player)?;
    if !me.is_alive() {
        return None;
    }

    let target = arena
        .roster()
        .iter()
        .filter(|a| a.kind() != ActorKind::Player && a.is_alive())
        .min_by(|a, b| {
            let da = me.position.distance_squared(a.position);
            let db = me.position.distance_squared(b.position);
            da.total_cmp(&db)
        })
        .map(Actor::attacker_info)?;

    let offset = flatten(target.position - me.position);
    let reach = me.config().attack_range * 0.8;
    if offset.length() <= reach {
        return Some(ActorInput::IDLE.with_attack());
    }

    let direction = offset.normalize_or_zero();
    Some(ActorInput {
        movement: Vec2::new(direction.x, direction.z),
        ..ActorInput::IDLE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpawnEntry;

    fn short_config() -> SimConfig {
        SimConfig {
            duration_secs: 5.0,
            roster: vec![
                SpawnEntry::new(ActorKind::Player, [0.0, 0.0, 0.0]),
                SpawnEntry::new(ActorKind::StationaryEnemy, [3.0, 0.0, 0.0]),
            ],
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_autopilot_beats_dummy() {
        let summary = Skirmish::new(short_config())
            .and_then(Skirmish::run)
            .expect("run");
        assert_eq!(summary.ticks, 300);
        assert!(summary.attacks_landed >= 5);
        assert!(summary.deaths >= 1);
        assert_eq!(summary.player_deaths, 0);
    }

    #[test]
    fn test_player_respawned_after_countdown() {
        let mut config = short_config();
        config.autopilot = false;
        config.player_respawn_delay = 1.0;
        let mut skirmish = Skirmish::new(config).expect("skirmish");
        let player = skirmish.player().expect("player");

        skirmish.arena.damage(player, 1000, None).expect("damage");
        skirmish.tick().expect("tick");
        assert_eq!(skirmish.summary.player_deaths, 1);

        for _ in 0..30 {
            skirmish.tick().expect("tick");
        }
        assert!(skirmish
            .arena()
            .actor(player)
            .is_some_and(|p| !p.is_alive()));

        for _ in 0..40 {
            skirmish.tick().expect("tick");
        }
        assert!(skirmish.arena().actor(player).is_some_and(Actor::is_alive));
        assert_eq!(skirmish.summary.respawns, 1);
    }

    #[test]
    fn test_no_player_roster() {
        let config = SimConfig {
            duration_secs: 1.0,
            roster: vec![SpawnEntry::new(ActorKind::ChasingEnemy, [0.0, 0.0, 0.0])],
            ..SimConfig::default()
        };
        let summary = Skirmish::new(config)
            .and_then(Skirmish::run)
            .expect("run");
        assert_eq!(summary.attacks_landed, 0);
    }

    #[test]
    fn test_invalid_roster_entry_fails() {
        let mut config = short_config();
        config.roster[1].config = Some(
            scuffle_gameplay::ActorConfig::for_kind(ActorKind::StationaryEnemy).with_max_hp(0),
        );
        assert!(Skirmish::new(config).is_err());
    }
}
