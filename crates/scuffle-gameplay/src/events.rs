//! Notifications for presentation collaborators.
//!
//! Gameplay code emits [`CombatNotification`]s through a [`NotificationSink`].
//! The [`NotificationHub`] fans them out to per-kind subscribers; emitting
//! with no subscriber registered is a no-op.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scuffle_common::{ActorId, SimTime};

/// Notification emitted by the combat core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatNotification {
    /// Actor's hit points changed
    HealthChanged {
        /// Actor ID
        actor: ActorId,
        /// New hit points
        current: i32,
        /// Maximum hit points
        max: i32,
    },
    /// Actor entered the dead state
    Died {
        /// Actor ID
        actor: ActorId,
        /// Actor that dealt the killing blow (if any)
        killer: Option<ActorId>,
    },
    /// Actor came back to life at its spawn anchor
    Respawned {
        /// Actor ID
        actor: ActorId,
        /// Spawn position
        position: Vec3,
    },
    /// An attack connected with a target
    AttackLanded {
        /// Attacking actor
        attacker: ActorId,
        /// Actor that was hit
        target: ActorId,
        /// Damage dealt
        damage: i32,
        /// Target's world position at the moment of the hit
        position: Vec3,
    },
    /// Actor entered a recoil window
    RecoilStarted {
        /// Actor ID
        actor: ActorId,
        /// End of the window
        until: SimTime,
    },
}

impl CombatNotification {
    /// Returns the kind tag for subscription filtering.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::HealthChanged { .. } => NotificationKind::HealthChanged,
            Self::Died { .. } => NotificationKind::Died,
            Self::Respawned { .. } => NotificationKind::Respawned,
            Self::AttackLanded { .. } => NotificationKind::AttackLanded,
            Self::RecoilStarted { .. } => NotificationKind::RecoilStarted,
        }
    }

    /// Returns the actor the notification is about.
    #[must_use]
    pub const fn actor(&self) -> ActorId {
        match self {
            Self::HealthChanged { actor, .. }
            | Self::Died { actor, .. }
            | Self::Respawned { actor, .. }
            | Self::RecoilStarted { actor, .. } => *actor,
            Self::AttackLanded { target, .. } => *target,
        }
    }
}

/// Kind tag of a [`CombatNotification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// [`CombatNotification::HealthChanged`]
    HealthChanged,
    /// [`CombatNotification::Died`]
    Died,
    /// [`CombatNotification::Respawned`]
    Respawned,
    /// [`CombatNotification::AttackLanded`]
    AttackLanded,
    /// [`CombatNotification::RecoilStarted`]
    RecoilStarted,
}

impl NotificationKind {
    /// Every notification kind.
    pub const ALL: [Self; 5] = [
        Self::HealthChanged,
        Self::Died,
        Self::Respawned,
        Self::AttackLanded,
        Self::RecoilStarted,
    ];
}

/// Destination for notifications.
pub trait NotificationSink {
    /// Emits a notification.
    fn emit(&mut self, notification: CombatNotification);
}

/// Discards everything.
impl NotificationSink for () {
    fn emit(&mut self, _notification: CombatNotification) {}
}

/// Collects notifications in order (useful for tests and batching).
impl NotificationSink for Vec<CombatNotification> {
    fn emit(&mut self, notification: CombatNotification) {
        self.push(notification);
    }
}

/// Typed notification handler.
pub trait NotificationHandler {
    /// Handles a notification.
    fn handle(&mut self, notification: &CombatNotification);

    /// Whether the handler can no longer receive anything. Closed handlers
    /// are unsubscribed by the hub.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<F> NotificationHandler for F
where
    F: FnMut(&CombatNotification),
{
    fn handle(&mut self, notification: &CombatNotification) {
        self(notification);
    }
}

/// Forwards notifications into a bounded channel.
///
/// Sending never blocks; when the channel is full the notification is dropped.
/// Once the receiver is gone the forwarder reports itself closed.
#[derive(Debug)]
struct ChannelForwarder {
    sender: Sender<CombatNotification>,
    disconnected: bool,
}

impl NotificationHandler for ChannelForwarder {
    fn handle(&mut self, notification: &CombatNotification) {
        if let Err(TrySendError::Disconnected(_)) = self.sender.try_send(notification.clone()) {
            self.disconnected = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.disconnected
    }
}

/// Handle returned by [`NotificationHub::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    kind: NotificationKind,
    handler: Box<dyn NotificationHandler>,
}

/// Per-kind subscription registry.
#[derive(Default)]
pub struct NotificationHub {
    /// Registered subscribers, in registration order
    subscriptions: Vec<Subscription>,
    /// Next subscription ID
    next_id: u64,
    /// Total notifications emitted (delivered or not)
    emitted: u64,
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub")
            .field("subscribers", &self.subscriptions.len())
            .field("emitted", &self.emitted)
            .finish()
    }
}

impl NotificationHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for one notification kind.
    pub fn subscribe(
        &mut self,
        kind: NotificationKind,
        handler: impl NotificationHandler + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            kind,
            handler: Box::new(handler),
        });
        id
    }

    /// Subscribes a bounded channel to the given kinds and returns its receiver.
    pub fn subscribe_channel(
        &mut self,
        kinds: &[NotificationKind],
        capacity: usize,
    ) -> Receiver<CombatNotification> {
        let (sender, receiver) = bounded(capacity);
        for &kind in kinds {
            self.subscribe(
                kind,
                ChannelForwarder {
                    sender: sender.clone(),
                    disconnected: false,
                },
            );
        }
        receiver
    }

    /// Removes a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of subscribers for a kind.
    #[must_use]
    pub fn subscriber_count(&self, kind: NotificationKind) -> usize {
        self.subscriptions.iter().filter(|s| s.kind == kind).count()
    }

    /// Total notifications emitted through this hub.
    #[must_use]
    pub const fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl NotificationSink for NotificationHub {
    fn emit(&mut self, notification: CombatNotification) {
        self.emitted += 1;
        let kind = notification.kind();
        let mut closed = false;
        for sub in self.subscriptions.iter_mut().filter(|s| s.kind == kind) {
            sub.handler.handle(&notification);
            closed |= sub.handler.is_closed();
        }
        if closed {
            self.subscriptions.retain(|s| !s.handler.is_closed());
            debug!(?kind, "dropped closed subscriptions");
        }
    }
}
