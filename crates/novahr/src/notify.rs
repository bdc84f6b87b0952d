//! Change notification between views sharing one storage area.
//!
//! Writers publish a [`StorageEvent`] after replacing a value; every
//! subscriber receives it in publish order. Publishing is synchronous and
//! never blocks: events sent while nobody is subscribed are dropped, and a
//! subscriber that falls more than [`EVENT_CAPACITY`] events behind is told
//! it lagged and should re-read everything it cares about.

use tokio::sync::broadcast;
use tracing::trace;

/// Number of undelivered events buffered per subscriber.
pub const EVENT_CAPACITY: usize = 64;

/// A change to the storage area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed, or `None` when the whole area was cleared.
    pub key: Option<String>,
    /// The serialized value now stored under `key`, if any.
    pub new_value: Option<String>,
}

impl StorageEvent {
    /// An event for a single key.
    #[must_use]
    pub fn changed(key: impl Into<String>, new_value: Option<String>) -> Self {
        Self {
            key: Some(key.into()),
            new_value,
        }
    }

    /// An event for a cleared storage area.
    #[must_use]
    pub fn cleared() -> Self {
        Self {
            key: None,
            new_value: None,
        }
    }

    /// Whether a view watching `key` must re-read after this event.
    #[must_use]
    pub fn affects(&self, key: &str) -> bool {
        self.key.as_deref().map_or(true, |k| k == key)
    }
}

/// Publish side of the event channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<StorageEvent>,
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Returns the number of subscribers that will see it.
    pub fn publish(&self, event: StorageEvent) -> usize {
        trace!(key = ?event.key, "publishing storage event");
        // An error only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// What a subscription observed since it was last drained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pending {
    /// Events received, in publish order.
    pub events: Vec<StorageEvent>,
    /// Events were lost because the subscriber fell behind.
    pub lagged: bool,
}

impl Pending {
    /// Whether anything observed requires re-reading `key`.
    #[must_use]
    pub fn affects(&self, key: &str) -> bool {
        self.lagged || self.events.iter().any(|e| e.affects(key))
    }
}

/// Receive side of the event channel.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<StorageEvent>,
}

impl Subscription {
    /// Take every event delivered so far without waiting.
    pub fn drain(&mut self) -> Pending {
        let mut pending = Pending::default();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => pending.events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    trace!(skipped, "storage event subscriber lagged");
                    pending.lagged = true;
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => break,
            }
        }
        pending
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the bus is gone. A lag is reported as a
    /// [`StorageEvent::cleared`] event so that the caller re-reads everything.
    pub async fn recv(&mut self) -> Option<StorageEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(broadcast::error::RecvError::Lagged(_)) => Some(StorageEvent::cleared()),
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}
