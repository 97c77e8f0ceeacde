//! Connectivity lifecycle event bus.
//!
//! An explicitly constructed, explicitly owned publish/subscribe channel:
//! the composition root creates one bus, hands it to the service, and any
//! number of listeners subscribe for lifecycle events. Publishing never
//! blocks on slow consumers; each subscriber owns an unbounded queue and
//! observes events in publish order. A subscriber that has gone away is
//! pruned on the next publish without disturbing delivery to the others.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::RwLock;

use log::debug;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::ConnectivityEvent;

/// Identifies one subscription on an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Receiving end of a subscription.
///
/// Dropping the subscription detaches it implicitly (the bus prunes it on
/// the next publish); [`EventBus::unsubscribe`] detaches it explicitly.
pub struct Subscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<ConnectivityEvent>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once the bus side is gone and the queue is drained.
    pub async fn recv(&mut self) -> Option<ConnectivityEvent> {
        self.rx.recv().await
    }

    /// Non-blocking variant of [`recv`](Subscription::recv).
    pub fn try_recv(&mut self) -> Option<ConnectivityEvent> {
        self.rx.try_recv().ok()
    }
}

/// Process-wide (but explicitly owned) lifecycle event channel.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<SubscriptionId, mpsc::UnboundedSender<ConnectivityEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = SubscriptionId(Uuid::new_v4());
        self.write_subscribers().insert(id, tx);
        debug!("Subscriber {id} attached");
        Subscription { id, rx }
    }

    /// Detaches a subscriber; unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if self.write_subscribers().remove(&id).is_some() {
            debug!("Subscriber {id} detached");
        }
    }

    /// Number of currently attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.read_subscribers().len()
    }

    /// Delivers `event` to every attached subscriber.
    ///
    /// Fire-and-forget: never blocks on a consumer. Subscribers whose
    /// receiver was dropped are pruned here; delivery to the remaining
    /// subscribers is unaffected.
    pub fn publish(&self, event: ConnectivityEvent) {
        let mut dead = Vec::new();
        {
            let subscribers = self.read_subscribers();
            for (id, tx) in subscribers.iter() {
                if tx.send(event.clone()).is_err() {
                    dead.push(*id);
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.write_subscribers();
            for id in dead {
                subscribers.remove(&id);
                debug!("Pruned dead subscriber {id}");
            }
        }
    }

    fn read_subscribers(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<SubscriptionId, mpsc::UnboundedSender<ConnectivityEvent>>>
    {
        self.subscribers.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_subscribers(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<SubscriptionId, mpsc::UnboundedSender<ConnectivityEvent>>>
    {
        self.subscribers.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectionState, ConnectivityEvent};

    fn discovery(count: usize) -> ConnectivityEvent {
        ConnectivityEvent::DiscoveryCompleted { count }
    }

    #[test]
    fn subscriber_sees_events_in_publish_order() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        for count in 0..5 {
            bus.publish(discovery(count));
        }

        for count in 0..5 {
            assert_eq!(sub.try_recv(), Some(discovery(count)));
        }
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn every_subscriber_sees_every_event() {
        let bus = EventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        bus.publish(ConnectivityEvent::StateChanged {
            old: ConnectionState::Disconnected,
            new: ConnectionState::Connecting,
        });

        assert!(first.try_recv().is_some());
        assert!(second.try_recv().is_some());
    }

    #[test]
    fn unsubscribed_listener_stops_receiving() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();

        bus.publish(discovery(1));
        bus.unsubscribe(sub.id());
        bus.publish(discovery(2));

        assert_eq!(sub.try_recv(), Some(discovery(1)));
        assert_eq!(sub.try_recv(), None);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn dropped_subscriber_is_pruned_without_disturbing_others() {
        let bus = EventBus::new();
        let dead = bus.subscribe();
        let mut alive = bus.subscribe();
        drop(dead);

        bus.publish(discovery(7));

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(alive.try_recv(), Some(discovery(7)));
    }

    #[test]
    fn unsubscribe_unknown_id_is_ignored() {
        let bus = EventBus::new();
        let sub = bus.subscribe();
        let id = sub.id();
        bus.unsubscribe(id);
        // Second unsubscribe of the same id is a no-op.
        bus.unsubscribe(id);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn recv_returns_none_after_bus_drops() {
        let bus = EventBus::new();
        let mut sub = bus.subscribe();
        bus.publish(discovery(3));
        drop(bus);

        assert_eq!(sub.recv().await, Some(discovery(3)));
        assert_eq!(sub.recv().await, None);
    }

    #[test]
    fn concurrent_publishes_reach_a_live_subscriber() {
        use std::sync::Arc;

        let bus = Arc::new(EventBus::new());
        let mut sub = bus.subscribe();

        let publishers: Vec<_> = (0..4)
            .map(|_| {
                let bus = Arc::clone(&bus);
                std::thread::spawn(move || {
                    for count in 0..25 {
                        bus.publish(discovery(count));
                    }
                })
            })
            .collect();

        for publisher in publishers {
            publisher.join().expect("publisher thread");
        }

        let mut received = 0;
        while sub.try_recv().is_some() {
            received += 1;
        }
        assert_eq!(received, 100);
    }
}
