//! Event channel contract and subscription registry.
//!
//! The channel is a reconnecting duplex push transport delivering named
//! events. Callers never assume exactly-once delivery: duplicates, gaps,
//! and reordering across order ids are all tolerated by the ledger's merge
//! policy. Reconnection is the channel's own responsibility and surfaces
//! to subscribers only as `disconnect`/`connect` lifecycle events.

use async_trait::async_trait;
use tableside_proto::{ChannelEvent, EventTopic};

use crate::error::ChannelError;

/// Abstract push channel.
///
/// Production backs this with a network transport; tests use a scripted
/// in-memory implementation. At most one live channel exists per session:
/// the only place one is opened is the single `Exchanging ->
/// Authenticated` bootstrap transition.
#[async_trait]
pub trait EventChannel: Send {
    /// Establish the channel, authenticating with the access token.
    ///
    /// # Errors
    ///
    /// Returns [`ChannelError::Transport`] if the channel cannot be
    /// established.
    async fn open(&mut self, access_token: &str) -> Result<(), ChannelError>;

    /// Await the next event.
    ///
    /// Events delivered while the consumer is suspended at a boundary
    /// call are queued, not dropped. Returns `None` once the channel is
    /// permanently closed.
    async fn next_event(&mut self) -> Option<ChannelEvent>;

    /// Tear the channel down. Idempotent.
    fn close(&mut self);
}

/// Stable identity of an event consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

/// Disposable proof of one `(topic, subscriber)` registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionHandle {
    topic: EventTopic,
    subscriber: SubscriberId,
}

impl SubscriptionHandle {
    /// Topic this handle is registered under.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.topic
    }

    /// Subscriber this handle belongs to.
    #[must_use]
    pub fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }
}

/// Identity-keyed subscription registry.
///
/// Registration is keyed on `(topic, subscriber)`: subscribing the same
/// pair again replaces the existing registration instead of adding a
/// second one, so a subscriber can never receive one event twice through
/// this registry.
#[derive(Debug, Default)]
pub struct Subscriptions {
    /// Registration order is kept per topic so fan-out is deterministic.
    entries: Vec<(EventTopic, SubscriberId)>,
}

impl Subscriptions {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `subscriber` for `topic`, replacing any existing
    /// registration of the same pair.
    pub fn subscribe(&mut self, topic: EventTopic, subscriber: SubscriberId) -> SubscriptionHandle {
        let handle = SubscriptionHandle { topic, subscriber };
        if !self.entries.contains(&(topic, subscriber)) {
            self.entries.push((topic, subscriber));
        }
        handle
    }

    /// Remove the registration named by `handle`. Returns whether it was
    /// present. Unsubscribing an absent handle is harmless.
    pub fn unsubscribe(&mut self, handle: &SubscriptionHandle) -> bool {
        let key = (handle.topic, handle.subscriber);
        let before = self.entries.len();
        self.entries.retain(|entry| *entry != key);
        before != self.entries.len()
    }

    /// Subscribers registered for `topic`, in registration order.
    #[must_use]
    pub fn subscribers(&self, topic: EventTopic) -> Vec<SubscriberId> {
        self.entries
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, subscriber)| *subscriber)
            .collect()
    }

    /// Subscribers an event fans out to.
    #[must_use]
    pub fn route(&self, event: &ChannelEvent) -> Vec<SubscriberId> {
        self.subscribers(event.topic())
    }

    /// Total number of live registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The ledger's own subscription set: all four topics under one
/// subscriber identity.
///
/// (Re)attachment always unregisters every topic handler before
/// re-registering it. Skipping that step on a re-subscribe is the classic
/// way to apply every subsequent event twice and silently double the
/// aggregates; owning the handles in one place makes the discipline
/// structural.
#[derive(Debug)]
pub struct LedgerSubscription {
    subscriber: SubscriberId,
    handles: Vec<SubscriptionHandle>,
}

impl LedgerSubscription {
    /// Register `subscriber` for all four topics, dropping any prior
    /// registrations it held.
    pub fn attach(registry: &mut Subscriptions, subscriber: SubscriberId) -> Self {
        let mut subscription = Self { subscriber, handles: Vec::new() };
        subscription.resubscribe(registry);
        subscription
    }

    /// Unregister-all-then-re-register, under the same identity.
    pub fn resubscribe(&mut self, registry: &mut Subscriptions) {
        self.detach(registry);
        self.handles = EventTopic::ALL
            .iter()
            .map(|&topic| registry.subscribe(topic, self.subscriber))
            .collect();
    }

    /// Unregister every handler owned by this subscription.
    pub fn detach(&mut self, registry: &mut Subscriptions) {
        for handle in self.handles.drain(..) {
            registry.unsubscribe(&handle);
        }
    }

    /// The identity this subscription registers under.
    #[must_use]
    pub fn subscriber(&self) -> SubscriberId {
        self.subscriber
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEDGER: SubscriberId = SubscriberId(1);

    #[test]
    fn duplicate_subscribe_does_not_double_register() {
        let mut registry = Subscriptions::new();

        registry.subscribe(EventTopic::OrderUpdated, LEDGER);
        registry.subscribe(EventTopic::OrderUpdated, LEDGER);

        assert_eq!(registry.subscribers(EventTopic::OrderUpdated), vec![LEDGER]);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let mut registry = Subscriptions::new();
        let handle = registry.subscribe(EventTopic::Connect, LEDGER);

        assert!(registry.unsubscribe(&handle));
        assert!(!registry.unsubscribe(&handle));
        assert!(registry.is_empty());
    }

    #[test]
    fn route_matches_topic_only() {
        let mut registry = Subscriptions::new();
        registry.subscribe(EventTopic::PaymentCompleted, LEDGER);

        assert!(registry.route(&ChannelEvent::Connect).is_empty());
        assert_eq!(
            registry.route(&ChannelEvent::PaymentCompleted(tableside_proto::PaymentPayload {
                orders: Vec::new(),
                payer: tableside_proto::PayerInfo { name: "An".into(), table_number: 4 },
            })),
            vec![LEDGER]
        );
    }

    #[test]
    fn ledger_subscription_covers_all_topics_once() {
        let mut registry = Subscriptions::new();
        let _subscription = LedgerSubscription::attach(&mut registry, LEDGER);

        assert_eq!(registry.len(), EventTopic::ALL.len());
        for topic in EventTopic::ALL {
            assert_eq!(registry.subscribers(topic), vec![LEDGER]);
        }
    }

    #[test]
    fn resubscribe_never_doubles_delivery() {
        let mut registry = Subscriptions::new();
        let mut subscription = LedgerSubscription::attach(&mut registry, LEDGER);

        subscription.resubscribe(&mut registry);
        subscription.resubscribe(&mut registry);

        for topic in EventTopic::ALL {
            assert_eq!(registry.subscribers(topic).len(), 1, "{topic:?} double-registered");
        }
    }

    #[test]
    fn detach_removes_everything() {
        let mut registry = Subscriptions::new();
        let mut subscription = LedgerSubscription::attach(&mut registry, LEDGER);

        subscription.detach(&mut registry);
        assert!(registry.is_empty());
    }
}
