//! Push events delivered over the live channel.

use serde::{Deserialize, Serialize};

use crate::{
    frame::Opcode,
    order::{OrderLine, PaymentPayload},
};

/// A named event delivered by the push channel.
///
/// Delivery is at-least-once at best: consumers must tolerate duplicates,
/// reordering across order ids, and gaps. The ledger's full-replace merge
/// policy is written against exactly this contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChannelEvent {
    /// Channel (re)established. Lifecycle only, no order data.
    Connect,
    /// Channel lost. The channel reconnects on its own; consumers do not
    /// react beyond diagnostics.
    Disconnect {
        /// Transport-provided reason, for diagnostics.
        reason: String,
    },
    /// Authoritative new state of a single order line.
    OrderUpdated(OrderLine),
    /// A batch of orders was settled atomically.
    PaymentCompleted(PaymentPayload),
}

impl ChannelEvent {
    /// The topic this event is published under.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::Connect => EventTopic::Connect,
            Self::Disconnect { .. } => EventTopic::Disconnect,
            Self::OrderUpdated(_) => EventTopic::OrderUpdated,
            Self::PaymentCompleted(_) => EventTopic::PaymentCompleted,
        }
    }

    /// Wire opcode for this event.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Connect => Opcode::Connect,
            Self::Disconnect { .. } => Opcode::Disconnect,
            Self::OrderUpdated(_) => Opcode::OrderUpdated,
            Self::PaymentCompleted(_) => Opcode::PaymentCompleted,
        }
    }
}

/// Topic discriminant used for subscription routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    /// `connect` lifecycle events.
    Connect,
    /// `disconnect` lifecycle events.
    Disconnect,
    /// `order-updated` events.
    OrderUpdated,
    /// `payment-completed` events.
    PaymentCompleted,
}

impl EventTopic {
    /// Every topic, in wire-opcode order.
    pub const ALL: [Self; 4] =
        [Self::Connect, Self::Disconnect, Self::OrderUpdated, Self::PaymentCompleted];
}
