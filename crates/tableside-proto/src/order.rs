//! Order domain types.
//!
//! An [`OrderLine`] snapshots the dish at order time: later menu edits
//! must not change what the guest agreed to pay, so name, price, and image
//! are captured into the line and never re-resolved.

use serde::{Deserialize, Serialize};

/// Unique identifier of an order line, assigned by the server.
pub type OrderId = u64;

/// Lifecycle status of a single order line.
///
/// The kitchen moves orders `Pending -> Processing -> Delivered`; payment
/// settles them to `Paid`. `Rejected` orders leave the flow entirely and
/// count toward neither aggregate bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Placed by the guest, not yet picked up by the kitchen.
    Pending,
    /// Being prepared.
    Processing,
    /// Served to the table, awaiting payment.
    Delivered,
    /// Settled.
    Paid,
    /// Declined by staff; excluded from all totals.
    Rejected,
}

impl OrderStatus {
    /// True for orders the guest still owes money on.
    #[must_use]
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Pending | Self::Processing | Self::Delivered)
    }

    /// True for orders already settled.
    #[must_use]
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Human-readable label used in guest-facing notifications.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "in preparation",
            Self::Delivered => "delivered",
            Self::Paid => "paid",
            Self::Rejected => "rejected",
        }
    }
}

/// Immutable capture of a dish at the moment it was ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DishSnapshot {
    /// Dish name as shown to the guest.
    pub name: String,
    /// Unit price in minor currency units.
    pub price: i64,
    /// Image URL captured with the dish.
    pub image: String,
}

/// A single line in a guest's order set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Server-assigned unique identifier.
    pub id: OrderId,
    /// Dish capture at order time.
    pub dish_snapshot: DishSnapshot,
    /// Number of servings ordered. Always positive.
    pub quantity: u32,
    /// Current lifecycle status.
    pub status: OrderStatus,
}

impl OrderLine {
    /// Line total in minor units (`price x quantity`).
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.dish_snapshot.price * i64::from(self.quantity)
    }
}

/// Identity of the guest who settled a payment batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerInfo {
    /// Guest display name.
    pub name: String,
    /// Table the guest is seated at.
    pub table_number: u32,
}

/// Push payload announcing that a batch of orders was settled atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    /// The orders settled by this payment, as the server saw them.
    pub orders: Vec<OrderLine>,
    /// Who paid.
    pub payer: PayerInfo,
}
