//! Live order ledger.
//!
//! The ledger is the authoritative local projection of a guest's orders.
//! It is populated by the initial fetch, mutated only by that fetch and by
//! channel events, and it must stay consistent with server truth while
//! the event stream duplicates, drops, and reorders deliveries.
//!
//! # The one invariant that matters
//!
//! Aggregates are always a pure function of the current full order set,
//! never the result of patching a previous aggregate with a delta. A push
//! event may be a duplicate, may arrive after a full refetch already
//! replaced the row, or may race a deletion; incremental math compounds
//! any such divergence permanently, while a full recompute self-heals on
//! the next event or refetch.

use std::collections::HashMap;

use tableside_proto::{ChannelEvent, OrderId, OrderLine, PaymentPayload};

/// Actions produced by the ledger for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerAction {
    /// Show a message to the guest.
    Notify {
        /// Text to display.
        message: String,
    },

    /// Re-pull the full order set from the server.
    Refetch,
}

/// One side of the aggregate: a monetary total and a serving count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bucket {
    /// Sum of `price x quantity` in minor units.
    pub total: i64,
    /// Sum of quantities.
    pub quantity: u32,
}

/// Monetary aggregates over the full order set.
///
/// `outstanding` covers Pending/Processing/Delivered, `settled` covers
/// Paid; Rejected orders contribute to neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    /// Orders the guest still owes money on.
    pub outstanding: Bucket,
    /// Orders already paid.
    pub settled: Bucket,
}

impl Aggregate {
    /// Fold an order set into its aggregate.
    pub fn of<'a, I>(orders: I) -> Self
    where
        I: IntoIterator<Item = &'a OrderLine>,
    {
        let mut aggregate = Self::default();
        for order in orders {
            let bucket = if order.status.is_outstanding() {
                &mut aggregate.outstanding
            } else if order.status.is_settled() {
                &mut aggregate.settled
            } else {
                continue;
            };
            bucket.total += order.line_total();
            bucket.quantity += order.quantity;
        }
        aggregate
    }
}

/// The guest's live order set, keyed by order id.
///
/// Created empty when the order view mounts and discarded when the guest
/// leaves the ordering context. Insertion order is irrelevant for
/// correctness; [`OrderLedger::lines`] sorts by id for display.
#[derive(Debug, Default)]
pub struct OrderLedger {
    orders: HashMap<OrderId, OrderLine>,
    aggregate: Aggregate,
}

impl OrderLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full order set with an initial-fetch result and
    /// recompute.
    ///
    /// The fetch is idempotent and re-invocable; whatever it returns IS
    /// the new ground truth, including the removal of orders the server
    /// no longer reports.
    pub fn sync(&mut self, orders: Vec<OrderLine>) {
        self.orders = orders.into_iter().map(|order| (order.id, order)).collect();
        self.recompute();
    }

    /// Merge one channel event and describe the follow-up effects.
    pub fn handle_event(&mut self, event: &ChannelEvent) -> Vec<LedgerAction> {
        match event {
            ChannelEvent::Connect => {
                tracing::debug!("channel connected");
                Vec::new()
            },
            ChannelEvent::Disconnect { reason } => {
                // Reconnection is the channel's own responsibility.
                tracing::debug!(%reason, "channel disconnected");
                Vec::new()
            },
            ChannelEvent::OrderUpdated(line) => self.apply_order_updated(line),
            ChannelEvent::PaymentCompleted(payload) => Self::apply_payment(payload),
        }
    }

    /// Upsert the authoritative new state of one order, then recompute
    /// from the full set. Safe under duplicates and arbitrary ordering:
    /// the replace is last-write-wins and the recompute never trusts a
    /// delta.
    fn apply_order_updated(&mut self, line: &OrderLine) -> Vec<LedgerAction> {
        let message = format!(
            "{} (x{}) is now {}",
            line.dish_snapshot.name,
            line.quantity,
            line.status.label()
        );

        self.orders.insert(line.id, line.clone());
        self.recompute();

        vec![LedgerAction::Notify { message }]
    }

    /// A payment settles N orders atomically server-side. The pushed
    /// batch is NOT merged locally: if our view was already stale, trusting
    /// it to match local ids would bake the drift in permanently. Announce
    /// the settlement, then re-establish ground truth with a full re-pull.
    fn apply_payment(payload: &PaymentPayload) -> Vec<LedgerAction> {
        tracing::debug!(orders = payload.orders.len(), "payment settled; requesting resync");
        let message = format!(
            "{} at table {} paid {} order(s)",
            payload.payer.name,
            payload.payer.table_number,
            payload.orders.len()
        );

        vec![LedgerAction::Notify { message }, LedgerAction::Refetch]
    }

    fn recompute(&mut self) {
        self.aggregate = Aggregate::of(self.orders.values());
    }

    /// Current aggregates. Always consistent with [`OrderLedger::lines`].
    #[must_use]
    pub fn aggregate(&self) -> Aggregate {
        self.aggregate
    }

    /// Order lines sorted by id, for display.
    #[must_use]
    pub fn lines(&self) -> Vec<&OrderLine> {
        let mut lines: Vec<&OrderLine> = self.orders.values().collect();
        lines.sort_by_key(|line| line.id);
        lines
    }

    /// Look up one order by id.
    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&OrderLine> {
        self.orders.get(&id)
    }

    /// Number of orders in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Whether the ledger holds no orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
