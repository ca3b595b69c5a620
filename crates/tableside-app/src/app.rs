//! Root application state.

use tableside_core::{
    bootstrap::{BootstrapState, CredentialRedirect, SessionBootstrap},
    channel::{LedgerSubscription, SubscriberId, Subscriptions},
    error::{BootstrapError, ExchangeError},
    ledger::OrderLedger,
    session::{Session, SessionCell},
};
use tableside_proto::{ChannelEvent, Role};

use crate::{action::AppAction, state::Route};

/// Subscriber identity the ledger registers under.
const LEDGER_SUBSCRIBER: SubscriberId = SubscriberId(1);

/// Root application state.
///
/// Owns the session cell, the published role, the bootstrap machine, the
/// order ledger, and the ledger's channel subscription: the whole of the
/// mutable state of the core, threaded explicitly instead of living in
/// ambient globals.
///
/// Runs on a single logical thread of control: every handler executes to
/// completion, and each mutation is immediately followed by its derived
/// recompute, so no intermediate state is ever observable.
#[derive(Debug)]
pub struct App {
    session: SessionCell,
    role: Option<Role>,
    route: Route,
    bootstrap: SessionBootstrap,
    ledger: OrderLedger,
    subscriptions: Subscriptions,
    ledger_subscription: Option<LedgerSubscription>,
}

impl App {
    /// Create a pre-authenticated application.
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: SessionCell::new(),
            role: None,
            route: Route::Login,
            bootstrap: SessionBootstrap::new(),
            ledger: OrderLedger::new(),
            subscriptions: Subscriptions::new(),
            ledger_subscription: None,
        }
    }

    // ---- bootstrap ----

    /// Feed one firing of the login redirect to the bootstrap machine.
    pub fn handle_redirect(&mut self, redirect: &CredentialRedirect) -> Vec<AppAction> {
        self.bootstrap.handle_redirect(redirect).into_iter().map(AppAction::from).collect()
    }

    /// Feed in a successful exchange outcome.
    ///
    /// # Errors
    ///
    /// Propagates [`BootstrapError::InvalidState`] if no exchange is in
    /// flight.
    pub fn exchange_succeeded(&mut self) -> Result<Vec<AppAction>, BootstrapError> {
        Ok(self.bootstrap.exchange_succeeded()?.into_iter().map(AppAction::from).collect())
    }

    /// Feed in a failed exchange outcome.
    ///
    /// # Errors
    ///
    /// Propagates [`BootstrapError::InvalidState`] if no exchange is in
    /// flight.
    pub fn exchange_failed(
        &mut self,
        error: &ExchangeError,
    ) -> Result<Vec<AppAction>, BootstrapError> {
        Ok(self.bootstrap.exchange_failed(error)?.into_iter().map(AppAction::from).collect())
    }

    /// Commit the exchanged session.
    pub fn commit_session(&mut self, session: Session) {
        self.session.commit(session);
    }

    /// Publish the decoded role.
    pub fn publish_role(&mut self, role: Role) {
        self.role = Some(role);
    }

    /// Move to the authenticated area for `role`.
    pub fn navigate(&mut self, role: Role) {
        self.route = Route::for_role(role);
    }

    // ---- ledger & channel ----

    /// Register the ledger's four topic handlers on the channel.
    ///
    /// Called when the channel opens, and again on every reconnect-driven
    /// re-subscription; attachment always goes through the
    /// unregister-then-register discipline, so attaching twice delivers
    /// events once.
    pub fn attach_ledger(&mut self) {
        match self.ledger_subscription.as_mut() {
            Some(subscription) => subscription.resubscribe(&mut self.subscriptions),
            None => {
                self.ledger_subscription =
                    Some(LedgerSubscription::attach(&mut self.subscriptions, LEDGER_SUBSCRIBER));
            },
        }
    }

    /// Unregister the ledger's handlers and discard its content, e.g.
    /// when the guest leaves the ordering context.
    pub fn detach_ledger(&mut self) {
        if let Some(mut subscription) = self.ledger_subscription.take() {
            subscription.detach(&mut self.subscriptions);
        }
        self.ledger = OrderLedger::new();
    }

    /// Fan one channel event out to its subscribers.
    ///
    /// Each registration is exactly one delivery; the identity-keyed
    /// registry guarantees the ledger holds at most one.
    pub fn handle_channel_event(&mut self, event: &ChannelEvent) -> Vec<AppAction> {
        let deliveries = self.subscriptions.route(event);
        let mut actions = Vec::new();
        for subscriber in deliveries {
            debug_assert_eq!(subscriber, LEDGER_SUBSCRIBER);
            actions.extend(self.ledger.handle_event(event).into_iter().map(AppAction::from));
        }
        actions
    }

    /// Replace the ledger content with a fetch result.
    pub fn sync_orders(&mut self, orders: Vec<tableside_proto::OrderLine>) {
        self.ledger.sync(orders);
    }

    // ---- accessors ----

    /// The order ledger.
    #[must_use]
    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    /// The session cell.
    #[must_use]
    pub fn session(&self) -> &SessionCell {
        &self.session
    }

    /// Published role, if bootstrap completed.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Current route.
    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    /// Bootstrap machine state.
    #[must_use]
    pub fn bootstrap_state(&self) -> BootstrapState {
        self.bootstrap.state()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tableside_core::ledger::Bucket;
    use tableside_proto::{DishSnapshot, OrderLine, OrderStatus};

    use super::*;

    fn update(id: u64, price: i64, quantity: u32, status: OrderStatus) -> ChannelEvent {
        ChannelEvent::OrderUpdated(OrderLine {
            id,
            dish_snapshot: DishSnapshot {
                name: format!("dish-{id}"),
                price,
                image: String::new(),
            },
            quantity,
            status,
        })
    }

    #[test]
    fn events_without_subscription_are_ignored() {
        let mut app = App::new();

        let actions = app.handle_channel_event(&update(1, 10, 1, OrderStatus::Pending));

        assert!(actions.is_empty());
        assert!(app.ledger().is_empty());
    }

    #[test]
    fn attached_ledger_receives_each_event_once() {
        let mut app = App::new();
        app.attach_ledger();

        let actions = app.handle_channel_event(&update(1, 10, 2, OrderStatus::Pending));

        assert_eq!(actions.len(), 1); // one notify, not two
        assert_eq!(app.ledger().aggregate().outstanding, Bucket { total: 20, quantity: 2 });
    }

    #[test]
    fn double_attach_still_delivers_once() {
        let mut app = App::new();
        app.attach_ledger();
        app.attach_ledger();

        let actions = app.handle_channel_event(&update(1, 10, 2, OrderStatus::Pending));

        assert_eq!(actions.len(), 1);
        assert_eq!(app.ledger().aggregate().outstanding, Bucket { total: 20, quantity: 2 });
    }

    #[test]
    fn detach_discards_ledger_and_stops_delivery() {
        let mut app = App::new();
        app.attach_ledger();
        app.handle_channel_event(&update(1, 10, 2, OrderStatus::Pending));

        app.detach_ledger();

        assert!(app.ledger().is_empty());
        assert!(app.handle_channel_event(&update(2, 5, 1, OrderStatus::Pending)).is_empty());
    }

    #[test]
    fn navigation_follows_role() {
        let mut app = App::new();
        assert_eq!(app.route(), Route::Login);

        app.navigate(Role::Guest);
        assert_eq!(app.route(), Route::GuestOrders);

        app.navigate(Role::Owner);
        assert_eq!(app.route(), Route::ManageDashboard);
    }
}
