//! Generic orchestration loop.
//!
//! The [`Runtime`] owns an [`App`] and a [`Driver`] and interprets the
//! actions the state machines produce. The same loop runs under the
//! production frontend and the simulation harness.

use std::collections::VecDeque;

use tableside_core::{
    bootstrap::CredentialRedirect,
    error::BootstrapError,
};

use crate::{action::AppAction, app::App, driver::Driver};

/// Runtime tunables.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Notice shown when an order fetch fails.
    pub fetch_failure_notice: String,
    /// Notice shown when the channel cannot be opened.
    pub channel_failure_notice: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fetch_failure_notice: "Could not refresh your orders. Pull to retry.".to_string(),
            channel_failure_notice: "Live updates are unavailable right now.".to_string(),
        }
    }
}

/// Generic orchestration runtime.
///
/// Single logical thread of control: actions are drained in order from a
/// work queue, and the only suspension points are the driver's exchange
/// and fetch calls.
#[derive(Debug)]
pub struct Runtime<D: Driver> {
    app: App,
    driver: D,
    config: RuntimeConfig,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime over an app and a driver.
    pub fn new(app: App, driver: D) -> Self {
        Self::with_config(app, driver, RuntimeConfig::default())
    }

    /// Create a runtime with explicit tunables.
    pub fn with_config(app: App, driver: D, config: RuntimeConfig) -> Self {
        Self { app, driver, config }
    }

    /// Run one firing of the login redirect through bootstrap.
    ///
    /// Safe to call repeatedly with the same redirect: the bootstrap
    /// latch makes every call after the first a no-op.
    ///
    /// # Errors
    ///
    /// Propagates [`BootstrapError`] if the machine rejects a
    /// continuation, which indicates a runtime bug rather than a user-visible
    /// failure.
    pub async fn handle_redirect(
        &mut self,
        redirect: &CredentialRedirect,
    ) -> Result<(), BootstrapError> {
        let actions = self.app.handle_redirect(redirect);
        self.execute_all(actions).await
    }

    /// Pump channel events until the channel closes, then stop the
    /// driver.
    ///
    /// # Errors
    ///
    /// Propagates [`BootstrapError`] from action execution (see
    /// [`Runtime::handle_redirect`]).
    pub async fn pump_events(&mut self) -> Result<(), BootstrapError> {
        while let Some(event) = self.driver.next_event().await {
            let actions = self.app.handle_channel_event(&event);
            self.execute_all(actions).await?;
        }
        self.driver.stop();
        Ok(())
    }

    /// Bootstrap from a redirect, then pump events to completion.
    ///
    /// # Errors
    ///
    /// Propagates [`BootstrapError`] from action execution.
    pub async fn run(&mut self, redirect: &CredentialRedirect) -> Result<(), BootstrapError> {
        self.handle_redirect(redirect).await?;
        self.pump_events().await
    }

    /// Drain an action list, including the follow-up actions that
    /// boundary calls produce.
    ///
    /// Uses an explicit work queue instead of recursion: the exchange
    /// continuation pushes its follow-ups to the front so they execute
    /// in order before anything queued behind them.
    async fn execute_all(&mut self, actions: Vec<AppAction>) -> Result<(), BootstrapError> {
        let mut queue: VecDeque<AppAction> = actions.into();

        while let Some(action) = queue.pop_front() {
            match action {
                AppAction::Exchange { access_token, refresh_token } => {
                    let outcome =
                        self.driver.persist_session(&access_token, &refresh_token).await;
                    let follow_ups = match outcome {
                        Ok(()) => self.app.exchange_succeeded()?,
                        Err(error) => self.app.exchange_failed(&error)?,
                    };
                    for follow_up in follow_ups.into_iter().rev() {
                        queue.push_front(follow_up);
                    }
                },

                AppAction::CommitSession(session) => self.app.commit_session(session),

                AppAction::OpenChannel { access_token } => {
                    match self.driver.open_channel(&access_token).await {
                        Ok(()) => {
                            self.app.attach_ledger();
                            // The ledger view starts from an initial fetch;
                            // channel events only ever patch on top of it.
                            queue.push_back(AppAction::Refetch);
                        },
                        Err(error) => {
                            // Channel transport errors degrade to a notice;
                            // reconnection beyond that is the channel's own
                            // policy once it is up.
                            tracing::warn!(%error, "channel open failed");
                            self.driver.notify(&self.config.channel_failure_notice);
                        },
                    }
                },

                AppAction::PublishRole(role) => self.app.publish_role(role),

                AppAction::Navigate(role) => {
                    self.app.navigate(role);
                    self.driver.navigate(self.app.route());
                },

                AppAction::Notify { message } => self.driver.notify(&message),

                AppAction::Refetch => match self.driver.list_orders().await {
                    Ok(orders) => self.app.sync_orders(orders),
                    Err(error) => {
                        tracing::warn!(%error, "order fetch failed");
                        self.driver.notify(&self.config.fetch_failure_notice);
                    },
                },
            }
        }

        Ok(())
    }

    /// The application state.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The driver.
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Split the runtime back into its parts, e.g. for oracle
    /// inspection after a scenario run.
    #[must_use]
    pub fn into_parts(self) -> (App, D) {
        (self.app, self.driver)
    }
}
