//! World state for scenario execution.
//!
//! The final application and driver state after a scenario run, with
//! helpers the oracles assert against.

use tableside_app::{App, Route};
use tableside_core::{bootstrap::BootstrapState, ledger::Aggregate};

use crate::sim_driver::SimDriver;

/// Final state of a scenario run.
#[derive(Debug)]
pub struct World {
    app: App,
    driver: SimDriver,
}

impl World {
    pub(crate) fn new(app: App, driver: SimDriver) -> Self {
        Self { app, driver }
    }

    /// The application state.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// The scripted driver with its recorded calls.
    #[must_use]
    pub fn driver(&self) -> &SimDriver {
        &self.driver
    }

    /// How many times the credential exchange was called.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.driver.persist_calls().len()
    }

    /// How many times the order fetch was called.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.driver.fetch_calls()
    }

    /// Every message shown to the user, in order.
    #[must_use]
    pub fn notifications(&self) -> &[String] {
        self.driver.notifications()
    }

    /// Every navigation, in order.
    #[must_use]
    pub fn navigations(&self) -> &[Route] {
        self.driver.navigations()
    }

    /// Token the channel was opened with, if it was opened.
    #[must_use]
    pub fn channel_opened_with(&self) -> Option<&str> {
        self.driver.channel_opened_with()
    }

    /// Whether a session was committed.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.app.session().is_authenticated()
    }

    /// Final bootstrap state.
    #[must_use]
    pub fn bootstrap_state(&self) -> BootstrapState {
        self.app.bootstrap_state()
    }

    /// Final ledger aggregate.
    #[must_use]
    pub fn aggregate(&self) -> Aggregate {
        self.app.ledger().aggregate()
    }
}
