//! Application layer for the tableside ordering client
//!
//! Pure state machines and a generic runtime for bootstrap and ledger
//! orchestration, enabling deterministic simulation testing with the same
//! code that runs in production.
//!
//! # Components
//!
//! - [`App`]: Root application state (session, role, ledger, subscriptions)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

mod action;
mod app;
mod driver;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use driver::Driver;
pub use runtime::{Runtime, RuntimeConfig};
pub use state::Route;
