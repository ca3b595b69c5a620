//! Tableside protocol core logic
//!
//! Pure state machine logic for the guest ordering client, completely
//! decoupled from I/O. This enables deterministic testing of the two
//! stateful protocols that must survive retries, duplicate invocations,
//! and out-of-order push delivery: session bootstrap and the live order
//! ledger.
//!
//! # Architecture
//!
//! State transitions produce declarative actions that describe intended
//! effects rather than executing them directly. A runtime or test harness
//! is responsible for interpreting and executing these actions: the
//! credential exchange, the order fetch, and the notification sink are
//! all collaborators behind the driver boundary.
//!
//! Everything in this crate runs on a single logical thread of control.
//! Handlers execute to completion; suspension happens only at the driver
//! boundary, so ledger and bootstrap state need no internal locking.
//!
//! # Components
//!
//! - [`bootstrap`]: One-shot session bootstrap state machine
//! - [`claims`]: Unverified role-claim decoding
//! - [`channel`]: Event channel contract and subscription registry
//! - [`connection`]: Channel lifecycle (heartbeat, idle timeout, reconnect)
//! - [`ledger`]: Live order ledger and aggregate derivation
//! - [`session`]: Session state owned by the application root
//! - [`error`]: Error taxonomy

pub mod bootstrap;
pub mod channel;
pub mod claims;
pub mod connection;
pub mod error;
pub mod ledger;
pub mod session;
