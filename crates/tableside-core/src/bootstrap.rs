//! Session bootstrap state machine.
//!
//! Consumes the credential pair delivered by the login redirect, exchanges
//! it for an application session, and opens the live event channel: at
//! most once, no matter how many times the triggering event fires.
//!
//! # Architecture: Action-Based State Machine
//!
//! This state machine follows the action pattern:
//! - Methods return lists of [`BootstrapAction`] describing intended
//!   effects
//! - Driver code executes actions (call the exchange, commit the session,
//!   open the channel, notify the user)
//! - Continuations ([`SessionBootstrap::exchange_succeeded`] /
//!   [`SessionBootstrap::exchange_failed`]) feed the exchange outcome back
//!   in
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐  valid pair   ┌────────────┐  exchange ok   ┌───────────────┐
//! │ Idle │──────────────>│ Exchanging │───────────────>│ Authenticated │
//! └──────┘               └────────────┘                └───────────────┘
//!     │                        │
//!     │ missing tokens /       │ exchange failed
//!     │ undecodable claim      ↓
//!     │                   ┌────────┐
//!     └──────────────────>│ Failed │
//!                         └────────┘
//! ```
//!
//! `Authenticated` and `Failed` are terminal.
//!
//! # The guard latch
//!
//! The redirect that delivers credentials is not guaranteed to fire
//! exactly once: re-entrant scheduling and parameter-identity retriggers
//! can replay it. The exchange is NOT safely idempotent from our side (it
//! may rotate refresh tokens server-side), so the state field doubles as a
//! one-shot latch: only an `Idle` machine reacts to a redirect, and the
//! transition out of `Idle` happens before any effect is described.
//! Everything runs on the single control thread, so check-and-set is
//! atomic with respect to handler execution.

use tableside_proto::Role;

use crate::{
    claims::decode_role,
    error::{BootstrapError, ExchangeError},
    session::Session,
};

/// Notification text used when neither the redirect nor the exchange
/// supplied a message.
pub const DEFAULT_FAILURE_NOTICE: &str = "Something went wrong. Please sign in again.";

/// Credentials delivered by the out-of-band login redirect.
///
/// Absence of both tokens is an expected input: it means authentication
/// already failed upstream and we only have a message to show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRedirect {
    /// Access token issued by the authority.
    pub access_token: Option<String>,
    /// Refresh token paired with it.
    pub refresh_token: Option<String>,
    /// Optional failure message from the authority.
    pub message: Option<String>,
}

/// Actions produced by the bootstrap state machine.
///
/// The driver executes these in order. Each appears at most once over the
/// life of a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapAction {
    /// Call the external credential exchange.
    Exchange {
        /// Access token to exchange.
        access_token: String,
        /// Refresh token to exchange.
        refresh_token: String,
    },

    /// Commit the session to the root session cell.
    CommitSession(Session),

    /// Open the live event channel, keyed by the access token.
    OpenChannel {
        /// Token the channel authenticates with.
        access_token: String,
    },

    /// Publish the decoded role to the rest of the application.
    PublishRole(Role),

    /// Navigate to the authenticated area for this role.
    Navigate(Role),

    /// Show a message to the user.
    Notify {
        /// Text to display.
        message: String,
    },
}

/// Bootstrap lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// No redirect observed yet.
    Idle,
    /// Exchange issued, awaiting its outcome.
    Exchanging,
    /// Session committed and channel opened. Terminal.
    Authenticated,
    /// Bootstrap failed; user was notified once. Terminal.
    Failed,
}

/// One-shot session bootstrap.
///
/// Pure state machine: no I/O, no stored environment. The embedded
/// [`BootstrapState`] is the guard latch described in the module docs.
#[derive(Debug, Clone)]
pub struct SessionBootstrap {
    state: BootstrapState,
    /// Session assembled at redirect time, committed only on exchange
    /// success. `Some` exactly while `Exchanging`.
    pending: Option<Session>,
}

impl SessionBootstrap {
    /// Create a machine in `Idle`.
    #[must_use]
    pub fn new() -> Self {
        Self { state: BootstrapState::Idle, pending: None }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Handle one firing of the credential redirect.
    ///
    /// Only the first observation has any effect; later firings return no
    /// actions. With a valid pair this decodes the role and describes the
    /// exchange call; with tokens missing it takes the failure path and
    /// describes exactly one notification.
    pub fn handle_redirect(&mut self, redirect: &CredentialRedirect) -> Vec<BootstrapAction> {
        if self.state != BootstrapState::Idle {
            tracing::debug!(state = ?self.state, "redirect retriggered after latch; ignoring");
            return Vec::new();
        }

        let (Some(access_token), Some(refresh_token)) =
            (redirect.access_token.clone(), redirect.refresh_token.clone())
        else {
            self.state = BootstrapState::Failed;
            let message =
                redirect.message.clone().unwrap_or_else(|| DEFAULT_FAILURE_NOTICE.to_string());
            return vec![BootstrapAction::Notify { message }];
        };

        match decode_role(&access_token) {
            Ok(role) => {
                self.pending = Some(Session {
                    access_token: access_token.clone(),
                    refresh_token: refresh_token.clone(),
                    role,
                });
                self.state = BootstrapState::Exchanging;
                vec![BootstrapAction::Exchange { access_token, refresh_token }]
            },
            Err(error) => {
                // Undecodable claim: the token is unusable, so no exchange
                // is attempted. Same terminal path as missing tokens.
                self.state = BootstrapState::Failed;
                vec![BootstrapAction::Notify { message: error.to_string() }]
            },
        }
    }

    /// Feed in a successful exchange outcome.
    ///
    /// Transitions `Exchanging -> Authenticated` and describes the four
    /// commit-side effects, each exactly once: commit session, open
    /// channel, publish role, navigate.
    ///
    /// # Errors
    ///
    /// [`BootstrapError::InvalidState`] outside `Exchanging`.
    pub fn exchange_succeeded(&mut self) -> Result<Vec<BootstrapAction>, BootstrapError> {
        let Some(session) = self.pending.take() else {
            return Err(BootstrapError::InvalidState {
                state: self.state,
                operation: "exchange_succeeded",
            });
        };

        self.state = BootstrapState::Authenticated;
        let role = session.role;
        let access_token = session.access_token.clone();

        Ok(vec![
            BootstrapAction::CommitSession(session),
            BootstrapAction::OpenChannel { access_token },
            BootstrapAction::PublishRole(role),
            BootstrapAction::Navigate(role),
        ])
    }

    /// Feed in a failed exchange outcome.
    ///
    /// Transitions `Exchanging -> Failed`, drops the pending session
    /// uncommitted, and describes exactly one notification carrying the
    /// exchange message (or the default). No channel is opened.
    ///
    /// # Errors
    ///
    /// [`BootstrapError::InvalidState`] outside `Exchanging`.
    pub fn exchange_failed(
        &mut self,
        error: &ExchangeError,
    ) -> Result<Vec<BootstrapAction>, BootstrapError> {
        if self.state != BootstrapState::Exchanging {
            return Err(BootstrapError::InvalidState {
                state: self.state,
                operation: "exchange_failed",
            });
        }

        self.pending = None;
        self.state = BootstrapState::Failed;

        let message =
            error.message.clone().unwrap_or_else(|| DEFAULT_FAILURE_NOTICE.to_string());
        Ok(vec![BootstrapAction::Notify { message }])
    }
}

impl Default for SessionBootstrap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

    use super::*;

    fn guest_token() -> String {
        let claims = URL_SAFE_NO_PAD.encode(br#"{"role":"Guest"}"#);
        format!("h.{claims}.s")
    }

    fn valid_redirect() -> CredentialRedirect {
        CredentialRedirect {
            access_token: Some(guest_token()),
            refresh_token: Some("refresh".into()),
            message: None,
        }
    }

    fn count_exchanges(actions: &[BootstrapAction]) -> usize {
        actions.iter().filter(|a| matches!(a, BootstrapAction::Exchange { .. })).count()
    }

    fn count_notifies(actions: &[BootstrapAction]) -> usize {
        actions.iter().filter(|a| matches!(a, BootstrapAction::Notify { .. })).count()
    }

    #[test]
    fn bootstrap_lifecycle() {
        let mut bootstrap = SessionBootstrap::new();
        assert_eq!(bootstrap.state(), BootstrapState::Idle);

        let actions = bootstrap.handle_redirect(&valid_redirect());
        assert_eq!(bootstrap.state(), BootstrapState::Exchanging);
        assert_eq!(count_exchanges(&actions), 1);

        let actions = bootstrap.exchange_succeeded().unwrap();
        assert_eq!(bootstrap.state(), BootstrapState::Authenticated);
        assert_eq!(actions.len(), 4);
        assert!(matches!(&actions[0], BootstrapAction::CommitSession(s) if s.role == Role::Guest));
        assert!(
            matches!(&actions[1], BootstrapAction::OpenChannel { access_token } if *access_token == guest_token())
        );
        assert_eq!(actions[2], BootstrapAction::PublishRole(Role::Guest));
        assert_eq!(actions[3], BootstrapAction::Navigate(Role::Guest));
    }

    #[test]
    fn repeated_redirects_exchange_exactly_once() {
        let mut bootstrap = SessionBootstrap::new();
        let redirect = valid_redirect();

        let mut total_exchanges = 0;
        for _ in 0..5 {
            total_exchanges += count_exchanges(&bootstrap.handle_redirect(&redirect));
        }

        assert_eq!(total_exchanges, 1);
        assert_eq!(bootstrap.state(), BootstrapState::Exchanging);
    }

    #[test]
    fn redirects_after_terminal_states_are_no_ops() {
        let mut bootstrap = SessionBootstrap::new();
        bootstrap.handle_redirect(&valid_redirect());
        bootstrap.exchange_succeeded().unwrap();

        assert!(bootstrap.handle_redirect(&valid_redirect()).is_empty());
        assert_eq!(bootstrap.state(), BootstrapState::Authenticated);
    }

    #[test]
    fn missing_tokens_notify_exactly_once_with_provided_message() {
        let mut bootstrap = SessionBootstrap::new();
        let redirect = CredentialRedirect {
            access_token: None,
            refresh_token: None,
            message: Some("upstream said no".into()),
        };

        let mut total_notifies = 0;
        for _ in 0..3 {
            total_notifies += count_notifies(&bootstrap.handle_redirect(&redirect));
        }

        assert_eq!(total_notifies, 1);
        assert_eq!(bootstrap.state(), BootstrapState::Failed);
    }

    #[test]
    fn missing_tokens_fall_back_to_default_notice() {
        let mut bootstrap = SessionBootstrap::new();
        let actions = bootstrap.handle_redirect(&CredentialRedirect::default());

        assert_eq!(
            actions,
            vec![BootstrapAction::Notify { message: DEFAULT_FAILURE_NOTICE.to_string() }]
        );
    }

    #[test]
    fn half_a_credential_pair_is_the_failure_path() {
        let mut bootstrap = SessionBootstrap::new();
        let redirect = CredentialRedirect {
            access_token: Some(guest_token()),
            refresh_token: None,
            message: None,
        };

        let actions = bootstrap.handle_redirect(&redirect);
        assert_eq!(count_notifies(&actions), 1);
        assert_eq!(count_exchanges(&actions), 0);
        assert_eq!(bootstrap.state(), BootstrapState::Failed);
    }

    #[test]
    fn undecodable_claim_fails_without_exchanging() {
        let mut bootstrap = SessionBootstrap::new();
        let redirect = CredentialRedirect {
            access_token: Some("garbage".into()),
            refresh_token: Some("refresh".into()),
            message: None,
        };

        let actions = bootstrap.handle_redirect(&redirect);
        assert_eq!(count_exchanges(&actions), 0);
        assert_eq!(count_notifies(&actions), 1);
        assert_eq!(bootstrap.state(), BootstrapState::Failed);
    }

    #[test]
    fn exchange_failure_surfaces_message_and_commits_nothing() {
        let mut bootstrap = SessionBootstrap::new();
        bootstrap.handle_redirect(&valid_redirect());

        let actions = bootstrap
            .exchange_failed(&ExchangeError { message: Some("session service is down".into()) })
            .unwrap();

        assert_eq!(
            actions,
            vec![BootstrapAction::Notify { message: "session service is down".to_string() }]
        );
        assert_eq!(bootstrap.state(), BootstrapState::Failed);
    }

    #[test]
    fn exchange_failure_without_message_uses_default() {
        let mut bootstrap = SessionBootstrap::new();
        bootstrap.handle_redirect(&valid_redirect());

        let actions = bootstrap.exchange_failed(&ExchangeError { message: None }).unwrap();
        assert_eq!(
            actions,
            vec![BootstrapAction::Notify { message: DEFAULT_FAILURE_NOTICE.to_string() }]
        );
    }

    #[test]
    fn continuations_outside_exchanging_are_invalid() {
        let mut bootstrap = SessionBootstrap::new();

        assert!(matches!(
            bootstrap.exchange_succeeded(),
            Err(BootstrapError::InvalidState { operation: "exchange_succeeded", .. })
        ));
        assert!(matches!(
            bootstrap.exchange_failed(&ExchangeError { message: None }),
            Err(BootstrapError::InvalidState { operation: "exchange_failed", .. })
        ));

        bootstrap.handle_redirect(&valid_redirect());
        bootstrap.exchange_succeeded().unwrap();

        // Terminal: the outcome cannot be fed in twice.
        assert!(bootstrap.exchange_succeeded().is_err());
        assert!(bootstrap.exchange_failed(&ExchangeError { message: None }).is_err());
    }
}
