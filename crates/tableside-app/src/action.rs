//! Application actions
//!
//! Actions produced by the App state machine for the runtime to execute.

use tableside_core::{
    bootstrap::BootstrapAction,
    ledger::LedgerAction,
    session::Session,
};
use tableside_proto::Role;

/// Actions produced by the [`crate::App`] state machine.
///
/// The union of bootstrap and ledger effects, in one vocabulary the
/// runtime interprets against the [`crate::Driver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Call the external credential exchange.
    Exchange {
        /// Access token to exchange.
        access_token: String,
        /// Refresh token to exchange.
        refresh_token: String,
    },

    /// Commit the exchanged session to the root session cell.
    CommitSession(Session),

    /// Open the live event channel.
    OpenChannel {
        /// Token the channel authenticates with.
        access_token: String,
    },

    /// Publish the decoded role to the application.
    PublishRole(Role),

    /// Navigate to the authenticated area for this role.
    Navigate(Role),

    /// Show a message to the user.
    Notify {
        /// Text to display.
        message: String,
    },

    /// Re-pull the full order set from the server.
    Refetch,
}

impl From<BootstrapAction> for AppAction {
    fn from(action: BootstrapAction) -> Self {
        match action {
            BootstrapAction::Exchange { access_token, refresh_token } => {
                Self::Exchange { access_token, refresh_token }
            },
            BootstrapAction::CommitSession(session) => Self::CommitSession(session),
            BootstrapAction::OpenChannel { access_token } => Self::OpenChannel { access_token },
            BootstrapAction::PublishRole(role) => Self::PublishRole(role),
            BootstrapAction::Navigate(role) => Self::Navigate(role),
            BootstrapAction::Notify { message } => Self::Notify { message },
        }
    }
}

impl From<LedgerAction> for AppAction {
    fn from(action: LedgerAction) -> Self {
        match action {
            LedgerAction::Notify { message } => Self::Notify { message },
            LedgerAction::Refetch => Self::Refetch,
        }
    }
}
