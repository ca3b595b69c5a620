//! Role claims issued by the authentication authority.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Role claim carried inside an access token.
///
/// Closed set: the authority issues exactly these values. The client
/// decodes the claim without verifying the token signature, so this value
/// steers navigation and presentation only; it is never an authorization
/// decision on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Table-side guest placing and watching orders.
    Guest,
    /// Staff member managing orders.
    Employee,
    /// Restaurant owner with management access.
    Owner,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Guest => "guest",
            Self::Employee => "employee",
            Self::Owner => "owner",
        };
        f.write_str(name)
    }
}
