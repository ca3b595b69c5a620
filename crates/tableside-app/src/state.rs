//! Application routes.

use tableside_proto::Role;

/// Where the application is navigated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Pre-authenticated login area.
    Login,
    /// Guest ordering area (menu + live order view).
    GuestOrders,
    /// Staff/owner management dashboard.
    ManageDashboard,
}

impl Route {
    /// Authenticated landing area for a role.
    #[must_use]
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Guest => Self::GuestOrders,
            Role::Employee | Role::Owner => Self::ManageDashboard,
        }
    }
}
