//! User roles and the capability table driving which actions the UI offers.
//!
//! The role label comes back from the login endpoint; the backend
//! independently enforces authorisation on every call, so this is a UI
//! convenience, not a security boundary.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Manager,
    Viewer,
}

/// Things a role is allowed to do in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create/update/delete countries, machine types, makes, model sizes
    ManageReferenceData,
    /// Create/update machine rates, process flows, cost aggregates
    EditRates,
    /// Approve pending machine-rate edit requests
    ApproveEdits,
}

impl Role {
    /// Parse the label from the login response. Unknown labels get the
    /// least-privileged role.
    pub fn from_label(label: &str) -> Self {
        match label {
            "Admin" => Role::Admin,
            "Manager" => Role::Manager,
            _ => Role::Viewer,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Viewer => "Viewer",
        }
    }

    /// Capability lookup. A closed table instead of string comparisons
    /// scattered through the UI code.
    pub fn can(&self, capability: Capability) -> bool {
        match (self, capability) {
            (Role::Admin, _) => true,
            (Role::Manager, Capability::EditRates) => true,
            (Role::Manager, Capability::ManageReferenceData) => false,
            (Role::Manager, Capability::ApproveEdits) => false,
            (Role::Viewer, _) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_labels() {
        assert_eq!(Role::from_label("Admin"), Role::Admin);
        assert_eq!(Role::from_label("Manager"), Role::Manager);
        assert_eq!(Role::from_label("Viewer"), Role::Viewer);
    }

    #[test]
    fn unknown_label_gets_least_privilege() {
        assert_eq!(Role::from_label("Superuser"), Role::Viewer);
        assert_eq!(Role::from_label(""), Role::Viewer);
        assert_eq!(Role::from_label("admin"), Role::Viewer); // case-sensitive
    }

    #[test]
    fn capability_table() {
        assert!(Role::Admin.can(Capability::ManageReferenceData));
        assert!(Role::Admin.can(Capability::EditRates));
        assert!(Role::Admin.can(Capability::ApproveEdits));

        assert!(Role::Manager.can(Capability::EditRates));
        assert!(!Role::Manager.can(Capability::ManageReferenceData));
        assert!(!Role::Manager.can(Capability::ApproveEdits));

        assert!(!Role::Viewer.can(Capability::EditRates));
        assert!(!Role::Viewer.can(Capability::ManageReferenceData));
    }
}
