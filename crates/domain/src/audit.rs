//! Stable audit actions emitted by role administration use-cases.

use serde::{Deserialize, Serialize};

/// Audit actions recorded for role and grant mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a role is assigned to a user.
    RoleAssigned,
    /// Emitted when a role assignment is deactivated.
    RoleRevoked,
    /// Emitted when permissions are granted to a role.
    RolePermissionsGranted,
    /// Emitted when a role's grant set is replaced.
    RolePermissionsReplaced,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoleAssigned => "rbac.role.assigned",
            Self::RoleRevoked => "rbac.role.revoked",
            Self::RolePermissionsGranted => "rbac.role.permissions_granted",
            Self::RolePermissionsReplaced => "rbac.role.permissions_replaced",
        }
    }
}
