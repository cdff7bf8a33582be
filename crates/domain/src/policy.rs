//! Declared capability-class configuration for the escalation guard.
//!
//! The legacy service detected "system admin" by matching a handful of code
//! strings inline. Here every capability class is declared configuration:
//! deployments construct their own policy, and the defaults mirror the codes
//! the production seeds ship with.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::PermissionCode;

/// Permission-code sets consulted by the escalation guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardPolicy {
    /// Codes granting system-admin capability. Holding any of these clears
    /// the system-role and system-permission gates.
    pub system_admin_codes: BTreeSet<PermissionCode>,
    /// Codes allowing role assignment to other users.
    pub user_management_codes: BTreeSet<PermissionCode>,
    /// Codes allowing permission grants to roles.
    pub role_management_codes: BTreeSet<PermissionCode>,
    /// Codes allowing modification of a role's grant set.
    pub role_modification_codes: BTreeSet<PermissionCode>,
    /// Code-family prefixes whose permissions may only be granted by a
    /// system admin, over and above the possession rule.
    pub protected_code_prefixes: Vec<String>,
}

impl GuardPolicy {
    /// Returns whether a code falls in a protected code family.
    #[must_use]
    pub fn is_protected_code(&self, code: &PermissionCode) -> bool {
        self.protected_code_prefixes
            .iter()
            .any(|prefix| code.has_prefix(prefix))
    }
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            system_admin_codes: BTreeSet::from([
                PermissionCode::from_trusted("system.admin"),
                PermissionCode::from_trusted("rbac.system_admin"),
                PermissionCode::from_trusted("rbac.manage_system_roles"),
            ]),
            user_management_codes: BTreeSet::from([
                PermissionCode::from_trusted("users.manage"),
                PermissionCode::from_trusted("rbac.assign_roles"),
            ]),
            role_management_codes: BTreeSet::from([
                PermissionCode::from_trusted("rbac.manage_roles"),
                PermissionCode::from_trusted("rbac.assign_permissions"),
            ]),
            role_modification_codes: BTreeSet::from([PermissionCode::from_trusted(
                "rbac.manage_roles",
            )]),
            protected_code_prefixes: vec!["rbac.".to_owned()],
        }
    }
}
