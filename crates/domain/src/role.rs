//! Role records.

use dialcrm_core::RoleId;
use serde::{Deserialize, Serialize};

/// Named bundle of permission grants, assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: RoleId,
    /// Unique role name.
    pub name: String,
    /// Optional longer description.
    pub description: Option<String>,
    /// Indicates a system-managed role requiring system-admin capability
    /// to assign or modify.
    pub is_system: bool,
    /// Inactive roles are excluded from assignment and resolution.
    pub is_active: bool,
}
