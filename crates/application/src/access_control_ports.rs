//! Ports consumed by the RBAC services.
//!
//! Any persistence technology satisfying these contracts is interchangeable;
//! the services never reach past them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dialcrm_core::{AppResult, PermissionId, RoleId, UserId};
use dialcrm_domain::{AuditAction, Permission, Role, RoleAssignment, RolePermissionGrant};

/// Read port over the permission, role, and assignment stores.
///
/// The `list_active_*` reads apply the shared activity predicate in the
/// store: rows must be flagged active and unexpired at `now`.
#[async_trait]
pub trait AccessControlRepository: Send + Sync {
    /// Lists roles reachable through the user's active assignments.
    async fn list_active_user_roles(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Role>>;

    /// Lists permissions reachable through the role's active grants.
    async fn list_active_role_permissions(
        &self,
        role_id: &RoleId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Permission>>;

    /// Loads role records by id. Unknown ids are omitted, not an error.
    async fn find_roles_by_ids(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>>;

    /// Loads permission records by id. Unknown ids are omitted, not an error.
    async fn find_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>>;
}

/// Write port for guard-gated role administration.
///
/// Deactivation is a flag flip, never a delete; the stores keep the full
/// grant history for audit.
#[async_trait]
pub trait RoleAdminRepository: Send + Sync {
    /// Records a new role assignment.
    async fn insert_role_assignment(&self, assignment: RoleAssignment) -> AppResult<()>;

    /// Deactivates an active assignment of the role to the user.
    async fn deactivate_role_assignment(
        &self,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()>;

    /// Records new permission grants on their roles.
    async fn insert_role_permissions(&self, grants: Vec<RolePermissionGrant>) -> AppResult<()>;

    /// Deactivates the role's current grants and records the replacement set.
    async fn replace_role_permissions(
        &self,
        role_id: &RoleId,
        grants: Vec<RolePermissionGrant>,
    ) -> AppResult<()>;
}

/// Time-boxed cache of resolved permission sets per user.
#[async_trait]
pub trait PermissionCache: Send + Sync {
    /// Returns the cached permission set for a user, if still fresh.
    async fn get_permissions(&self, user_id: &UserId) -> AppResult<Option<Vec<Permission>>>;

    /// Caches the resolved permission set for a user.
    async fn set_permissions(
        &self,
        user_id: &UserId,
        permissions: Vec<Permission>,
        ttl_seconds: u32,
    ) -> AppResult<()>;

    /// Drops the cached entry for one user.
    async fn invalidate_user(&self, user_id: &UserId) -> AppResult<()>;

    /// Drops every cached entry. Used after role-level changes, which can
    /// affect any holder of the role.
    async fn invalidate_all(&self) -> AppResult<()>;
}

/// Audit event appended for each applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Acting user.
    pub actor: UserId,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Event resource type.
    pub resource_type: String,
    /// Event resource identifier.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
}

/// Port for appending audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
