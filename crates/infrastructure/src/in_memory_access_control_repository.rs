//! In-memory adapter for the access-control read and write ports.
//!
//! Backs tests and single-process deployments. Deactivation flips flags in
//! place, matching the soft-delete contract of the write port: history rows
//! stay behind for audit.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dialcrm_application::{AccessControlRepository, RoleAdminRepository};
use dialcrm_core::{AppResult, PermissionId, RoleId, UserId};
use dialcrm_domain::{Permission, Role, RoleAssignment, RolePermissionGrant};
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    permissions: HashMap<PermissionId, Permission>,
    roles: HashMap<RoleId, Role>,
    assignments: Vec<RoleAssignment>,
    grants: Vec<RolePermissionGrant>,
}

/// In-memory permission, role, and assignment store.
#[derive(Default)]
pub struct InMemoryAccessControlRepository {
    state: RwLock<State>,
}

impl InMemoryAccessControlRepository {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a permission record.
    pub async fn upsert_permission(&self, permission: Permission) {
        let mut state = self.state.write().await;
        state.permissions.insert(permission.id.clone(), permission);
    }

    /// Inserts or replaces a role record.
    pub async fn upsert_role(&self, role: Role) {
        let mut state = self.state.write().await;
        state.roles.insert(role.id.clone(), role);
    }

    /// Seeds a role assignment row directly, bypassing guard validation.
    pub async fn seed_assignment(&self, assignment: RoleAssignment) {
        self.state.write().await.assignments.push(assignment);
    }

    /// Seeds a role-permission grant row directly, bypassing guard
    /// validation.
    pub async fn seed_grant(&self, grant: RolePermissionGrant) {
        self.state.write().await.grants.push(grant);
    }
}

#[async_trait]
impl AccessControlRepository for InMemoryAccessControlRepository {
    async fn list_active_user_roles(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state
            .assignments
            .iter()
            .filter(|assignment| &assignment.user_id == user_id && assignment.is_active_at(now))
            .filter_map(|assignment| state.roles.get(&assignment.role_id))
            .filter(|role| role.is_active)
            .cloned()
            .collect())
    }

    async fn list_active_role_permissions(
        &self,
        role_id: &RoleId,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(state
            .grants
            .iter()
            .filter(|grant| &grant.role_id == role_id && grant.is_active_at(now))
            .filter_map(|grant| state.permissions.get(&grant.permission_id))
            .cloned()
            .collect())
    }

    async fn find_roles_by_ids(&self, role_ids: &[RoleId]) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(role_ids
            .iter()
            .filter_map(|role_id| state.roles.get(role_id))
            .cloned()
            .collect())
    }

    async fn find_permissions_by_ids(
        &self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        Ok(permission_ids
            .iter()
            .filter_map(|permission_id| state.permissions.get(permission_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleAdminRepository for InMemoryAccessControlRepository {
    async fn insert_role_assignment(&self, assignment: RoleAssignment) -> AppResult<()> {
        self.state.write().await.assignments.push(assignment);
        Ok(())
    }

    async fn deactivate_role_assignment(
        &self,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        let mut matched = 0usize;
        for assignment in state
            .assignments
            .iter_mut()
            .filter(|a| &a.user_id == user_id && &a.role_id == role_id && a.is_active)
        {
            assignment.is_active = false;
            matched += 1;
        }

        if matched == 0 {
            tracing::debug!(
                user_id = %user_id,
                role_id = %role_id,
                "deactivation matched no active assignment"
            );
        }

        Ok(())
    }

    async fn insert_role_permissions(&self, grants: Vec<RolePermissionGrant>) -> AppResult<()> {
        self.state.write().await.grants.extend(grants);
        Ok(())
    }

    async fn replace_role_permissions(
        &self,
        role_id: &RoleId,
        grants: Vec<RolePermissionGrant>,
    ) -> AppResult<()> {
        let mut state = self.state.write().await;
        for grant in state
            .grants
            .iter_mut()
            .filter(|grant| &grant.role_id == role_id)
        {
            grant.is_active = false;
        }
        state.grants.extend(grants);
        Ok(())
    }
}
