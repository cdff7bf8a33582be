//! Guard-gated role administration.
//!
//! The standalone validators on [`EscalationGuard`] are pure gates; this
//! service is the validate-and-apply path that keeps validation and the
//! resulting writes behind one call, then invalidates the permission cache
//! and appends audit events for every applied change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dialcrm_core::{AppResult, PermissionId, RoleId, UserId};
use dialcrm_domain::{AuditAction, Permission, Role, RoleAssignment, RolePermissionGrant};

use crate::{AuditEvent, AuditRepository, EscalationGuard, PermissionCache, RoleAdminRepository};

/// Application service applying validated role and grant mutations.
#[derive(Clone)]
pub struct RoleAdminService {
    guard: EscalationGuard,
    repository: Arc<dyn RoleAdminRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    cache: Arc<dyn PermissionCache>,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        guard: EscalationGuard,
        repository: Arc<dyn RoleAdminRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        cache: Arc<dyn PermissionCache>,
    ) -> Self {
        Self {
            guard,
            repository,
            audit_repository,
            cache,
        }
    }

    /// Assigns the given roles to `target`, skipping ids that did not clear
    /// validation, and returns the roles actually assigned.
    pub async fn assign_roles(
        &self,
        actor: &UserId,
        target: &UserId,
        role_ids: &[RoleId],
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Role>> {
        let roles = self
            .guard
            .validate_role_assignment(actor, target, role_ids)
            .await?;

        for role in &roles {
            self.repository
                .insert_role_assignment(RoleAssignment {
                    user_id: target.clone(),
                    role_id: role.id.clone(),
                    is_active: true,
                    expires_at,
                    assigned_by: Some(actor.clone()),
                })
                .await?;

            self.audit_repository
                .append_event(AuditEvent {
                    actor: actor.clone(),
                    action: AuditAction::RoleAssigned,
                    resource_type: "rbac_user_role".to_owned(),
                    resource_id: format!("{target}:{}", role.id),
                    detail: Some(format!("assigned role '{}' to user '{target}'", role.name)),
                })
                .await?;
        }

        self.cache.invalidate_user(target).await?;
        tracing::info!(
            actor = %actor,
            target = %target,
            assigned = roles.len(),
            "applied role assignment"
        );

        Ok(roles)
    }

    /// Deactivates the target's assignment of the role.
    pub async fn revoke_role(
        &self,
        actor: &UserId,
        target: &UserId,
        role_id: &RoleId,
    ) -> AppResult<()> {
        let role = self
            .guard
            .validate_role_revocation(actor, target, role_id)
            .await?;

        self.repository
            .deactivate_role_assignment(target, role_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.clone(),
                action: AuditAction::RoleRevoked,
                resource_type: "rbac_user_role".to_owned(),
                resource_id: format!("{target}:{role_id}"),
                detail: Some(format!("revoked role '{}' from user '{target}'", role.name)),
            })
            .await?;

        self.cache.invalidate_user(target).await
    }

    /// Grants the given permissions to a role, skipping ids that did not
    /// clear validation, and returns the permissions actually granted.
    pub async fn grant_permissions(
        &self,
        actor: &UserId,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Permission>> {
        let permissions = self
            .guard
            .validate_permission_grant(actor, role_id, permission_ids)
            .await?;

        let grants = permissions
            .iter()
            .map(|permission| RolePermissionGrant {
                role_id: role_id.clone(),
                permission_id: permission.id.clone(),
                is_active: true,
                expires_at,
                granted_by: Some(actor.clone()),
            })
            .collect();
        self.repository.insert_role_permissions(grants).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.clone(),
                action: AuditAction::RolePermissionsGranted,
                resource_type: "rbac_role_permission".to_owned(),
                resource_id: role_id.to_string(),
                detail: Some(format!(
                    "granted permissions [{}] to role '{role_id}'",
                    joined_codes(&permissions)
                )),
            })
            .await?;

        // A role-level change can affect any holder of the role.
        self.cache.invalidate_all().await?;

        Ok(permissions)
    }

    /// Replaces the role's grant set with the given permissions and returns
    /// the permissions now in effect.
    pub async fn replace_role_permissions(
        &self,
        actor: &UserId,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let permissions = self
            .guard
            .validate_role_modification(actor, role_id, permission_ids)
            .await?;

        let grants = permissions
            .iter()
            .map(|permission| RolePermissionGrant {
                role_id: role_id.clone(),
                permission_id: permission.id.clone(),
                is_active: true,
                expires_at: None,
                granted_by: Some(actor.clone()),
            })
            .collect();
        self.repository
            .replace_role_permissions(role_id, grants)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor: actor.clone(),
                action: AuditAction::RolePermissionsReplaced,
                resource_type: "rbac_role_permission".to_owned(),
                resource_id: role_id.to_string(),
                detail: Some(format!(
                    "replaced grants of role '{role_id}' with [{}]",
                    joined_codes(&permissions)
                )),
            })
            .await?;

        self.cache.invalidate_all().await?;

        Ok(permissions)
    }
}

fn joined_codes(permissions: &[Permission]) -> String {
    permissions
        .iter()
        .map(|permission| permission.code.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
