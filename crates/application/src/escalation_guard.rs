//! Privilege-escalation checks for role and permission administration.
//!
//! Every operation shares one shape: resolve the actor's effective
//! permission set once, then verify each requested grant lies inside it,
//! with a stricter gate for anything flagged system-level. An actor can
//! never hand out a capability it does not itself hold, even through a
//! non-system role that happens to carry a system-class permission.

use std::slice;
use std::sync::Arc;

use chrono::Utc;
use dialcrm_core::{AppError, AppResult, PermissionId, RoleId, UserId};
use dialcrm_domain::{GuardPolicy, Permission, Role};

use crate::{AccessControlRepository, EffectivePermissions, PermissionResolver};

/// Stateless validator for role assignments, permission grants, and role
/// modifications.
///
/// Each call is a single-shot check against freshly resolved data; no
/// mutation ever happens here. Callers apply the returned records only
/// after a validation passes.
#[derive(Clone)]
pub struct EscalationGuard {
    resolver: PermissionResolver,
    repository: Arc<dyn AccessControlRepository>,
    policy: GuardPolicy,
}

impl EscalationGuard {
    /// Creates a guard from a resolver, a store, and a declared policy.
    #[must_use]
    pub fn new(
        resolver: PermissionResolver,
        repository: Arc<dyn AccessControlRepository>,
        policy: GuardPolicy,
    ) -> Self {
        Self {
            resolver,
            repository,
            policy,
        }
    }

    /// Validates that `assigner` may assign the given roles to `target`.
    ///
    /// Unknown or inactive role ids are excluded rather than rejected; the
    /// returned roles are exactly those cleared for assignment, so callers
    /// apply nothing that was not validated.
    pub async fn validate_role_assignment(
        &self,
        assigner: &UserId,
        target: &UserId,
        role_ids: &[RoleId],
    ) -> AppResult<Vec<Role>> {
        if assigner == target {
            return Err(AppError::Validation(format!(
                "user '{assigner}' cannot assign roles to themselves"
            )));
        }

        let actor = self.resolver.resolve(assigner).await?;
        if !actor.has_any_code(&self.policy.user_management_codes) {
            return Err(deny(format!(
                "user '{assigner}' lacks a user-management permission required to assign roles"
            )));
        }
        let is_system_admin = actor.has_any_code(&self.policy.system_admin_codes);

        let now = Utc::now();
        let roles: Vec<Role> = self
            .repository
            .find_roles_by_ids(role_ids)
            .await?
            .into_iter()
            .filter(|role| role.is_active)
            .collect();

        for role in &roles {
            if role.is_system && !is_system_admin {
                return Err(deny(format!(
                    "role '{}' is a system role and requires system-admin capability to assign",
                    role.name
                )));
            }

            // Checked permission by permission rather than via the role's own
            // system flag: a non-system role could carry a system-class
            // permission through a careless seed.
            let granted = self
                .repository
                .list_active_role_permissions(&role.id, now)
                .await?;
            for permission in &granted {
                if !actor.contains_id(&permission.id) {
                    return Err(deny(format!(
                        "cannot assign role '{}': assigner does not hold permission '{}'",
                        role.name, permission.code
                    )));
                }
            }
        }

        Ok(roles)
    }

    /// Validates that `granter` may grant the given permissions to a role.
    ///
    /// Unknown permission ids are excluded, mirroring role loading; the
    /// returned permissions are exactly those cleared for granting.
    pub async fn validate_permission_grant(
        &self,
        granter: &UserId,
        role_id: &RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let actor = self.resolver.resolve(granter).await?;
        if !actor.has_any_code(&self.policy.role_management_codes) {
            return Err(deny(format!(
                "user '{granter}' lacks a role-management permission required to grant \
                 permissions to role '{role_id}'"
            )));
        }
        let is_system_admin = actor.has_any_code(&self.policy.system_admin_codes);

        let permissions = self
            .repository
            .find_permissions_by_ids(permission_ids)
            .await?;

        for permission in &permissions {
            if !actor.contains_id(&permission.id) {
                return Err(deny(format!(
                    "cannot grant permission '{}': granter does not hold it",
                    permission.code
                )));
            }

            if (permission.is_system || self.policy.is_protected_code(&permission.code))
                && !is_system_admin
            {
                return Err(deny(format!(
                    "permission '{}' is system-protected and requires system-admin capability \
                     to grant",
                    permission.code
                )));
            }
        }

        Ok(permissions)
    }

    /// Validates that `modifier` may replace the role's grant set with the
    /// given permissions.
    pub async fn validate_role_modification(
        &self,
        modifier: &UserId,
        role_id: &RoleId,
        new_permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        let actor = self.resolver.resolve(modifier).await?;
        if !actor.has_any_code(&self.policy.role_modification_codes) {
            return Err(deny(format!(
                "user '{modifier}' lacks the role-management permission required to modify \
                 role '{role_id}'"
            )));
        }

        let role = self.load_role(role_id).await?;
        if role.is_system && !actor.has_any_code(&self.policy.system_admin_codes) {
            return Err(deny(format!(
                "role '{}' is a system role and requires system-admin capability to modify",
                role.name
            )));
        }

        let permissions = self
            .repository
            .find_permissions_by_ids(new_permission_ids)
            .await?;
        for permission in &permissions {
            if !actor.contains_id(&permission.id) {
                return Err(deny(format!(
                    "cannot attach permission '{}' to role '{}': modifier does not hold it",
                    permission.code, role.name
                )));
            }
        }

        Ok(permissions)
    }

    /// Validates that `revoker` may deactivate the target's assignment of
    /// the role. Revocation never escalates, so only the management and
    /// system gates apply.
    pub async fn validate_role_revocation(
        &self,
        revoker: &UserId,
        target: &UserId,
        role_id: &RoleId,
    ) -> AppResult<Role> {
        let actor = self.resolver.resolve(revoker).await?;
        if !actor.has_any_code(&self.policy.user_management_codes) {
            return Err(deny(format!(
                "user '{revoker}' lacks a user-management permission required to revoke roles \
                 from user '{target}'"
            )));
        }

        let role = self.load_role(role_id).await?;
        if role.is_system && !actor.has_any_code(&self.policy.system_admin_codes) {
            return Err(deny(format!(
                "role '{}' is a system role and requires system-admin capability to revoke",
                role.name
            )));
        }

        Ok(role)
    }

    /// Returns the actor's resolved set together with the system-admin
    /// verdict, for callers that surface capability summaries.
    pub async fn actor_capabilities(
        &self,
        actor: &UserId,
    ) -> AppResult<(EffectivePermissions, bool)> {
        let resolved = self.resolver.resolve(actor).await?;
        let is_system_admin = resolved.has_any_code(&self.policy.system_admin_codes);
        Ok((resolved, is_system_admin))
    }

    async fn load_role(&self, role_id: &RoleId) -> AppResult<Role> {
        self.repository
            .find_roles_by_ids(slice::from_ref(role_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }
}

fn deny(message: String) -> AppError {
    tracing::warn!(denial = %message, "escalation guard denied request");
    AppError::Forbidden(message)
}
