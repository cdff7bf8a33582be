//! Effective permission resolution.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Utc;
use dialcrm_core::{AppResult, PermissionId, UserId};
use dialcrm_domain::{Permission, PermissionCode};

use crate::{AccessControlRepository, PermissionCache};

/// Deduplicated permission set resolved for one user at a point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectivePermissions {
    by_id: HashMap<PermissionId, Permission>,
}

impl EffectivePermissions {
    /// Builds a set from resolved permissions, keeping the first occurrence
    /// of each id.
    #[must_use]
    pub fn from_permissions(permissions: Vec<Permission>) -> Self {
        let mut by_id = HashMap::with_capacity(permissions.len());
        for permission in permissions {
            by_id.entry(permission.id.clone()).or_insert(permission);
        }
        Self { by_id }
    }

    /// Returns whether the set contains a permission by id.
    #[must_use]
    pub fn contains_id(&self, permission_id: &PermissionId) -> bool {
        self.by_id.contains_key(permission_id)
    }

    /// Returns whether the set contains a permission by code.
    #[must_use]
    pub fn contains_code(&self, code: &PermissionCode) -> bool {
        self.by_id.values().any(|permission| &permission.code == code)
    }

    /// Returns whether the set contains any of the given codes.
    #[must_use]
    pub fn has_any_code(&self, codes: &BTreeSet<PermissionCode>) -> bool {
        self.by_id
            .values()
            .any(|permission| codes.contains(&permission.code))
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Returns the number of distinct permissions in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Iterates over the permissions in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.by_id.values()
    }

    /// Returns the permission codes in the set, sorted.
    #[must_use]
    pub fn codes(&self) -> BTreeSet<PermissionCode> {
        self.by_id
            .values()
            .map(|permission| permission.code.clone())
            .collect()
    }

    /// Consumes the set into a plain permission list, in no particular order.
    #[must_use]
    pub fn into_permissions(self) -> Vec<Permission> {
        self.by_id.into_values().collect()
    }
}

/// Computes the effective permission set for a user.
///
/// Effective set = union of permissions reachable via active, unexpired
/// role assignments and role-permission grants, deduplicated by permission
/// id. An empty set is a valid result, not an error.
#[derive(Clone)]
pub struct PermissionResolver {
    repository: Arc<dyn AccessControlRepository>,
    cache: Option<Arc<dyn PermissionCache>>,
    cache_ttl_seconds: u32,
}

impl PermissionResolver {
    /// Default freshness window for cached permission sets.
    pub const DEFAULT_CACHE_TTL_SECONDS: u32 = 60;

    /// Creates a resolver that always reads through to the store.
    #[must_use]
    pub fn new(repository: Arc<dyn AccessControlRepository>) -> Self {
        Self {
            repository,
            cache: None,
            cache_ttl_seconds: Self::DEFAULT_CACHE_TTL_SECONDS,
        }
    }

    /// Creates a resolver backed by a time-boxed permission cache.
    #[must_use]
    pub fn with_cache(
        repository: Arc<dyn AccessControlRepository>,
        cache: Arc<dyn PermissionCache>,
        cache_ttl_seconds: u32,
    ) -> Self {
        Self {
            repository,
            cache: Some(cache),
            cache_ttl_seconds,
        }
    }

    /// Resolves the user's effective permission set from current store state.
    ///
    /// Time-of-check is sampled once per call; callers evaluating several
    /// checks against one actor resolve once and reuse the result.
    pub async fn resolve(&self, user_id: &UserId) -> AppResult<EffectivePermissions> {
        let now = Utc::now();
        let roles = self.repository.list_active_user_roles(user_id, now).await?;

        let mut permissions = Vec::new();
        for role in &roles {
            let granted = self
                .repository
                .list_active_role_permissions(&role.id, now)
                .await?;
            permissions.extend(granted);
        }

        Ok(EffectivePermissions::from_permissions(permissions))
    }

    /// Resolves through the cache when one is configured, populating it on
    /// a miss. Read paths that tolerate the freshness window use this;
    /// guard evaluations read through to the store via [`Self::resolve`].
    pub async fn resolve_cached(&self, user_id: &UserId) -> AppResult<EffectivePermissions> {
        let Some(cache) = &self.cache else {
            return self.resolve(user_id).await;
        };

        if let Some(cached) = cache.get_permissions(user_id).await? {
            return Ok(EffectivePermissions::from_permissions(cached));
        }

        let resolved = self.resolve(user_id).await?;
        cache
            .set_permissions(
                user_id,
                resolved.iter().cloned().collect(),
                self.cache_ttl_seconds,
            )
            .await?;

        Ok(resolved)
    }
}
