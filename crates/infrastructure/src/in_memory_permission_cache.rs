//! In-memory adapter for the permission cache port.
//!
//! Entries are time-boxed and evicted lazily on read, the same shape the
//! role administration service expects from any cache backend: stale
//! entries never surface, and invalidation drops them eagerly.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dialcrm_application::PermissionCache;
use dialcrm_core::{AppResult, UserId};
use dialcrm_domain::Permission;
use tokio::sync::RwLock;

struct CacheEntry {
    permissions: Vec<Permission>,
    expires_at: Instant,
}

/// In-memory time-boxed cache of resolved permission sets.
#[derive(Default)]
pub struct InMemoryPermissionCache {
    entries: RwLock<HashMap<UserId, CacheEntry>>,
}

impl InMemoryPermissionCache {
    /// Creates an empty in-memory permission cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionCache for InMemoryPermissionCache {
    async fn get_permissions(&self, user_id: &UserId) -> AppResult<Option<Vec<Permission>>> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(user_id) {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.permissions.clone()));
                }
            } else {
                return Ok(None);
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(user_id)
            .is_some_and(|entry| entry.expires_at <= Instant::now())
        {
            entries.remove(user_id);
        }

        Ok(None)
    }

    async fn set_permissions(
        &self,
        user_id: &UserId,
        permissions: Vec<Permission>,
        ttl_seconds: u32,
    ) -> AppResult<()> {
        if ttl_seconds == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let expires_at = now
            .checked_add(Duration::from_secs(u64::from(ttl_seconds)))
            .unwrap_or(now);

        self.entries.write().await.insert(
            user_id.clone(),
            CacheEntry {
                permissions,
                expires_at,
            },
        );

        Ok(())
    }

    async fn invalidate_user(&self, user_id: &UserId) -> AppResult<()> {
        self.entries.write().await.remove(user_id);
        Ok(())
    }

    async fn invalidate_all(&self) -> AppResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use dialcrm_application::PermissionCache;
    use dialcrm_core::{PermissionId, UserId};
    use dialcrm_domain::{Permission, PermissionCode};

    use super::InMemoryPermissionCache;

    fn permissions() -> Vec<Permission> {
        vec![Permission {
            id: PermissionId::new("p-calls-view"),
            code: PermissionCode::new("calls.view")
                .unwrap_or_else(|_| unreachable!("valid test code")),
            name: "calls.view".to_owned(),
            description: None,
            category: None,
            is_system: false,
        }]
    }

    #[tokio::test]
    async fn fresh_entries_are_returned() {
        let cache = InMemoryPermissionCache::new();
        let user = UserId::new("alice");

        let set = cache.set_permissions(&user, permissions(), 60).await;
        assert!(set.is_ok());

        let cached = cache.get_permissions(&user).await;
        assert_eq!(
            cached.map(|entry| entry.map(|permissions| permissions.len())).ok(),
            Some(Some(1))
        );
    }

    #[tokio::test]
    async fn zero_ttl_stores_nothing() {
        let cache = InMemoryPermissionCache::new();
        let user = UserId::new("alice");

        let set = cache.set_permissions(&user, permissions(), 0).await;
        assert!(set.is_ok());

        let cached = cache.get_permissions(&user).await;
        assert_eq!(cached.map(|entry| entry.is_none()).ok(), Some(true));
    }

    #[tokio::test]
    async fn expired_entries_are_evicted_on_read() {
        let cache = InMemoryPermissionCache::new();
        let user = UserId::new("alice");

        let set = cache.set_permissions(&user, permissions(), 1).await;
        assert!(set.is_ok());

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        let cached = cache.get_permissions(&user).await;
        assert_eq!(cached.map(|entry| entry.is_none()).ok(), Some(true));
        assert!(cache.entries.read().await.is_empty());
    }

    #[tokio::test]
    async fn invalidation_drops_entries() {
        let cache = InMemoryPermissionCache::new();
        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        for user in [&alice, &bob] {
            let set = cache.set_permissions(user, permissions(), 60).await;
            assert!(set.is_ok());
        }

        let invalidated = cache.invalidate_user(&alice).await;
        assert!(invalidated.is_ok());
        let alice_entry = cache.get_permissions(&alice).await;
        let bob_entry = cache.get_permissions(&bob).await;
        assert_eq!(alice_entry.map(|entry| entry.is_none()).ok(), Some(true));
        assert_eq!(bob_entry.map(|entry| entry.is_some()).ok(), Some(true));

        let flushed = cache.invalidate_all().await;
        assert!(flushed.is_ok());
        assert!(cache.entries.read().await.is_empty());
    }
}
