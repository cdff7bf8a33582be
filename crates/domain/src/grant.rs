//! Grant relations and the shared activity window predicate.
//!
//! Both relation kinds deactivate by flag flip, never by deletion, so the
//! stores keep a full grant history for audit.

use chrono::{DateTime, Utc};
use dialcrm_core::{PermissionId, RoleId, UserId};
use serde::{Deserialize, Serialize};

/// Relation carrying one permission to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermissionGrant {
    /// Role receiving the permission.
    pub role_id: RoleId,
    /// Permission being granted.
    pub permission_id: PermissionId,
    /// Deactivated grants contribute nothing regardless of expiry.
    pub is_active: bool,
    /// Optional expiry; `None` means the grant does not expire.
    pub expires_at: Option<DateTime<Utc>>,
    /// User who created the grant, when known.
    pub granted_by: Option<UserId>,
}

impl RolePermissionGrant {
    /// Returns whether the grant is active at the given instant.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        window_is_open(self.is_active, self.expires_at, now)
    }
}

/// Relation assigning one role to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// User receiving the role.
    pub user_id: UserId,
    /// Role being assigned.
    pub role_id: RoleId,
    /// Deactivated assignments contribute nothing regardless of expiry.
    pub is_active: bool,
    /// Optional expiry; `None` means the assignment does not expire.
    pub expires_at: Option<DateTime<Utc>>,
    /// User who created the assignment, when known.
    pub assigned_by: Option<UserId>,
}

impl RoleAssignment {
    /// Returns whether the assignment is active at the given instant.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        window_is_open(self.is_active, self.expires_at, now)
    }
}

/// A grant or assignment is active iff its flag is set and its expiry, if
/// any, lies strictly in the future.
fn window_is_open(is_active: bool, expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    is_active && expires_at.is_none_or(|expiry| expiry > now)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use dialcrm_core::{PermissionId, RoleId, UserId};
    use proptest::prelude::*;

    use super::{RoleAssignment, RolePermissionGrant, window_is_open};

    fn assignment(is_active: bool, expires_in_hours: Option<i64>) -> RoleAssignment {
        RoleAssignment {
            user_id: UserId::new("u-1"),
            role_id: RoleId::new("r-1"),
            is_active,
            expires_at: expires_in_hours.map(|hours| Utc::now() + Duration::hours(hours)),
            assigned_by: None,
        }
    }

    #[test]
    fn unexpired_active_assignment_is_active() {
        assert!(assignment(true, Some(24)).is_active_at(Utc::now()));
        assert!(assignment(true, None).is_active_at(Utc::now()));
    }

    #[test]
    fn expired_assignment_is_inactive_even_when_flagged_active() {
        assert!(!assignment(true, Some(-24)).is_active_at(Utc::now()));
    }

    #[test]
    fn deactivated_assignment_is_inactive_even_without_expiry() {
        assert!(!assignment(false, None).is_active_at(Utc::now()));
    }

    #[test]
    fn grant_expiring_exactly_now_is_inactive() {
        let now = Utc::now();
        let grant = RolePermissionGrant {
            role_id: RoleId::new("r-1"),
            permission_id: PermissionId::new("p-1"),
            is_active: true,
            expires_at: Some(now),
            granted_by: None,
        };
        assert!(!grant.is_active_at(now));
    }

    proptest! {
        #[test]
        fn window_never_opens_for_deactivated_rows(offset_hours in -1000i64..1000) {
            let now = Utc::now();
            let expiry = Some(now + Duration::hours(offset_hours));
            prop_assert!(!window_is_open(false, expiry, now));
            prop_assert!(!window_is_open(false, None, now));
        }

        #[test]
        fn window_tracks_expiry_ordering(offset_hours in -1000i64..1000) {
            let now = Utc::now();
            let expiry = now + Duration::hours(offset_hours);
            prop_assert_eq!(window_is_open(true, Some(expiry), now), expiry > now);
        }
    }
}
