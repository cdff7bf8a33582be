//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod grant;
mod permission;
mod policy;
mod role;

pub use audit::AuditAction;
pub use grant::{RoleAssignment, RolePermissionGrant};
pub use permission::{Permission, PermissionCode};
pub use policy::GuardPolicy;
pub use role::Role;
