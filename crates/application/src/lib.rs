//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_ports;
mod escalation_guard;
mod permission_resolver;
mod role_admin_service;

pub use access_control_ports::{
    AccessControlRepository, AuditEvent, AuditRepository, PermissionCache, RoleAdminRepository,
};
pub use escalation_guard::EscalationGuard;
pub use permission_resolver::{EffectivePermissions, PermissionResolver};
pub use role_admin_service::RoleAdminService;
