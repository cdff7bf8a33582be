//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_control_repository;
mod in_memory_audit_repository;
mod in_memory_permission_cache;

pub use in_memory_access_control_repository::InMemoryAccessControlRepository;
pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_permission_cache::InMemoryPermissionCache;
