//! In-memory adapter for the audit port.

use async_trait::async_trait;
use dialcrm_application::{AuditEvent, AuditRepository};
use dialcrm_core::AppResult;
use tokio::sync::RwLock;

/// Append-only in-memory audit log.
#[derive(Default)]
pub struct InMemoryAuditRepository {
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty in-memory audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the appended events in order.
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        tracing::debug!(
            actor = %event.actor,
            action = event.action.as_str(),
            resource_id = %event.resource_id,
            "audit event appended"
        );
        self.events.write().await.push(event);
        Ok(())
    }
}
