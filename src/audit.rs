use serde_json::Value;
use uuid::Uuid;

use crate::repository::{AuditRepository, NewAuditEntry};

/// Best-effort audit trail; a failed write is logged and never fails the caller.
pub async fn log_audit(
    audit: &dyn AuditRepository,
    user_id: Option<Uuid>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) {
    let entry = NewAuditEntry {
        user_id,
        action: action.to_string(),
        resource: resource.map(str::to_string),
        metadata,
    };
    if let Err(err) = audit.record(entry).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
