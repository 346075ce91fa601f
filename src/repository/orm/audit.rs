use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use uuid::Uuid;

use super::OrmStore;
use crate::{
    entity::audit_logs::ActiveModel as AuditActive,
    error::AppResult,
    repository::{AuditRepository, NewAuditEntry},
};

#[async_trait]
impl AuditRepository for OrmStore {
    async fn record(&self, entry: NewAuditEntry) -> AppResult<()> {
        AuditActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(entry.user_id),
            action: Set(entry.action),
            resource: Set(entry.resource),
            metadata: Set(entry.metadata),
            created_at: NotSet,
        }
        .insert(&self.conn)
        .await?;
        Ok(())
    }
}
