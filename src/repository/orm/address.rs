use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use uuid::Uuid;

use super::{OrmStore, address_from_entity};
use crate::{
    domain::ensure_owner,
    entity::{
        ShippingAddresses,
        shipping_addresses::{ActiveModel as AddressActive, Column as AddressCol},
    },
    error::{AppError, AppResult},
    models::ShippingAddress,
    repository::AddressRepository,
};

#[async_trait]
impl AddressRepository for OrmStore {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<ShippingAddress>> {
        let rows = ShippingAddresses::find()
            .filter(AddressCol::UserId.eq(user_id))
            .order_by_desc(AddressCol::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(rows.into_iter().map(address_from_entity).collect())
    }

    async fn insert(&self, address: ShippingAddress) -> AppResult<ShippingAddress> {
        let model = AddressActive {
            id: Set(address.id),
            user_id: Set(address.user_id),
            recipient_name: Set(address.recipient_name),
            street: Set(address.street),
            number: Set(address.number),
            complement: Set(address.complement),
            neighborhood: Set(address.neighborhood),
            city: Set(address.city),
            state: Set(address.state),
            zip_code: Set(address.zip_code),
            country: Set(address.country),
            phone: Set(address.phone),
            email: Set(address.email),
            tax_id: Set(address.tax_id),
            created_at: NotSet,
        }
        .insert(&self.conn)
        .await?;

        Ok(address_from_entity(model))
    }

    async fn delete_owned(&self, user_id: Uuid, address_id: Uuid) -> AppResult<()> {
        let txn = self.conn.begin().await?;

        let address = ShippingAddresses::find_by_id(address_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_owner(address.user_id, user_id)?;

        // carts and orders referencing it are detached by ON DELETE SET NULL
        ShippingAddresses::delete_by_id(address.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
