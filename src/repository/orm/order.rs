use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    entity::prelude::DateTimeWithTimeZone,
    sea_query::{Expr, LockType},
};
use uuid::Uuid;

use super::{
    OrmStore,
    cart::{lock_or_create_cart, merge_line},
    load_cart, load_variants, order_from_entity, order_item_from_entity,
};
use crate::{
    domain::OrderDraft,
    entity::{
        CartItems, Carts, OrderItems, Orders,
        cart_items::Column as CartItemCol,
        carts::Column as CartCol,
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol},
        orders::{ActiveModel as OrderActive, Column as OrderCol},
    },
    error::{AppError, AppResult},
    models::{Order, OrderLine, OrderStatus, OrderWithItems},
    repository::{OrderQuery, OrderRepository, StatusChange},
};

#[async_trait]
impl OrderRepository for OrmStore {
    async fn place_from_cart(&self, user_id: Uuid, order_id: Uuid) -> AppResult<OrderWithItems> {
        let txn = self.conn.begin().await?;

        let cart = Carts::find()
            .filter(CartCol::UserId.eq(user_id))
            .lock(LockType::Update)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::Validation("cart is empty".into()))?;
        let snapshot = load_cart(&txn, cart).await?;
        let draft = OrderDraft::from_cart(order_id, &snapshot)?;

        let shipping = draft.shipping.clone();
        let order = OrderActive {
            id: Set(draft.order_id),
            user_id: Set(draft.user_id),
            shipping_address_id: Set(Some(draft.shipping_address_id)),
            recipient_name: Set(shipping.recipient_name),
            street: Set(shipping.street),
            number: Set(shipping.number),
            complement: Set(shipping.complement),
            neighborhood: Set(shipping.neighborhood),
            city: Set(shipping.city),
            state: Set(shipping.state),
            zip_code: Set(shipping.zip_code),
            country: Set(shipping.country),
            phone: Set(shipping.phone),
            email: Set(shipping.email),
            tax_id: Set(shipping.tax_id),
            total_price_in_cents: Set(draft.total_price_in_cents),
            status: Set(OrderStatus::Pending.as_str().to_string()),
            checkout_session_id: Set(None),
            paid_at: Set(None),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let mut lines = Vec::with_capacity(draft.items.len());
        // draft items are built from the cart lines in order
        for (item, line) in draft.items.iter().zip(snapshot.items.iter()) {
            let model = OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order.id),
                product_variant_id: Set(item.product_variant_id),
                quantity: Set(item.quantity),
                price_in_cents: Set(item.price_in_cents),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
            lines.push(OrderLine {
                item: order_item_from_entity(model),
                variant: line.variant.clone(),
            });
        }

        // only the snapshotted lines; anything added later stays in the cart
        let snapped: Vec<Uuid> = snapshot.items.iter().map(|line| line.item.id).collect();
        CartItems::delete_many()
            .filter(CartItemCol::Id.is_in(snapped))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        Ok(OrderWithItems {
            order: order_from_entity(order)?,
            items: lines,
        })
    }

    async fn find_by_id(&self, order_id: Uuid) -> AppResult<Option<OrderWithItems>> {
        let Some(order) = Orders::find_by_id(order_id).one(&self.conn).await? else {
            return Ok(None);
        };

        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .order_by_asc(OrderItemCol::CreatedAt)
            .all(&self.conn)
            .await?;
        let variants =
            load_variants(&self.conn, items.iter().map(|i| i.product_variant_id).collect()).await?;

        let items = items
            .into_iter()
            .filter_map(|item| {
                let variant = variants.get(&item.product_variant_id)?.clone();
                Some(OrderLine {
                    item: order_item_from_entity(item),
                    variant,
                })
            })
            .collect();

        Ok(Some(OrderWithItems {
            order: order_from_entity(order)?,
            items,
        }))
    }

    async fn list_by_user(&self, user_id: Uuid, query: OrderQuery) -> AppResult<(Vec<Order>, u64)> {
        let mut condition = Condition::all().add(OrderCol::UserId.eq(user_id));
        if let Some(status) = query.status {
            condition = condition.add(OrderCol::Status.eq(status.as_str()));
        }

        let mut finder = Orders::find().filter(condition);
        finder = if query.newest_first {
            finder.order_by_desc(OrderCol::CreatedAt)
        } else {
            finder.order_by_asc(OrderCol::CreatedAt)
        };

        let total = finder.clone().count(&self.conn).await?;

        let orders = finder
            .limit(query.limit)
            .offset(query.offset)
            .all(&self.conn)
            .await?
            .into_iter()
            .map(order_from_entity)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((orders, total))
    }

    async fn attach_checkout_session(&self, order_id: Uuid, session_id: &str) -> AppResult<()> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Orders::update_many()
            .col_expr(OrderCol::CheckoutSessionId, Expr::value(session_id.to_string()))
            .col_expr(OrderCol::UpdatedAt, Expr::value(now))
            .filter(OrderCol::Id.eq(order_id))
            .exec(&self.conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn return_to_cart(&self, order_id: Uuid) -> AppResult<bool> {
        let txn = self.conn.begin().await?;

        let order = Orders::find_by_id(order_id)
            .filter(OrderCol::Status.eq(OrderStatus::Pending.as_str()))
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        let Some(order) = order else {
            return Ok(false);
        };

        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .all(&txn)
            .await?;
        let cart = lock_or_create_cart(&txn, order.user_id).await?;
        for item in &items {
            merge_line(&txn, cart.id, item.product_variant_id, item.quantity).await?;
        }
        Orders::delete_by_id(order.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    async fn transition_status(
        &self,
        order_id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> AppResult<StatusChange> {
        if !from.can_transition_to(to) {
            return Err(AppError::Validation(format!(
                "cannot move an order from {from} to {to}"
            )));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut update = Orders::update_many()
            .col_expr(OrderCol::Status, Expr::value(to.as_str()))
            .col_expr(OrderCol::UpdatedAt, Expr::value(now));
        if to == OrderStatus::Paid {
            update = update.col_expr(OrderCol::PaidAt, Expr::value(Some(now)));
        }

        // the status predicate makes concurrent deliveries race harmlessly
        let result = update
            .filter(OrderCol::Id.eq(order_id))
            .filter(OrderCol::Status.eq(from.as_str()))
            .exec(&self.conn)
            .await?;

        let order = Orders::find_by_id(order_id)
            .one(&self.conn)
            .await?
            .ok_or(AppError::NotFound)?;
        let order = order_from_entity(order)?;

        if result.rows_affected > 0 {
            Ok(StatusChange::Applied(order))
        } else {
            Ok(StatusChange::Unchanged(order))
        }
    }

    async fn expire_session(&self, order_id: Uuid, session_id: &str) -> AppResult<StatusChange> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Orders::update_many()
            .col_expr(OrderCol::Status, Expr::value(OrderStatus::Canceled.as_str()))
            .col_expr(OrderCol::UpdatedAt, Expr::value(now))
            .filter(OrderCol::Id.eq(order_id))
            .filter(OrderCol::Status.eq(OrderStatus::Pending.as_str()))
            .filter(OrderCol::CheckoutSessionId.eq(session_id))
            .exec(&self.conn)
            .await?;

        let order = Orders::find_by_id(order_id)
            .one(&self.conn)
            .await?
            .ok_or(AppError::NotFound)?;
        let order = order_from_entity(order)?;

        if result.rows_affected > 0 {
            Ok(StatusChange::Applied(order))
        } else {
            Ok(StatusChange::Unchanged(order))
        }
    }
}
