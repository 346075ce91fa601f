use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use super::{OrmStore, variant_from_entity};
use crate::{
    entity::{ProductVariants, Products, product_variants},
    error::AppResult,
    models::ProductVariant,
    repository::CatalogRepository,
};

#[async_trait]
impl CatalogRepository for OrmStore {
    async fn find_variant_by_slug(&self, slug: &str) -> AppResult<Option<ProductVariant>> {
        let row = ProductVariants::find()
            .filter(product_variants::Column::Slug.eq(slug))
            .find_also_related(Products)
            .one(&self.conn)
            .await?;
        Ok(row.map(|(variant, product)| variant_from_entity(variant, product)))
    }
}
