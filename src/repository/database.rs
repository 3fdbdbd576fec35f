//! SeaORM-backed product storage.
//!
//! Mirrors the in-memory repository's contract on top of a SQL table. The
//! `seq` column keeps listing in insertion order; name lookups compare the
//! stored `name_key` so matching folds case the same way as in memory.

use super::ProductRepository;
use crate::{
    entities::{ProductColumn, ProductEntity, product},
    errors::Result,
    models::{Product, ProductChanges, ProductCreate, name_key},
};
use async_trait::async_trait;
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};
use tracing::{debug, instrument};

/// Stores products through a SeaORM connection.
#[derive(Debug, Clone)]
pub struct DatabaseProductRepository {
    db: DatabaseConnection,
}

impl DatabaseProductRepository {
    /// Wraps an open connection. Tables must already exist.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> Result<Option<product::Model>> {
        ProductEntity::find()
            .filter(ProductColumn::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl ProductRepository for DatabaseProductRepository {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: ProductCreate) -> Result<Product> {
        let row = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name_key: Set(name_key(&request.name)),
            name: Set(request.name),
            description: Set(request.description),
            price: Set(request.price),
            stock: Set(request.stock),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
            ..Default::default()
        };
        let model = row.insert(&self.db).await?;
        debug!(product_id = %model.id, seq = model.seq, "Inserted product row");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.find_model(id).await?.map(Into::into))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>> {
        let model = ProductEntity::find()
            .filter(ProductColumn::NameKey.eq(name_key(name)))
            .order_by_asc(ProductColumn::Seq)
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Product>> {
        let models = ProductEntity::find()
            .order_by_asc(ProductColumn::Seq)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
        let Some(model) = self.find_model(id).await? else {
            return Ok(None);
        };

        let mut merged: Product = model.clone().into();
        changes.apply_to(&mut merged, chrono::Utc::now());

        let mut row: product::ActiveModel = model.into();
        row.name_key = Set(name_key(&merged.name));
        row.name = Set(merged.name);
        row.description = Set(merged.description);
        row.price = Set(merged.price);
        row.stock = Set(merged.stock);
        row.updated_at = Set(merged.updated_at);

        let updated = row.update(&self.db).await?;
        Ok(Some(updated.into()))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = ProductEntity::delete_many()
            .filter(ProductColumn::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
