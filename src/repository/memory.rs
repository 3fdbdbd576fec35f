//! In-memory product storage.

use super::ProductRepository;
use crate::{
    errors::Result,
    models::{Product, ProductChanges, ProductCreate, name_key},
};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Keeps products in a vector so listing follows insertion order.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    #[instrument(skip(self, request), fields(name = %request.name))]
    async fn create(&self, request: ProductCreate) -> Result<Product> {
        let product = Product::from_create(Uuid::new_v4(), chrono::Utc::now(), request);
        self.products.write().await.push(product.clone());
        debug!(product_id = %product.id, "Stored product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.iter().find(|p| p.id == id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Product>> {
        let wanted = name_key(name);
        let products = self.products.read().await;
        Ok(products
            .iter()
            .find(|p| name_key(&p.name) == wanted)
            .cloned())
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Product>> {
        let products = self.products.read().await;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(products.iter().skip(skip).take(limit).cloned().collect())
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>> {
        let mut products = self.products.write().await;
        let Some(product) = products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        let mut updated = product.clone();
        changes.apply_to(&mut updated, chrono::Utc::now());
        *product = updated.clone();
        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut products = self.products.write().await;
        match products.iter().position(|p| p.id == id) {
            Some(index) => {
                products.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
