//! Storage capability for products.
//!
//! A repository owns the canonical collection and hands out copies. It knows
//! nothing about uniqueness rules or HTTP; the service layer enforces those.

mod database;
mod memory;

pub use database::DatabaseProductRepository;
pub use memory::InMemoryProductRepository;

use crate::{
    errors::Result,
    models::{Product, ProductChanges, ProductCreate},
};
use async_trait::async_trait;
use uuid::Uuid;

/// Operations every product storage backend provides.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Stores a new product with a fresh id and creation timestamp.
    async fn create(&self, request: ProductCreate) -> Result<Product>;

    /// Looks a product up by id.
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    /// Case-insensitive exact name match; the first match wins.
    async fn get_by_name(&self, name: &str) -> Result<Option<Product>>;

    /// At most `limit` products in insertion order, starting at `skip`.
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<Product>>;

    /// Merges `changes` onto the stored product and refreshes `updated_at`.
    /// Returns `None` without touching anything when the id is unknown.
    async fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Option<Product>>;

    /// Removes the product, reporting whether anything was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
