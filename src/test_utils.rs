//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases,
//! services over fresh repositories, and seeded product collections.

use crate::{
    core::ProductService,
    errors::{Error, Result},
    models::{Product, ProductChanges, ProductCreate},
    repository::{InMemoryProductRepository, ProductRepository},
};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

/// Creates an in-memory `SQLite` database with all tables initialized.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A service over an empty in-memory repository.
pub fn memory_service() -> ProductService {
    ProductService::new(Arc::new(InMemoryProductRepository::new()))
}

/// Inserts `count` products named `Product 0..count` and returns them in order.
///
/// # Defaults
/// * price: 10.0 + index
/// * stock: index
pub async fn seed_products<R: ProductRepository>(repo: &R, count: usize) -> Result<Vec<Product>> {
    let mut created = Vec::with_capacity(count);
    for index in 0..count {
        let request = ProductCreate::new(format!("Product {index}"), 10.0 + index as f64)
            .with_stock(i64::try_from(index).unwrap_or(i64::MAX));
        created.push(repo.create(request).await?);
    }
    Ok(created)
}

/// A repository whose every operation fails, for exercising error wrapping.
pub struct BrokenRepository;

fn broken() -> Error {
    Error::Config {
        message: "storage unavailable".to_string(),
    }
}

#[async_trait]
impl ProductRepository for BrokenRepository {
    async fn create(&self, _request: ProductCreate) -> Result<Product> {
        Err(broken())
    }

    async fn get_by_id(&self, _id: Uuid) -> Result<Option<Product>> {
        Err(broken())
    }

    async fn get_by_name(&self, _name: &str) -> Result<Option<Product>> {
        Err(broken())
    }

    async fn list(&self, _skip: u64, _limit: u64) -> Result<Vec<Product>> {
        Err(broken())
    }

    async fn update(&self, _id: Uuid, _changes: ProductChanges) -> Result<Option<Product>> {
        Err(broken())
    }

    async fn delete(&self, _id: Uuid) -> Result<bool> {
        Err(broken())
    }
}
