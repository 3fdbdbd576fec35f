//! Controllers - the thin layer the HTTP handlers call into.

use crate::{
    core::product::ProductService,
    errors::ServiceResult,
    models::{Product, ProductCreate, ProductUpdate},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Forwards product requests to the [`ProductService`].
#[derive(Clone)]
pub struct ProductController {
    service: ProductService,
}

impl ProductController {
    #[must_use]
    pub const fn new(service: ProductService) -> Self {
        Self { service }
    }

    pub async fn create(&self, request: ProductCreate) -> ServiceResult<Product> {
        self.service.create_product(request).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Product> {
        self.service.get_product_by_id(id).await
    }

    pub async fn get_by_name(&self, name: &str) -> ServiceResult<Product> {
        self.service.get_product_by_name(name).await
    }

    pub async fn get_all(&self, skip: u64, limit: u64) -> ServiceResult<Vec<Product>> {
        self.service.list_products(skip, limit).await
    }

    pub async fn update(&self, id: Uuid, update: ProductUpdate) -> ServiceResult<Product> {
        self.service.update_product(id, update).await
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<()> {
        self.service.delete_product(id).await
    }
}

/// Body of the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Reports liveness along with the running version.
#[derive(Debug, Clone)]
pub struct HealthController {
    version: String,
}

impl HealthController {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    #[must_use]
    pub fn check(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            version: self.version.clone(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
