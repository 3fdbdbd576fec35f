//! Product business logic - enforces catalog invariants on top of a repository.
//!
//! The service owns two domain rules: product names are unique
//! (case-insensitively) and operations on unknown ids fail with not-found.
//! Every public operation returns a [`ServiceResult`]; whatever goes wrong
//! underneath is normalized by [`handle_service_errors`] so callers only ever
//! see a [`ServiceError`].

use crate::{
    errors::{Error, Result, ServiceError, ServiceResult, VALIDATION_ERROR},
    models::{Product, ProductCreate, ProductUpdate},
    repository::ProductRepository,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Name reported in every error this service raises.
pub const SERVICE_NAME: &str = "ProductService";

const CREATE_ERROR: &str = "CREATE_ERROR";
const GET_ERROR: &str = "GET_ERROR";
const GET_ALL_ERROR: &str = "GET_ALL_ERROR";
const UPDATE_ERROR: &str = "UPDATE_ERROR";
const DELETE_ERROR: &str = "DELETE_ERROR";

/// Converts the outcome of a service operation into a [`ServiceResult`].
///
/// Structured errors pass through unchanged. Validation failures become a
/// 422 `VALIDATION_ERROR`. Anything else becomes a 500 carrying
/// `default_code`. Every failure is logged with the operation name.
pub fn handle_service_errors<T>(
    function: &str,
    default_code: &str,
    result: Result<T>,
) -> ServiceResult<T> {
    let err = match result {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    match err {
        Error::Service(service_error) => {
            if service_error.status_code >= 500 {
                error!(
                    function,
                    service = %service_error.service_name,
                    error_code = %service_error.error_code,
                    status_code = service_error.status_code,
                    "Service error: {}", service_error.message
                );
            } else {
                warn!(
                    function,
                    service = %service_error.service_name,
                    error_code = %service_error.error_code,
                    status_code = service_error.status_code,
                    "Service error: {}", service_error.message
                );
            }
            Err(service_error)
        }
        Error::Validation(ref errors) => {
            warn!(
                function,
                error_code = VALIDATION_ERROR,
                fields = errors.len(),
                "Validation error: {err}"
            );
            Err(ServiceError::new(SERVICE_NAME, err.to_string())
                .with_code(VALIDATION_ERROR)
                .with_status(422))
        }
        other => {
            error!(function, error_code = default_code, "Unexpected error: {other}");
            Err(ServiceError::new(SERVICE_NAME, format!("Error in {function}: {other}"))
                .with_code(default_code))
        }
    }
}

/// Product operations with uniqueness and existence checks.
#[derive(Clone)]
pub struct ProductService {
    repository: Arc<dyn ProductRepository>,
}

impl ProductService {
    /// Creates a service over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn ProductRepository>) -> Self {
        Self { repository }
    }

    /// Creates a product after checking that its name is free.
    ///
    /// # Errors
    /// - 409 `PRODUCT_NAME_ALREADY_EXISTS` if the name is taken
    /// - 422 `VALIDATION_ERROR` if the request breaks a field rule
    /// - 500 `CREATE_ERROR` if storage fails
    #[instrument(skip(self, request), fields(operation = "create_product"))]
    pub async fn create_product(&self, request: ProductCreate) -> ServiceResult<Product> {
        let result: Result<Product> = async {
            debug!("Creating product");
            let request = request.validated().map_err(Error::Validation)?;

            if self.repository.get_by_name(&request.name).await?.is_some() {
                return Err(name_taken(&request.name).into());
            }

            let product = self.repository.create(request).await?;
            info!(product_id = %product.id, "Product created");
            Ok(product)
        }
        .await;

        handle_service_errors("create_product", CREATE_ERROR, result)
    }

    /// Fetches a product by id.
    ///
    /// # Errors
    /// - 404 `PRODUCT_NOT_FOUND` if no product has this id
    /// - 500 `GET_ERROR` if storage fails
    #[instrument(skip(self), fields(operation = "get_product_by_id"))]
    pub async fn get_product_by_id(&self, id: Uuid) -> ServiceResult<Product> {
        let result: Result<Product> = async {
            debug!("Fetching product");
            self.repository
                .get_by_id(id)
                .await?
                .ok_or_else(|| not_found_by_id(id).into())
        }
        .await;

        handle_service_errors("get_product_by_id", GET_ERROR, result)
    }

    /// Fetches a product by name, ignoring case.
    ///
    /// # Errors
    /// - 404 `PRODUCT_NOT_FOUND` if no product has this name
    /// - 500 `GET_ERROR` if storage fails
    #[instrument(skip(self), fields(operation = "get_product_by_name"))]
    pub async fn get_product_by_name(&self, name: &str) -> ServiceResult<Product> {
        let result: Result<Product> = async {
            debug!("Fetching product");
            self.repository.get_by_name(name).await?.ok_or_else(|| {
                ServiceError::not_found(SERVICE_NAME, format!("Product with name '{name}' not found"))
                    .into()
            })
        }
        .await;

        handle_service_errors("get_product_by_name", GET_ERROR, result)
    }

    /// Lists products in insertion order.
    ///
    /// # Errors
    /// - 500 `GET_ALL_ERROR` if storage fails
    #[instrument(skip(self), fields(operation = "list_products"))]
    pub async fn list_products(&self, skip: u64, limit: u64) -> ServiceResult<Vec<Product>> {
        debug!("Listing products");
        let result = self.repository.list(skip, limit).await;
        handle_service_errors("list_products", GET_ALL_ERROR, result)
    }

    /// Applies a partial update.
    ///
    /// # Errors
    /// - 404 `PRODUCT_NOT_FOUND` if the id is unknown, checked before and after the write
    /// - 409 `PRODUCT_NAME_ALREADY_EXISTS` if the new name belongs to another product
    /// - 422 `VALIDATION_ERROR` if the request breaks a field rule
    /// - 500 `UPDATE_ERROR` if storage fails
    #[instrument(skip(self, update), fields(operation = "update_product"))]
    pub async fn update_product(&self, id: Uuid, update: ProductUpdate) -> ServiceResult<Product> {
        let result: Result<Product> = async {
            let changes = update.validated().map_err(Error::Validation)?;

            if self.repository.get_by_id(id).await?.is_none() {
                return Err(not_found_by_id(id).into());
            }

            if let Some(name) = &changes.name {
                if let Some(other) = self.repository.get_by_name(name).await? {
                    if other.id != id {
                        return Err(name_taken(name).into());
                    }
                }
            }

            let product = self.repository.update(id, changes).await?.ok_or_else(|| {
                ServiceError::not_found(
                    SERVICE_NAME,
                    format!("Product with ID {id} not found during update"),
                )
            })?;
            info!(product_id = %product.id, "Product updated");
            Ok(product)
        }
        .await;

        handle_service_errors("update_product", UPDATE_ERROR, result)
    }

    /// Deletes a product.
    ///
    /// # Errors
    /// - 404 `PRODUCT_NOT_FOUND` if nothing was removed
    /// - 500 `DELETE_ERROR` if storage fails
    #[instrument(skip(self), fields(operation = "delete_product"))]
    pub async fn delete_product(&self, id: Uuid) -> ServiceResult<()> {
        let result: Result<()> = async {
            debug!("Deleting product");
            if !self.repository.delete(id).await? {
                return Err(not_found_by_id(id).into());
            }
            info!(product_id = %id, "Product deleted");
            Ok(())
        }
        .await;

        handle_service_errors("delete_product", DELETE_ERROR, result)
    }
}

fn not_found_by_id(id: Uuid) -> ServiceError {
    ServiceError::not_found(SERVICE_NAME, format!("Product with ID {id} not found"))
}

fn name_taken(name: &str) -> ServiceError {
    ServiceError::conflict(SERVICE_NAME, format!("Product with name '{name}' already exists"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{
        errors::{PRODUCT_NAME_ALREADY_EXISTS, PRODUCT_NOT_FOUND},
        test_utils::{BrokenRepository, memory_service},
    };
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_product_returns_fresh_product() {
        let service = memory_service();
        let product = service
            .create_product(ProductCreate::new("Widget", 9.99).with_stock(3))
            .await
            .unwrap();

        assert_eq!(product.name, "Widget");
        assert!(product.updated_at.is_none());
        assert_eq!(service.get_product_by_id(product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_create_product_rejects_duplicate_name_ignoring_case_and_padding() {
        let service = memory_service();
        service
            .create_product(ProductCreate::new("Widget", 9.99))
            .await
            .unwrap();

        let err = service
            .create_product(ProductCreate::new("  wIdGeT ", 5.0))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 409);
        assert_eq!(err.error_code, PRODUCT_NAME_ALREADY_EXISTS);
        assert_eq!(err.service_name, SERVICE_NAME);
    }

    #[tokio::test]
    async fn test_create_product_validation_becomes_422() {
        let service = memory_service();
        let err = service
            .create_product(ProductCreate::new("   ", 9.99))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 422);
        assert_eq!(err.error_code, VALIDATION_ERROR);
        assert!(service.list_products(0, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lookups_fail_not_found() {
        let service = memory_service();

        let err = service.get_product_by_id(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.error_code, PRODUCT_NOT_FOUND);

        let err = service.get_product_by_name("nothing").await.unwrap_err();
        assert_eq!(err.status_code, 404);
        assert!(err.message.contains("'nothing'"));
    }

    #[tokio::test]
    async fn test_get_product_by_name_ignores_case() {
        let service = memory_service();
        let created = service
            .create_product(ProductCreate::new("Widget", 9.99))
            .await
            .unwrap();
        assert_eq!(service.get_product_by_name("WIDGET").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_update_product_changes_only_given_fields() {
        let service = memory_service();
        let created = service
            .create_product(ProductCreate::new("Widget", 9.99).with_stock(3))
            .await
            .unwrap();

        let updated = service
            .update_product(created.id, ProductUpdate::default().name("Gadget"))
            .await
            .unwrap();
        assert_eq!(updated.name, "Gadget");
        assert_eq!(updated.price, 9.99);
        assert_eq!(updated.stock, 3);
        assert!(updated.updated_at.unwrap() >= created.created_at);
    }

    #[tokio::test]
    async fn test_each_update_advances_updated_at() {
        let service = memory_service();
        let created = service
            .create_product(ProductCreate::new("Widget", 9.99))
            .await
            .unwrap();

        std::thread::sleep(Duration::from_millis(2));
        let first = service
            .update_product(created.id, ProductUpdate::default().stock(1))
            .await
            .unwrap();
        std::thread::sleep(Duration::from_millis(2));
        let second = service
            .update_product(created.id, ProductUpdate::default().stock(2))
            .await
            .unwrap();

        let first_at = first.updated_at.unwrap();
        let second_at = second.updated_at.unwrap();
        assert!(first_at > created.created_at);
        assert!(second_at > first_at);
        assert_eq!(second.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_product_allows_keeping_own_name() {
        let service = memory_service();
        let created = service
            .create_product(ProductCreate::new("Widget", 9.99))
            .await
            .unwrap();

        let updated = service
            .update_product(created.id, ProductUpdate::default().name("WIDGET").price(3.0))
            .await
            .unwrap();
        assert_eq!(updated.name, "WIDGET");
        assert_eq!(updated.price, 3.0);
    }

    #[tokio::test]
    async fn test_update_product_conflicts_with_other_product() {
        let service = memory_service();
        service
            .create_product(ProductCreate::new("Widget", 9.99))
            .await
            .unwrap();
        let gadget = service
            .create_product(ProductCreate::new("Gadget", 1.0))
            .await
            .unwrap();

        let err = service
            .update_product(gadget.id, ProductUpdate::default().name("widget"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 409);
        assert_eq!(
            service.get_product_by_id(gadget.id).await.unwrap().name,
            "Gadget"
        );
    }

    #[tokio::test]
    async fn test_update_unknown_product_fails_not_found() {
        let service = memory_service();
        let err = service
            .update_product(Uuid::new_v4(), ProductUpdate::default().stock(1))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 404);
        assert_eq!(err.error_code, PRODUCT_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_get_fails_not_found() {
        let service = memory_service();
        let created = service
            .create_product(ProductCreate::new("Widget", 9.99))
            .await
            .unwrap();

        service.delete_product(created.id).await.unwrap();
        assert_eq!(
            service.get_product_by_id(created.id).await.unwrap_err().status_code,
            404
        );
        assert_eq!(
            service.delete_product(created.id).await.unwrap_err().error_code,
            PRODUCT_NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_storage_failures_are_wrapped_as_500() {
        let service = ProductService::new(Arc::new(BrokenRepository));

        let err = service
            .create_product(ProductCreate::new("Widget", 9.99))
            .await
            .unwrap_err();
        assert_eq!(err.status_code, 500);
        assert_eq!(err.error_code, "CREATE_ERROR");
        assert!(err.message.starts_with("Error in create_product:"));

        let err = service.list_products(0, 10).await.unwrap_err();
        assert_eq!(err.error_code, "GET_ALL_ERROR");

        let err = service.delete_product(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.error_code, "DELETE_ERROR");
    }

    #[test]
    fn test_handle_service_errors_passes_structured_errors_through() {
        let original = ServiceError::conflict(SERVICE_NAME, "taken");
        let result: Result<()> = Err(original.clone().into());
        assert_eq!(
            handle_service_errors("op", "OP_ERROR", result).unwrap_err(),
            original
        );
    }

    #[test]
    fn test_handle_service_errors_wraps_internal_errors() {
        let result: Result<()> = Err(Error::Config {
            message: "bad".to_string(),
        });
        let err = handle_service_errors("op", "OP_ERROR", result).unwrap_err();
        assert_eq!(err.status_code, 500);
        assert_eq!(err.error_code, "OP_ERROR");
        assert_eq!(err.message, "Error in op: Configuration error: bad");
    }
}
