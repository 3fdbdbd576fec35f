//! HTTP layer - router, handlers, extractors and error mapping.
//!
//! The router is the only place where transport concerns meet the core:
//! handlers call the [`ProductController`], and every failure leaves through
//! [`ApiError`] so clients always receive a JSON error envelope.

/// Wire mapping for errors
pub mod error;
/// Validating extractors
pub mod extract;
/// Route handlers
pub mod handlers;
/// Request logging and error envelope middleware
pub mod middleware;

pub use error::ApiError;

use crate::{
    config::Settings,
    core::{HealthController, ProductController, ProductService},
    errors::{Error, Result},
    repository::ProductRepository,
};
use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method},
    middleware::from_fn,
    routing::get,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductController,
    pub health: HealthController,
}

impl AppState {
    /// Wires repository → service → controller.
    pub fn new(repository: Arc<dyn ProductRepository>, version: impl Into<String>) -> Self {
        Self {
            products: ProductController::new(ProductService::new(repository)),
            health: HealthController::new(version),
        }
    }
}

/// Builds the full router with all routes and middleware.
///
/// # Errors
/// Returns [`Error::Config`] if the CORS settings cannot be parsed.
pub fn build_router(state: AppState, settings: &Settings) -> Result<Router> {
    let prefix = settings.api_prefix.as_str();

    let collection = get(handlers::list_products).post(handlers::create_product);
    let item = get(handlers::get_product)
        .put(handlers::update_product)
        .patch(handlers::update_product)
        .delete(handlers::delete_product);

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/health/", get(handlers::health))
        .route(&format!("{prefix}/products"), collection.clone())
        .route(&format!("{prefix}/products/"), collection)
        .route(
            &format!("{prefix}/products/by-name/:name"),
            get(handlers::get_product_by_name),
        )
        .route(&format!("{prefix}/products/:product_id"), item);

    if !prefix.is_empty() {
        router = router
            .route(&format!("{prefix}/health"), get(handlers::health))
            .route(&format!("{prefix}/health/"), get(handlers::health));
    }

    let router = router.fallback(handlers::not_found).layer(
        ServiceBuilder::new()
            .layer(from_fn(middleware::log_requests))
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(settings)?)
            .layer(from_fn(middleware::error_envelope)),
    );

    Ok(router.with_state(state))
}

/// Builds the CORS layer. A `*` entry anywhere turns credentials off, since
/// browsers reject credentialed wildcard responses.
///
/// # Errors
/// Returns [`Error::Config`] for an unparsable origin, method or header.
pub fn cors_layer(settings: &Settings) -> Result<CorsLayer> {
    let is_wildcard = |items: &[String]| items.iter().any(|item| item.trim() == "*");
    let any_origin = is_wildcard(&settings.cors_origins);
    let any_method = is_wildcard(&settings.cors_allow_methods);
    let any_header = is_wildcard(&settings.cors_allow_headers);

    let origins = if any_origin {
        AllowOrigin::any()
    } else {
        settings
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin.trim().trim_end_matches('/'))
                    .map_err(|e| config_error("origin", origin, &e))
            })
            .collect::<Result<Vec<_>>>()?
            .into()
    };

    let methods = if any_method {
        AllowMethods::any()
    } else {
        settings
            .cors_allow_methods
            .iter()
            .map(|method| {
                Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
                    .map_err(|e| config_error("method", method, &e))
            })
            .collect::<Result<Vec<_>>>()?
            .into()
    };

    let headers = if any_header {
        AllowHeaders::any()
    } else {
        settings
            .cors_allow_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.trim().as_bytes())
                    .map_err(|e| config_error("header", name, &e))
            })
            .collect::<Result<Vec<_>>>()?
            .into()
    };

    let credentials =
        settings.cors_allow_credentials && !(any_origin || any_method || any_header);

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(credentials))
}

fn config_error(what: &str, value: &str, err: &dyn std::fmt::Display) -> Error {
    Error::Config {
        message: format!("Invalid CORS {what} {value:?}: {err}"),
    }
}
