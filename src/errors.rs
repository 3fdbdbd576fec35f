//! Unified error types and result handling.
//!
//! Two layers live here. [`ServiceError`] is the structured error the service
//! layer hands to the transport: it always carries a service name, a human
//! message, a machine-readable code and an HTTP-style status. [`Error`] covers
//! everything else that can go wrong underneath (configuration, storage, I/O);
//! the service boundary normalizes it into a [`ServiceError`] before it can
//! leave the crate's core.

use crate::models::FieldError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Code used when a structured error is built without an explicit code.
pub const DEFAULT_ERROR_CODE: &str = "APPLICATION_ERROR";
/// Status used when a structured error is built without an explicit status.
pub const DEFAULT_STATUS_CODE: u16 = 500;

/// Duplicate product name.
pub const PRODUCT_NAME_ALREADY_EXISTS: &str = "PRODUCT_NAME_ALREADY_EXISTS";
/// Unknown product id or name.
pub const PRODUCT_NOT_FOUND: &str = "PRODUCT_NOT_FOUND";
/// Malformed or constraint-violating input.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";

/// Discriminator value marking an application-level error on the wire.
pub const APPLICATION_ERROR_KIND: &str = "Application Service Error";

/// A structured, transport-ready error raised by a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceError {
    /// Name of the service that failed (e.g. `ProductService`)
    #[serde(rename = "service")]
    pub service_name: String,
    /// Human readable description
    pub message: String,
    /// Machine readable code
    pub error_code: String,
    /// HTTP-style status code
    pub status_code: u16,
}

impl ServiceError {
    /// Builds an error with the default code and a 500 status.
    pub fn new(service_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            message: message.into(),
            error_code: DEFAULT_ERROR_CODE.to_string(),
            status_code: DEFAULT_STATUS_CODE,
        }
    }

    /// Replaces the machine readable code.
    #[must_use]
    pub fn with_code(mut self, error_code: impl Into<String>) -> Self {
        self.error_code = error_code.into();
        self
    }

    /// Replaces the status code.
    #[must_use]
    pub const fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// A 404 `PRODUCT_NOT_FOUND`-style error.
    pub fn not_found(service_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(service_name, message)
            .with_code(PRODUCT_NOT_FOUND)
            .with_status(404)
    }

    /// A 409 `PRODUCT_NAME_ALREADY_EXISTS`-style error.
    pub fn conflict(service_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(service_name, message)
            .with_code(PRODUCT_NAME_ALREADY_EXISTS)
            .with_status(409)
    }

    /// Flat map of `service`, `message`, `error_code`, `status_code` and the
    /// constant `error` discriminator.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("service".into(), Value::from(self.service_name.clone()));
        map.insert("message".into(), Value::from(self.message.clone()));
        map.insert("error_code".into(), Value::from(self.error_code.clone()));
        map.insert("status_code".into(), Value::from(self.status_code));
        map.insert("error".into(), Value::from(APPLICATION_ERROR_KIND));
        map
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} Service] - {}", self.service_name, self.message)
    }
}

impl std::error::Error for ServiceError {}

/// Every failure below the service boundary.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Validation error: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// Convenience `Result` types
pub type Result<T> = std::result::Result<T, Error>;
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
