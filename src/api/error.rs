//! Wire mapping for the three failure categories.
//!
//! | Category | Status | `error` discriminator |
//! |---|---|---|
//! | [`ApiError::Service`] | the error's own status | `Application Service Error` |
//! | [`ApiError::Http`] | the transport status | `HTTP Exception` |
//! | [`ApiError::Validation`] | 422 | `Validation Error` |
//!
//! Every body also carries `timestamp` and the request `path`. The path is only
//! known to middleware, so [`IntoResponse`] renders a path-less body and
//! stashes the error in the response extensions; the
//! [`error_envelope`](super::middleware::error_envelope) layer re-renders it
//! with the path filled in.

use crate::{
    errors::{ServiceError, VALIDATION_ERROR},
    models::FieldError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Map, Value, json};

/// Fixed human message of every validation response.
pub const VALIDATION_MESSAGE: &str = "Validation error in the provided data";

/// An error on its way to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// A structured error raised by a service
    Service(ServiceError),
    /// A transport-level failure: unknown route, rejected method, ...
    Http { status: StatusCode, message: String },
    /// Malformed or constraint-violating input
    Validation(Vec<FieldError>),
}

impl ApiError {
    /// Transport error carrying the status's canonical reason as message.
    #[must_use]
    pub fn from_status(status: StatusCode) -> Self {
        Self::Http {
            status,
            message: status.canonical_reason().unwrap_or("HTTP Error").to_string(),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Service(err) => {
                StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::Http { status, .. } => *status,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    /// The JSON body, with `path` included when known.
    #[must_use]
    pub fn body(&self, path: Option<&str>) -> Value {
        let mut body = match self {
            Self::Service(err) => err.to_map(),
            Self::Http { status, message } => {
                let code = if *status == StatusCode::NOT_FOUND {
                    "NOT_FOUND"
                } else {
                    "HTTP_ERROR"
                };
                object(json!({
                    "error": "HTTP Exception",
                    "message": message,
                    "error_code": code,
                    "status_code": status.as_u16(),
                }))
            }
            Self::Validation(errors) => object(json!({
                "error": "Validation Error",
                "message": VALIDATION_MESSAGE,
                "error_code": VALIDATION_ERROR,
                "status_code": StatusCode::UNPROCESSABLE_ENTITY.as_u16(),
                "errors": errors,
            })),
        };

        body.insert("timestamp".into(), Value::from(Utc::now().to_rfc3339()));
        if let Some(path) = path {
            body.insert("path".into(), Value::from(path));
        }
        Value::Object(body)
    }

    /// A complete JSON response for the given request path.
    #[must_use]
    pub fn render(&self, path: &str) -> Response {
        (self.status(), Json(self.body(Some(path)))).into_response()
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body(None))).into_response();
        response.extensions_mut().insert(self);
        response
    }
}
