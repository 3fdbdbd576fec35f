//! Request extractors that reject bad input with [`ApiError::Validation`].
//!
//! Everything a handler receives through these extractors has already passed
//! shape and field-rule checks, so the service only sees well-formed requests.

use crate::{
    api::error::ApiError,
    models::{FieldError, FieldShape, ProductCreate, ProductUpdate, shape_errors},
};
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

/// Default page size for listings.
pub const DEFAULT_LIMIT: u64 = 100;
/// Largest accepted page size.
pub const MAX_LIMIT: u64 = 1000;

/// Field rules checked before a body reaches a handler.
pub trait Validate {
    /// Expected JSON type of each body field.
    const SHAPE: &'static [FieldShape];

    /// # Errors
    /// Returns every violated rule.
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

impl Validate for ProductCreate {
    const SHAPE: &'static [FieldShape] = Self::FIELDS;

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        self.clone().validated().map(|_| ())
    }
}

impl Validate for ProductUpdate {
    const SHAPE: &'static [FieldShape] = Self::FIELDS;

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        self.clone().validated().map(|_| ())
    }
}

/// A JSON body that deserialized into `T` and passed `T`'s field rules.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(request, state)
            .await
            .map_err(json_rejection)?;

        let errors = shape_errors("body", &value, T::SHAPE);
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let payload: T = serde_json::from_value(value)
            .map_err(|e| ApiError::Validation(vec![FieldError::from_serde("body", &e)]))?;
        payload.validate()?;
        Ok(Self(payload))
    }
}

/// Malformed bodies are validation failures; anything else (an oversized
/// or unreadable body) keeps its transport status.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    let kind = match &rejection {
        JsonRejection::JsonSyntaxError(_) => "json_invalid",
        JsonRejection::JsonDataError(_) => "value_error",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        _ => return ApiError::from_status(rejection.status()),
    };
    ApiError::Validation(vec![FieldError::new("body", rejection.body_text(), kind)])
}

/// The `{product_id}` path segment, parsed as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ProductId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(vec![FieldError::new(
                    "path.product_id",
                    rejection.body_text(),
                    "value_error",
                )])
            })?;

        Uuid::parse_str(&raw).map(Self).map_err(|e| {
            ApiError::Validation(vec![FieldError::new(
                "path.product_id",
                format!("Input should be a valid UUID, {e}"),
                "uuid_parsing",
            )])
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawPagination {
    skip: Option<String>,
    limit: Option<String>,
}

/// `skip`/`limit` query parameters with their bounds enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    fn parse(skip: Option<&str>, limit: Option<&str>) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut pagination = Self::default();

        if let Some(raw) = skip {
            match parse_integer("query.skip", raw) {
                Ok(value) if value < 0 => errors.push(FieldError::new(
                    "query.skip",
                    "Input should be greater than or equal to 0",
                    "greater_than_equal",
                )),
                Ok(value) => pagination.skip = value.unsigned_abs(),
                Err(e) => errors.push(e),
            }
        }

        if let Some(raw) = limit {
            match parse_integer("query.limit", raw) {
                Ok(value) if value < 1 => errors.push(FieldError::new(
                    "query.limit",
                    "Input should be greater than or equal to 1",
                    "greater_than_equal",
                )),
                Ok(value) if value.unsigned_abs() > MAX_LIMIT => errors.push(FieldError::new(
                    "query.limit",
                    format!("Input should be less than or equal to {MAX_LIMIT}"),
                    "less_than_equal",
                )),
                Ok(value) => pagination.limit = value.unsigned_abs(),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(pagination)
        } else {
            Err(errors)
        }
    }
}

fn parse_integer(field: &str, raw: &str) -> Result<i64, FieldError> {
    raw.trim().parse::<i64>().map_err(|_| {
        FieldError::new(
            field,
            "Input should be a valid integer, unable to parse string as an integer",
            "int_parsing",
        )
    })
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<RawPagination>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(vec![FieldError::new(
                    "query",
                    rejection.body_text(),
                    "value_error",
                )])
            })?;

        Ok(Self::parse(raw.skip.as_deref(), raw.limit.as_deref())?)
    }
}
