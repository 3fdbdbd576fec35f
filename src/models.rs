//! Product data model and field-level validation rules.
//!
//! [`Product`] is the stored value. [`ProductCreate`] and [`ProductUpdate`] are
//! the request shapes accepted from callers; both must pass validation before
//! they reach a repository. Validation never stops at the first problem: it
//! collects one [`FieldError`] per violated rule so a caller can fix
//! everything in one round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, error::Category};
use uuid::Uuid;

/// Longest accepted product name, in characters.
pub const NAME_MAX_LENGTH: usize = 200;
/// Longest accepted product description, in characters.
pub const DESCRIPTION_MAX_LENGTH: usize = 1000;

/// A product as stored by a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Server-generated identifier, immutable after creation
    pub id: Uuid,
    /// Trimmed, non-empty name; unique case-insensitively
    pub name: String,
    /// Optional free text
    pub description: Option<String>,
    /// Unit price, always greater than zero
    pub price: f64,
    /// Units in stock, never negative
    pub stock: i64,
    /// When the product was created
    pub created_at: DateTime<Utc>,
    /// When the product was last modified; `None` until the first update
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Builds a fresh product from a validated creation request.
    #[must_use]
    pub fn from_create(id: Uuid, created_at: DateTime<Utc>, request: ProductCreate) -> Self {
        Self {
            id,
            name: request.name,
            description: request.description,
            price: request.price,
            stock: request.stock,
            created_at,
            updated_at: None,
        }
    }
}

/// Case-folded form of a product name, used for uniqueness and lookups.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.to_lowercase()
}

/// One violated input rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted location, e.g. `body.price` or `query.limit`
    pub field: String,
    /// Human readable explanation
    pub message: String,
    /// Failure tag, e.g. `missing` or `greater_than`
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind: kind.into(),
        }
    }

    /// Translates a JSON (de)serialization failure found under `location`.
    ///
    /// Missing fields are reported on their own path; every other problem is
    /// reported on `location` itself. Request bodies go through
    /// [`shape_errors`] first, so this only sees failures it cannot place.
    #[must_use]
    pub fn from_serde(location: &str, err: &serde_json::Error) -> Self {
        let text = err.to_string();
        let message = text.split(" at line ").next().unwrap_or_default().to_string();

        match err.classify() {
            Category::Data => missing_field(&message).map_or_else(
                || Self::new(location, message.clone(), "type_error"),
                |field| Self::new(format!("{location}.{field}"), "Field required", "missing"),
            ),
            Category::Syntax | Category::Eof | Category::Io => {
                Self::new(location, message, "json_invalid")
            }
        }
    }
}

fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.strip_suffix('`')
}

/// JSON type a request field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    String,
    /// Any JSON number
    Number,
    /// A number that fits in `i64`
    Integer,
}

/// Declared shape of one field of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldShape {
    pub name: &'static str,
    pub kind: JsonKind,
    pub required: bool,
    /// Whether an explicit `null` passes the shape check
    pub nullable: bool,
}

impl FieldShape {
    const fn new(name: &'static str, kind: JsonKind, required: bool, nullable: bool) -> Self {
        Self {
            name,
            kind,
            required,
            nullable,
        }
    }
}

/// Checks a raw JSON body against `fields`, reporting every bad field.
///
/// Unknown keys are ignored. A body that is not an object yields a single
/// error on `location`.
#[must_use]
pub fn shape_errors(location: &str, value: &Value, fields: &[FieldShape]) -> Vec<FieldError> {
    let Some(object) = value.as_object() else {
        return vec![FieldError::new(
            location,
            "Input should be a valid dictionary or object",
            "type_error",
        )];
    };

    fields
        .iter()
        .filter_map(|shape| {
            let path = format!("{location}.{}", shape.name);
            match object.get(shape.name) {
                None if shape.required => Some(FieldError::new(path, "Field required", "missing")),
                None => None,
                Some(Value::Null) if shape.nullable => None,
                Some(field) => type_mismatch(shape.kind, field).map(|message| {
                    FieldError::new(path, message, "type_error")
                }),
            }
        })
        .collect()
}

fn type_mismatch(kind: JsonKind, value: &Value) -> Option<&'static str> {
    match kind {
        JsonKind::String if !value.is_string() => Some("Input should be a valid string"),
        JsonKind::Number if !value.is_number() => Some("Input should be a valid number"),
        JsonKind::Integer if value.as_i64().is_none() => Some("Input should be a valid integer"),
        _ => None,
    }
}

/// Payload for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
}

impl ProductCreate {
    /// Field types accepted in a creation body.
    pub const FIELDS: &'static [FieldShape] = &[
        FieldShape::new("name", JsonKind::String, true, false),
        FieldShape::new("description", JsonKind::String, false, true),
        FieldShape::new("price", JsonKind::Number, true, false),
        FieldShape::new("stock", JsonKind::Integer, false, false),
    ];

    /// A request with no description and zero stock.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            stock: 0,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    /// Checks every field and returns the request with its name trimmed.
    ///
    /// # Errors
    /// Returns every violated rule, located under `body.<field>`.
    pub fn validated(self) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match check_name(&self.name) {
            Ok(name) => name,
            Err(e) => {
                errors.push(e);
                self.name
            }
        };
        if let Some(description) = &self.description {
            errors.extend(check_description(description).err());
        }
        errors.extend(check_price(self.price).err());
        errors.extend(check_stock(self.stock).err());

        if errors.is_empty() {
            Ok(Self { name, ..self })
        } else {
            Err(errors)
        }
    }
}

/// Payload for a partial update.
///
/// Each field is tri-state: absent (`None`), explicitly null (`Some(None)`)
/// or set (`Some(Some(v))`). Only `description` may be cleared with null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub name: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub price: Option<Option<f64>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub stock: Option<Option<i64>>,
}

impl ProductUpdate {
    /// Field types accepted in an update body. Nulls pass here and are
    /// judged per field by [`ProductUpdate::validated`].
    pub const FIELDS: &'static [FieldShape] = &[
        FieldShape::new("name", JsonKind::String, false, true),
        FieldShape::new("description", JsonKind::String, false, true),
        FieldShape::new("price", JsonKind::Number, false, true),
        FieldShape::new("stock", JsonKind::Integer, false, true),
    ];

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Some(name.into()));
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    #[must_use]
    pub const fn price(mut self, price: f64) -> Self {
        self.price = Some(Some(price));
        self
    }

    #[must_use]
    pub const fn stock(mut self, stock: i64) -> Self {
        self.stock = Some(Some(stock));
        self
    }

    /// Checks every supplied field and produces the set of changes to merge.
    ///
    /// # Errors
    /// Returns every violated rule, located under `body.<field>`.
    pub fn validated(self) -> Result<ProductChanges, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut changes = ProductChanges::default();

        match self.name {
            None => {}
            Some(None) => errors.push(null_forbidden("name")),
            Some(Some(name)) => match check_name(&name) {
                Ok(name) => changes.name = Some(name),
                Err(e) => errors.push(e),
            },
        }

        if let Some(description) = self.description {
            if let Some(text) = &description {
                errors.extend(check_description(text).err());
            }
            changes.description = Some(description);
        }

        match self.price {
            None => {}
            Some(None) => errors.push(null_forbidden("price")),
            Some(Some(price)) => match check_price(price) {
                Ok(()) => changes.price = Some(price),
                Err(e) => errors.push(e),
            },
        }

        match self.stock {
            None => {}
            Some(None) => errors.push(null_forbidden("stock")),
            Some(Some(stock)) => match check_stock(stock) {
                Ok(()) => changes.stock = Some(stock),
                Err(e) => errors.push(e),
            },
        }

        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }
}

/// A validated partial update. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl ProductChanges {
    /// Merges the supplied fields onto `product` and stamps `updated_at`.
    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        product.updated_at = Some(now);
    }
}

fn check_name(raw: &str) -> Result<String, FieldError> {
    let length = raw.chars().count();
    if length < 1 {
        return Err(FieldError::new(
            "body.name",
            "String should have at least 1 character",
            "string_too_short",
        ));
    }
    if length > NAME_MAX_LENGTH {
        return Err(FieldError::new(
            "body.name",
            format!("String should have at most {NAME_MAX_LENGTH} characters"),
            "string_too_long",
        ));
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new(
            "body.name",
            "Value error, Name cannot be only whitespace",
            "value_error",
        ));
    }
    Ok(trimmed.to_string())
}

fn check_description(description: &str) -> Result<(), FieldError> {
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        return Err(FieldError::new(
            "body.description",
            format!("String should have at most {DESCRIPTION_MAX_LENGTH} characters"),
            "string_too_long",
        ));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), FieldError> {
    if !price.is_finite() {
        return Err(FieldError::new(
            "body.price",
            "Input should be a finite number",
            "finite_number",
        ));
    }
    if price <= 0.0 {
        return Err(FieldError::new(
            "body.price",
            "Input should be greater than 0",
            "greater_than",
        ));
    }
    Ok(())
}

fn check_stock(stock: i64) -> Result<(), FieldError> {
    if stock < 0 {
        return Err(FieldError::new(
            "body.stock",
            "Input should be greater than or equal to 0",
            "greater_than_equal",
        ));
    }
    Ok(())
}

fn null_forbidden(field: &str) -> FieldError {
    FieldError::new(
        format!("body.{field}"),
        "Input should not be null",
        "none_forbidden",
    )
}
