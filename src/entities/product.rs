//! Product entity - the `products` table behind the database repository.
//!
//! Rows are ordered by `seq`, an autoincrement key that records insertion
//! order. The public identifier is the separate, unique `id` column.
//! `name_key` holds the name folded in Rust, since SQLite's `lower()` only
//! folds ASCII.

use crate::models::Product;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Insertion sequence, used for stable list ordering
    #[sea_orm(primary_key)]
    pub seq: i64,
    /// Public product identifier
    #[sea_orm(unique)]
    pub id: Uuid,
    /// Name of the product (e.g., "Widget")
    pub name: String,
    /// Case-folded name, the column every name lookup filters on
    #[sea_orm(indexed)]
    pub name_key: String,
    /// Optional description
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: i64,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: Option<DateTimeUtc>,
}

/// Products have no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
