//! SeaORM entities backing the database repository.

pub mod product;

pub use product::{Column as ProductColumn, Entity as ProductEntity, Model as ProductModel};
