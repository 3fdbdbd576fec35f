//! Database configuration for the SeaORM-backed repository.
//!
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL.

use crate::entities::ProductEntity;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::info;

/// Connects to `database_url` and makes sure the tables exist.
///
/// # Errors
/// Returns an error if the connection or table creation fails.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    info!("Database connection ready");
    Ok(db)
}

/// Creates the `products` table if it is not already present.
///
/// # Errors
/// Returns an error if the statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut product_table = schema.create_table_from_entity(ProductEntity);
    product_table.if_not_exists();

    db.execute(builder.build(&product_table)).await?;
    Ok(())
}
