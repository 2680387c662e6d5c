//! Database configuration module for `LorBuddy`.
//!
//! The card and term tables are written by the data-load job and only read at
//! request time. `create_tables` exists for local databases and tests; it uses
//! `SeaORM`'s `Schema::create_table_from_entity` so the schema always matches
//! the entity definitions.

use crate::entities::{Card, Term};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Default location of the bundled read-only card database.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/lor_buddy.sqlite?mode=ro";

/// Establishes a connection to the card database.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    tracing::debug!("Connecting to card database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates the card and term tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let card_table = schema.create_table_from_entity(Card);
    let term_table = schema.create_table_from_entity(Term);

    db.execute(builder.build(&card_table)).await?;
    db.execute(builder.build(&term_table)).await?;

    Ok(())
}
