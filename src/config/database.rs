//! Database connection and table creation using SeaORM.
//!
//! Tables are generated from the entity definitions via
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs without hand-written SQL. The one exception is the composite
//! unique index on recipe rows, which entity derivation cannot express.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, PaginatorTrait, Schema, Set};
use tracing::info;

use crate::entities::{staff, Ingredient, Product, ProductIngredient, Staff, Transaction};
use crate::errors::Result;

/// Establishes a connection to the database.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    let db = Database::connect(database_url).await?;

    // SQLite enforces recipe-row cascades only with foreign keys enabled
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

    Ok(db)
}

/// Creates all tables from the entity definitions, if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    for mut table in [
        schema.create_table_from_entity(Transaction),
        schema.create_table_from_entity(Ingredient),
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(ProductIngredient),
        schema.create_table_from_entity(Staff),
    ] {
        db.execute(builder.build(table.if_not_exists())).await?;
    }

    // A product lists each ingredient at most once
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_product_ingredient_pair \
         ON product_ingredients (product_id, ingredient_id);",
    )
    .await?;

    Ok(())
}

/// Seeds the staff table with the initial barista roster when it is empty.
pub async fn seed_initial_staff(db: &DatabaseConnection) -> Result<()> {
    if Staff::find().count(db).await? > 0 {
        return Ok(());
    }

    let roster = [
        ("Sarah Ahmed", "barista", "08:00", "14:00", 4.8),
        ("Mike Rahman", "barista", "10:00", "16:00", 4.5),
        ("Emma Khan", "barista", "14:00", "20:00", 4.7),
        ("James Chowdhury", "barista", "16:00", "23:00", 4.3),
    ];

    for (name, role, start, end, score) in roster {
        let member = staff::ActiveModel {
            name: Set(name.to_string()),
            role: Set(role.to_string()),
            shift_start: Set(start.to_string()),
            shift_end: Set(end.to_string()),
            performance_score: Set(score),
            ..Default::default()
        };
        Staff::insert(member).exec(db).await?;
    }

    info!("Seeded initial barista roster");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        IngredientModel, ProductIngredientModel, ProductModel, StaffModel, TransactionModel,
    };
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist if they can be queried
        let _: Vec<TransactionModel> = Transaction::find().limit(1).all(&db).await?;
        let _: Vec<IngredientModel> = Ingredient::find().limit(1).all(&db).await?;
        let _: Vec<ProductModel> = Product::find().limit(1).all(&db).await?;
        let _: Vec<ProductIngredientModel> = ProductIngredient::find().limit(1).all(&db).await?;
        let _: Vec<StaffModel> = Staff::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_initial_staff_runs_once() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        seed_initial_staff(&db).await?;
        let first = Staff::find().count(&db).await?;
        assert!(first > 0);

        seed_initial_staff(&db).await?;
        assert_eq!(Staff::find().count(&db).await?, first);
        Ok(())
    }
}
