//! Shared test utilities for `DataBrew`.
//!
//! This module provides common helper functions for setting up test databases
//! and inserting test rows with sensible defaults.

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Set};

use crate::{
    core::inventory::IngredientInput,
    entities::{transaction, Transaction},
    errors::{Error, Result},
};

/// Fixed reference date used by tests so date arithmetic stays deterministic.
pub const REF_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2025, 6, 15) {
    Some(date) => date,
    None => panic!("invalid reference date"),
};

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Inserts a completed sale at the given date and hour of day.
pub async fn insert_sale(
    db: &DatabaseConnection,
    product_name: &str,
    category: &str,
    quantity: i32,
    unit_price: f64,
    date: NaiveDate,
    hour: u32,
) -> Result<()> {
    let transacted_at = date.and_hms_opt(hour, 0, 0).ok_or_else(|| Error::Config {
        message: format!("invalid hour {hour} in test sale"),
    })?;

    let sale = transaction::ActiveModel {
        product_name: Set(product_name.to_string()),
        product_category: Set(category.to_string()),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        transacted_at: Set(transacted_at),
        ..Default::default()
    };
    Transaction::insert(sale).exec(db).await?;
    Ok(())
}

/// Builds an ingredient input with sensible defaults.
///
/// # Defaults
/// * `unit_cost`: 1.0
/// * `supplier`: None
/// * `notes`: None
pub fn ingredient_input(
    name: &str,
    unit: &str,
    stock_quantity: f64,
    reorder_level: f64,
) -> IngredientInput {
    IngredientInput {
        name: name.to_string(),
        unit: unit.to_string(),
        stock_quantity,
        reorder_level,
        unit_cost: 1.0,
        supplier: None,
        notes: None,
    }
}
