//! Transaction entity - A single sold line item.
//!
//! Transactions are append-only: they are written once at the point of sale
//! and never mutated afterwards. All sales aggregation (daily series,
//! dashboard metrics, insight summaries) reads from this table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Name of the product sold (e.g., "Iced Caramel Latte")
    pub product_name: String,
    /// Product category (e.g., "Coffee", "Tea", "Bakery")
    pub product_category: String,
    /// Number of units sold, always positive
    pub quantity: i32,
    /// Price per unit in dollars
    pub unit_price: f64,
    /// When the sale happened
    pub transacted_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
