//! Ingredient entity - A stocked raw material.
//!
//! Ingredients carry a current stock level and a reorder threshold. The
//! low-stock flag shown to clients is derived on read: an ingredient is low
//! when `stock_quantity` drops below `reorder_level`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ingredient database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ingredients")]
pub struct Model {
    /// Unique identifier for the ingredient
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Ingredient name, unique across the table
    #[sea_orm(unique)]
    pub name: String,
    /// Unit of measure (e.g., "kg", "liters")
    pub unit: String,
    /// Current stock on hand, never negative
    pub stock_quantity: f64,
    /// Threshold below which the ingredient is flagged low-stock
    pub reorder_level: f64,
    /// Cost per unit in dollars
    pub unit_cost: f64,
    /// Supplier name, if recorded
    pub supplier: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// When the ingredient was created
    pub created_at: DateTime,
    /// When the ingredient was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Ingredient and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Recipe rows that reference this ingredient
    #[sea_orm(has_many = "super::product_ingredient::Entity")]
    ProductIngredient,
}

impl Related<super::product_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
