//! Product entity - A sellable menu item.
//!
//! Products link to the ingredients they consume through
//! [`super::product_ingredient`] recipe rows, which is what drives the
//! cost-analysis endpoint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product name, unique across the table
    #[sea_orm(unique)]
    pub name: String,
    /// Product category (e.g., "Coffee", "Tea")
    pub category: String,
    /// Selling price per unit in dollars
    pub selling_price: f64,
    /// Optional menu description
    pub description: Option<String>,
    /// Inactive products are hidden from listings but keep their history
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTime,
    /// When the product was last modified
    pub updated_at: DateTime,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Recipe rows describing the ingredients this product consumes
    #[sea_orm(has_many = "super::product_ingredient::Entity")]
    ProductIngredient,
}

impl Related<super::product_ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductIngredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
