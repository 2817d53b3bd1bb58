//! `ProductIngredient` entity - A recipe row linking a product to an ingredient.
//!
//! Each row states how much of one ingredient a single unit of a product
//! consumes. The (`product_id`, `ingredient_id`) pair is unique, and deleting
//! either parent cascades to its recipe rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Recipe row database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_ingredients")]
pub struct Model {
    /// Unique identifier for the recipe row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Product this row belongs to
    pub product_id: i64,
    /// Ingredient consumed by the product
    pub ingredient_id: i64,
    /// Quantity of the ingredient needed per unit of product, always positive
    pub quantity: f64,
}

/// Defines relationships between recipe rows and their parents
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each recipe row belongs to one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
    /// Each recipe row belongs to one ingredient
    #[sea_orm(
        belongs_to = "super::ingredient::Entity",
        from = "Column::IngredientId",
        to = "super::ingredient::Column::Id",
        on_delete = "Cascade"
    )]
    Ingredient,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::ingredient::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
