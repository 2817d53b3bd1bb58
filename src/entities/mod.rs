//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod ingredient;
pub mod product;
pub mod product_ingredient;
pub mod staff;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use ingredient::{Column as IngredientColumn, Entity as Ingredient, Model as IngredientModel};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use product_ingredient::{
    Column as ProductIngredientColumn, Entity as ProductIngredient,
    Model as ProductIngredientModel,
};
pub use staff::{Column as StaffColumn, Entity as Staff, Model as StaffModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
