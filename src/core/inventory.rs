//! Inventory business logic - ingredient, product, and recipe operations.
//!
//! All CRUD here is synchronous within a single request: validate, write,
//! return. Uniqueness of ingredient and product names is checked up front so
//! callers get a 400 with a readable message instead of a bare constraint
//! violation.

use chrono::{NaiveDateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::{
    ingredient, product, product_ingredient, Ingredient, Product, ProductIngredient,
};
use crate::errors::{Error, Result};

/// An ingredient as served to clients, with the derived low-stock flag.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientView {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub stock_quantity: f64,
    pub reorder_level: f64,
    pub unit_cost: f64,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub is_low_stock: bool,
}

impl From<ingredient::Model> for IngredientView {
    fn from(m: ingredient::Model) -> Self {
        let is_low_stock = m.stock_quantity < m.reorder_level;
        Self {
            id: m.id,
            name: m.name,
            unit: m.unit,
            stock_quantity: m.stock_quantity,
            reorder_level: m.reorder_level,
            unit_cost: m.unit_cost,
            supplier: m.supplier,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
            is_low_stock,
        }
    }
}

/// Fields accepted when creating or updating an ingredient.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    pub unit: String,
    pub stock_quantity: f64,
    pub reorder_level: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Fields accepted when creating or updating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub selling_price: f64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields accepted when attaching an ingredient to a product.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeInput {
    pub ingredient_id: i64,
    pub quantity: f64,
}

/// A recipe row joined with its ingredient for display.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeView {
    pub id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub unit: String,
    pub quantity: f64,
    pub unit_cost: f64,
}

/// Cost breakdown and margin for one product.
#[derive(Debug, Clone, Serialize)]
pub struct CostAnalysis {
    pub product_id: i64,
    pub product_name: String,
    pub selling_price: f64,
    pub total_cost: f64,
    pub profit: f64,
    pub profit_margin: f64,
    pub ingredients_used: String,
}

/// An ingredient with its predicted demand and alert level.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryPrediction {
    pub product: String,
    pub current_stock: String,
    pub predicted_demand: String,
    pub demand_level: String,
    pub alert_level: String,
}

fn validate_ingredient(input: &IngredientInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Ingredient name cannot be empty"));
    }
    if input.stock_quantity < 0.0 || !input.stock_quantity.is_finite() {
        return Err(Error::validation("Stock quantity must be non-negative"));
    }
    if input.reorder_level < 0.0 || !input.reorder_level.is_finite() {
        return Err(Error::validation("Reorder level must be non-negative"));
    }
    Ok(())
}

/// Retrieves all ingredients, ordered alphabetically by name.
pub async fn list_ingredients(db: &DatabaseConnection) -> Result<Vec<IngredientView>> {
    let rows = Ingredient::find()
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Creates a new ingredient after validating the input and name uniqueness.
///
/// # Errors
/// Returns a validation error if the name is empty or taken, or if stock or
/// reorder levels are negative.
pub async fn create_ingredient(
    db: &DatabaseConnection,
    input: IngredientInput,
) -> Result<IngredientView> {
    validate_ingredient(&input)?;

    let name = input.name.trim().to_string();
    let existing = Ingredient::find()
        .filter(ingredient::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::validation(format!(
            "Ingredient {name:?} already exists"
        )));
    }

    let now = Utc::now().naive_utc();
    let model = ingredient::ActiveModel {
        name: Set(name),
        unit: Set(input.unit),
        stock_quantity: Set(input.stock_quantity),
        reorder_level: Set(input.reorder_level),
        unit_cost: Set(input.unit_cost),
        supplier: Set(input.supplier),
        notes: Set(input.notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(model.insert(db).await?.into())
}

/// Updates an existing ingredient in place.
pub async fn update_ingredient(
    db: &DatabaseConnection,
    ingredient_id: i64,
    input: IngredientInput,
) -> Result<IngredientView> {
    validate_ingredient(&input)?;

    let name = input.name.trim().to_string();
    let taken = Ingredient::find()
        .filter(ingredient::Column::Name.eq(name.as_str()))
        .filter(ingredient::Column::Id.ne(ingredient_id))
        .one(db)
        .await?;
    if taken.is_some() {
        return Err(Error::validation(format!(
            "Ingredient {name:?} already exists"
        )));
    }

    let mut model: ingredient::ActiveModel = Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Ingredient", ingredient_id))?
        .into();

    model.name = Set(name);
    model.unit = Set(input.unit);
    model.stock_quantity = Set(input.stock_quantity);
    model.reorder_level = Set(input.reorder_level);
    model.unit_cost = Set(input.unit_cost);
    model.supplier = Set(input.supplier);
    model.notes = Set(input.notes);
    model.updated_at = Set(Utc::now().naive_utc());

    Ok(model.update(db).await?.into())
}

/// Deletes an ingredient; its recipe rows cascade.
pub async fn delete_ingredient(db: &DatabaseConnection, ingredient_id: i64) -> Result<()> {
    let model = Ingredient::find_by_id(ingredient_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Ingredient", ingredient_id))?;
    model.delete(db).await?;
    Ok(())
}

fn validate_product(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::validation("Product name cannot be empty"));
    }
    if input.selling_price < 0.0 || !input.selling_price.is_finite() {
        return Err(Error::validation("Selling price must be non-negative"));
    }
    Ok(())
}

/// Retrieves all active products, ordered alphabetically by name.
pub async fn list_products(db: &DatabaseConnection) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::IsActive.eq(true))
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new product after validating the input and name uniqueness.
pub async fn create_product(
    db: &DatabaseConnection,
    input: ProductInput,
) -> Result<product::Model> {
    validate_product(&input)?;

    let name = input.name.trim().to_string();
    let existing = Product::find()
        .filter(product::Column::Name.eq(name.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::validation(format!("Product {name:?} already exists")));
    }

    let now = Utc::now().naive_utc();
    let model = product::ActiveModel {
        name: Set(name),
        category: Set(input.category),
        selling_price: Set(input.selling_price),
        description: Set(input.description),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Updates an existing product in place.
pub async fn update_product(
    db: &DatabaseConnection,
    product_id: i64,
    input: ProductInput,
) -> Result<product::Model> {
    validate_product(&input)?;

    let mut model: product::ActiveModel = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?
        .into();

    model.name = Set(input.name.trim().to_string());
    model.category = Set(input.category);
    model.selling_price = Set(input.selling_price);
    model.description = Set(input.description);
    model.updated_at = Set(Utc::now().naive_utc());

    model.update(db).await.map_err(Into::into)
}

/// Deletes a product; its recipe rows cascade.
pub async fn delete_product(db: &DatabaseConnection, product_id: i64) -> Result<()> {
    let model = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?;
    model.delete(db).await?;
    Ok(())
}

/// Lists a product's recipe rows joined with their ingredients.
pub async fn list_recipe(db: &DatabaseConnection, product_id: i64) -> Result<Vec<RecipeView>> {
    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?;

    let rows = ProductIngredient::find()
        .filter(product_ingredient::Column::ProductId.eq(product_id))
        .find_also_related(Ingredient)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(row, ing)| {
            ing.map(|ing| RecipeView {
                id: row.id,
                ingredient_id: ing.id,
                ingredient_name: ing.name,
                unit: ing.unit,
                quantity: row.quantity,
                unit_cost: ing.unit_cost,
            })
        })
        .collect())
}

/// Attaches an ingredient to a product with a per-unit quantity.
///
/// # Errors
/// Returns a validation error if the quantity is not positive or the pair
/// already exists, and a not-found error if either parent is missing.
pub async fn add_recipe_row(
    db: &DatabaseConnection,
    product_id: i64,
    input: RecipeInput,
) -> Result<product_ingredient::Model> {
    if input.quantity <= 0.0 || !input.quantity.is_finite() {
        return Err(Error::validation("Recipe quantity must be positive"));
    }

    Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?;
    Ingredient::find_by_id(input.ingredient_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Ingredient", input.ingredient_id))?;

    let existing = ProductIngredient::find()
        .filter(product_ingredient::Column::ProductId.eq(product_id))
        .filter(product_ingredient::Column::IngredientId.eq(input.ingredient_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::validation(
            "Ingredient is already part of this product's recipe",
        ));
    }

    let model = product_ingredient::ActiveModel {
        product_id: Set(product_id),
        ingredient_id: Set(input.ingredient_id),
        quantity: Set(input.quantity),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Updates the quantity of one recipe row.
pub async fn update_recipe_row(
    db: &DatabaseConnection,
    product_id: i64,
    ingredient_id: i64,
    quantity: f64,
) -> Result<product_ingredient::Model> {
    if quantity <= 0.0 || !quantity.is_finite() {
        return Err(Error::validation("Recipe quantity must be positive"));
    }

    let mut model: product_ingredient::ActiveModel = ProductIngredient::find()
        .filter(product_ingredient::Column::ProductId.eq(product_id))
        .filter(product_ingredient::Column::IngredientId.eq(ingredient_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Recipe row", ingredient_id))?
        .into();

    model.quantity = Set(quantity);
    model.update(db).await.map_err(Into::into)
}

/// Removes one ingredient from a product's recipe.
pub async fn delete_recipe_row(
    db: &DatabaseConnection,
    product_id: i64,
    ingredient_id: i64,
) -> Result<()> {
    let model = ProductIngredient::find()
        .filter(product_ingredient::Column::ProductId.eq(product_id))
        .filter(product_ingredient::Column::IngredientId.eq(ingredient_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Recipe row", ingredient_id))?;
    model.delete(db).await?;
    Ok(())
}

/// Computes the ingredient cost rollup and profit margin for one product.
pub async fn cost_analysis(db: &DatabaseConnection, product_id: i64) -> Result<CostAnalysis> {
    let product = Product::find_by_id(product_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Product", product_id))?;

    let recipe = list_recipe(db, product_id).await?;

    let total_cost: f64 = recipe.iter().map(|r| r.quantity * r.unit_cost).sum();
    let ingredients_used = recipe
        .iter()
        .map(|r| format!("{}: {} {}", r.ingredient_name, r.quantity, r.unit))
        .collect::<Vec<_>>()
        .join(", ");

    let profit = product.selling_price - total_cost;
    let profit_margin = if product.selling_price > 0.0 {
        (profit / product.selling_price * 100.0 * 100.0).round() / 100.0
    } else {
        0.0
    };

    Ok(CostAnalysis {
        product_id: product.id,
        product_name: product.name,
        selling_price: product.selling_price,
        total_cost,
        profit,
        profit_margin,
        ingredients_used,
    })
}

/// Predicts per-ingredient demand (1.5x reorder level) and assigns an alert
/// level from the current stock position.
pub async fn inventory_predictions(db: &DatabaseConnection) -> Result<Vec<InventoryPrediction>> {
    let rows = Ingredient::find()
        .order_by_asc(ingredient::Column::Name)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|i| {
            let predicted = if i.reorder_level > 0.0 {
                i.reorder_level * 1.5
            } else {
                i.stock_quantity + 10.0
            };

            let (alert_level, demand_level) = if i.stock_quantity < i.reorder_level {
                ("critical", "High Demand")
            } else if i.stock_quantity < i.reorder_level * 1.5 {
                ("warning", "Medium")
            } else {
                ("safe", "Low")
            };

            InventoryPrediction {
                product: i.name,
                current_stock: format!("{} {}", i.stock_quantity, i.unit),
                predicted_demand: format!("{} {}", predicted, i.unit),
                demand_level: demand_level.to_string(),
                alert_level: alert_level.to_string(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{ingredient_input, setup_test_db};

    #[tokio::test]
    async fn test_create_ingredient_and_low_stock_flag() -> Result<()> {
        let db = setup_test_db().await?;

        let created =
            create_ingredient(&db, ingredient_input("Oat Milk", "liters", 40.0, 10.0)).await?;
        assert!(!created.is_low_stock);

        let listed = list_ingredients(&db).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Oat Milk");
        assert!(!listed[0].is_low_stock);

        let low = create_ingredient(&db, ingredient_input("Beans", "kg", 2.0, 5.0)).await?;
        assert!(low.is_low_stock);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_ingredient_name_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        create_ingredient(&db, ingredient_input("Milk", "liters", 20.0, 5.0)).await?;

        let dup = create_ingredient(&db, ingredient_input("Milk", "liters", 1.0, 1.0)).await;
        assert!(matches!(dup.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_negative_stock_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_ingredient(&db, ingredient_input("Milk", "liters", -1.0, 5.0)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_ingredient_changes_low_stock() -> Result<()> {
        let db = setup_test_db().await?;
        let created =
            create_ingredient(&db, ingredient_input("Milk", "liters", 20.0, 5.0)).await?;

        let mut input = ingredient_input("Milk", "liters", 3.0, 5.0);
        input.notes = Some("running low".to_string());
        let updated = update_ingredient(&db, created.id, input).await?;
        assert!(updated.is_low_stock);
        assert_eq!(updated.notes.as_deref(), Some("running low"));
        Ok(())
    }

    #[tokio::test]
    async fn test_recipe_rows_and_cascade_on_product_delete() -> Result<()> {
        let db = setup_test_db().await?;
        let milk = create_ingredient(&db, ingredient_input("Milk", "liters", 20.0, 5.0)).await?;
        let product = create_product(
            &db,
            ProductInput {
                name: "Latte".to_string(),
                category: "Coffee".to_string(),
                selling_price: 4.5,
                description: None,
            },
        )
        .await?;

        add_recipe_row(
            &db,
            product.id,
            RecipeInput {
                ingredient_id: milk.id,
                quantity: 0.25,
            },
        )
        .await?;
        assert_eq!(list_recipe(&db, product.id).await?.len(), 1);

        // Same pair twice is rejected
        let dup = add_recipe_row(
            &db,
            product.id,
            RecipeInput {
                ingredient_id: milk.id,
                quantity: 0.5,
            },
        )
        .await;
        assert!(matches!(dup.unwrap_err(), Error::Validation { .. }));

        delete_product(&db, product.id).await?;
        let gone = list_recipe(&db, product.id).await;
        assert!(matches!(gone.unwrap_err(), Error::NotFound { .. }));

        use sea_orm::PaginatorTrait;
        assert_eq!(ProductIngredient::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cost_analysis() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = ingredient_input("Milk", "liters", 20.0, 5.0);
        input.unit_cost = 2.0;
        let milk = create_ingredient(&db, input).await?;

        let product = create_product(
            &db,
            ProductInput {
                name: "Latte".to_string(),
                category: "Coffee".to_string(),
                selling_price: 4.0,
                description: None,
            },
        )
        .await?;
        add_recipe_row(
            &db,
            product.id,
            RecipeInput {
                ingredient_id: milk.id,
                quantity: 0.5,
            },
        )
        .await?;

        let analysis = cost_analysis(&db, product.id).await?;
        assert_eq!(analysis.total_cost, 1.0);
        assert_eq!(analysis.profit, 3.0);
        assert_eq!(analysis.profit_margin, 75.0);
        assert!(analysis.ingredients_used.contains("Milk"));
        Ok(())
    }

    #[tokio::test]
    async fn test_inventory_predictions_alert_levels() -> Result<()> {
        let db = setup_test_db().await?;
        create_ingredient(&db, ingredient_input("Critical", "kg", 2.0, 5.0)).await?;
        create_ingredient(&db, ingredient_input("Warning", "kg", 6.0, 5.0)).await?;
        create_ingredient(&db, ingredient_input("Safe", "kg", 20.0, 5.0)).await?;

        let predictions = inventory_predictions(&db).await?;
        let by_name: std::collections::HashMap<_, _> = predictions
            .into_iter()
            .map(|p| (p.product.clone(), p))
            .collect();

        assert_eq!(by_name["Critical"].alert_level, "critical");
        assert_eq!(by_name["Warning"].alert_level, "warning");
        assert_eq!(by_name["Safe"].alert_level, "safe");
        Ok(())
    }
}
