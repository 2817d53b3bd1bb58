//! Inventory CRUD handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::core::inventory::{self, IngredientInput, ProductInput, RecipeInput};
use crate::errors::Result;

pub async fn list_ingredients(State(state): State<AppState>) -> Result<Json<Value>> {
    let ingredients = inventory::list_ingredients(&state.db).await?;
    Ok(Json(json!(ingredients)))
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    Json(input): Json<IngredientInput>,
) -> Result<Json<Value>> {
    let created = inventory::create_ingredient(&state.db, input).await?;
    Ok(Json(json!(created)))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<IngredientInput>,
) -> Result<Json<Value>> {
    let updated = inventory::update_ingredient(&state.db, id, input).await?;
    Ok(Json(json!(updated)))
}

pub async fn delete_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    inventory::delete_ingredient(&state.db, id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_products(State(state): State<AppState>) -> Result<Json<Value>> {
    let products = inventory::list_products(&state.db).await?;
    Ok(Json(json!(products)))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Value>> {
    let created = inventory::create_product(&state.db, input).await?;
    Ok(Json(json!(created)))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Value>> {
    let updated = inventory::update_product(&state.db, id, input).await?;
    Ok(Json(json!(updated)))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    inventory::delete_product(&state.db, id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn list_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let recipe = inventory::list_recipe(&state.db, id).await?;
    Ok(Json(json!(recipe)))
}

pub async fn add_recipe_row(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<RecipeInput>,
) -> Result<Json<Value>> {
    let row = inventory::add_recipe_row(&state.db, id, input).await?;
    Ok(Json(json!(row)))
}

#[derive(Debug, Deserialize)]
pub struct RecipeQuantity {
    pub quantity: f64,
}

pub async fn update_recipe_row(
    State(state): State<AppState>,
    Path((product_id, ingredient_id)): Path<(i64, i64)>,
    Json(input): Json<RecipeQuantity>,
) -> Result<Json<Value>> {
    let row =
        inventory::update_recipe_row(&state.db, product_id, ingredient_id, input.quantity).await?;
    Ok(Json(json!(row)))
}

pub async fn delete_recipe_row(
    State(state): State<AppState>,
    Path((product_id, ingredient_id)): Path<(i64, i64)>,
) -> Result<Json<Value>> {
    inventory::delete_recipe_row(&state.db, product_id, ingredient_id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn cost_analysis(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    let analysis = inventory::cost_analysis(&state.db, id).await?;
    Ok(Json(json!(analysis)))
}

pub async fn inventory_predictions(State(state): State<AppState>) -> Result<Json<Value>> {
    let predictions = inventory::inventory_predictions(&state.db).await?;
    Ok(Json(json!({ "predictions": predictions })))
}
