//! HTTP layer: router assembly and handlers.

pub mod ai;
pub mod auth;
pub mod inventory;
pub mod sales;
pub mod settings;
pub mod state;

use axum::{
    http::{header::{AUTHORIZATION, CONTENT_TYPE}, Method},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use state::AppState;

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Coffee Sales Analytics API",
        "status": "running",
        "endpoints": {
            "/forecast": "GET - Returns sales forecast for next N days",
            "/ai-insights": "GET - Returns AI-generated insights",
            "/predictive-insights": "GET - Returns weather/holiday sales predictions",
            "/sales-data": "GET - Returns sales trend data",
            "/dashboard-metrics": "GET - Returns dashboard key metrics",
            "/best-selling": "GET - Returns best-selling product",
            "/inventory-predictions": "GET - Returns inventory demand predictions",
            "/customer-feedback": "GET - Returns recent customer feedback",
            "/barista-schedule": "GET - Returns barista schedule",
        }
    }))
}

/// Assembles the full application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(Any)
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(root))
        // Auth
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .route("/verify", get(auth::verify))
        // Sales and staffing
        .route("/dashboard-metrics", get(sales::dashboard_metrics))
        .route("/sales-data", get(sales::sales_data))
        .route("/best-selling", get(sales::best_selling))
        .route("/sales-analytics", get(sales::sales_analytics))
        .route("/cash-flow", get(sales::cash_flow))
        .route("/forecast", get(sales::forecast))
        .route("/barista-schedule", get(sales::barista_schedule))
        .route("/customer-feedback", get(sales::customer_feedback))
        // Inventory
        .route(
            "/ingredients",
            get(inventory::list_ingredients).post(inventory::create_ingredient),
        )
        .route(
            "/ingredients/:id",
            put(inventory::update_ingredient).delete(inventory::delete_ingredient),
        )
        .route(
            "/products",
            get(inventory::list_products).post(inventory::create_product),
        )
        .route(
            "/products/:id",
            put(inventory::update_product).delete(inventory::delete_product),
        )
        .route(
            "/products/:id/ingredients",
            get(inventory::list_recipe).post(inventory::add_recipe_row),
        )
        .route(
            "/products/:id/ingredients/:ingredient_id",
            put(inventory::update_recipe_row).delete(inventory::delete_recipe_row),
        )
        .route("/products/:id/cost-analysis", get(inventory::cost_analysis))
        .route("/inventory-predictions", get(inventory::inventory_predictions))
        // AI and external data
        .route("/ai-insights", get(ai::ai_insights))
        .route("/generate-insights", post(ai::generate_insights))
        .route("/predictive-insights", get(ai::predictive_insights))
        .route("/holidays", get(ai::holidays))
        .route("/weather-forecast", get(ai::weather_forecast))
        // Settings
        .route(
            "/settings/profile",
            get(settings::get_profile).put(settings::update_profile),
        )
        .route(
            "/settings/shop",
            get(settings::get_shop).put(settings::update_shop),
        )
        .route(
            "/settings/notifications",
            get(settings::get_notifications).put(settings::update_notifications),
        )
        .route("/settings/change-password", post(settings::change_password))
        .route("/settings/sessions", get(settings::get_sessions))
        .route("/settings/logout-session", post(settings::logout_session))
        .route(
            "/settings/logout-all-sessions",
            post(settings::logout_all_sessions),
        )
        .layer(cors)
        .with_state(state)
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let interrupt = async {
        if ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(error) => tracing::error!(%error, "Failed to install signal handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
