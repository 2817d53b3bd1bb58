//! Router-level integration tests exercising the HTTP surface end to end
//! against an in-memory database, with all external APIs pointed at
//! unreachable hosts so fallbacks are exercised.

#![allow(clippy::unwrap_used)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::{json, Value};
use tower::ServiceExt;

use databrew::api::{build_router, AppState};
use databrew::config::{database, Settings, ShopProfile};
use databrew::entities::{transaction, ProductIngredient, Transaction};

const REF_DATE: &str = "2025-06-15";

fn test_settings() -> Settings {
    Settings {
        database_url: "sqlite::memory:".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        llm_api_key: None,
        llm_api_base: "http://llm.example.invalid/v1".to_string(),
        llm_model: "test-model".to_string(),
        weather_api_key: None,
        weather_api_base: "http://weather.example.invalid".to_string(),
        holiday_api_base: "http://holidays.example.invalid".to_string(),
        holiday_country: "BD".to_string(),
        admin_email: "admin@gmail.com".to_string(),
        admin_password: "admin123".to_string(),
        token_expiry_days: 7,
        reference_date: NaiveDate::parse_from_str(REF_DATE, "%Y-%m-%d").unwrap(),
    }
}

async fn test_app() -> (Router, sea_orm::DatabaseConnection) {
    let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
    db.execute_unprepared("PRAGMA foreign_keys = ON;")
        .await
        .unwrap();
    database::create_tables(&db).await.unwrap();
    database::seed_initial_staff(&db).await.unwrap();

    let state = AppState::new(db.clone(), test_settings(), ShopProfile::default()).unwrap();
    (build_router(state), db)
}

async fn insert_sale(db: &sea_orm::DatabaseConnection, name: &str, quantity: i32, price: f64) {
    let date = NaiveDate::parse_from_str(REF_DATE, "%Y-%m-%d").unwrap();
    let sale = transaction::ActiveModel {
        product_name: Set(name.to_string()),
        product_category: Set("Coffee".to_string()),
        quantity: Set(quantity),
        unit_price: Set(price),
        transacted_at: Set(date.and_hms_opt(9, 0, 0).unwrap()),
        ..Default::default()
    };
    Transaction::insert(sale).exec(db).await.unwrap();
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

async fn login(app: &Router) -> String {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/login",
            &json!({"email": "admin@gmail.com", "password": "admin123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_root_reports_status() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
}

#[tokio::test]
async fn test_sales_data_point_count_matches_period() {
    let (app, db) = test_app().await;
    insert_sale(&db, "Latte", 2, 4.5).await;

    for (period, expected) in [("today", 1), ("week", 7), ("month", 30), ("bogus", 30)] {
        let (status, body) = send(&app, get(&format!("/sales-data?period={period}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["sales_data"].as_array().unwrap().len(),
            expected,
            "period {period}"
        );
        assert_eq!(body["period"], *period);
    }
}

#[tokio::test]
async fn test_dashboard_metrics_shape() {
    let (app, db) = test_app().await;
    insert_sale(&db, "Latte", 2, 4.5).await;

    let (status, body) = send(&app, get("/dashboard-metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_sales"], 9.0);
    assert_eq!(body["total_customers"], 1);
    assert_eq!(body["active_baristas"], 4);
    assert_eq!(body["sales_sparkline"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_generate_insights_never_empty_without_llm() {
    let (app, _db) = test_app().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/generate-insights", &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["insights"].as_array().unwrap().is_empty());
    assert!(body["generated_at"].is_string());
}

#[tokio::test]
async fn test_ai_insights_fall_back_without_llm() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, get("/ai-insights")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["insights"].as_array().unwrap().is_empty());
    assert!(body["source_data"].is_object());
}

#[tokio::test]
async fn test_predictive_insights_fall_back_without_upstreams() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, get("/predictive-insights")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["summary"].is_object());
    assert!(body["weather_insights"].is_array());
    assert_eq!(body["data_sources"]["weather_days"], 30);
}

#[tokio::test]
async fn test_holidays_and_weather_degrade_to_fallback_not_5xx() {
    let (app, _db) = test_app().await;

    let (status, body) = send(&app, get("/holidays?days=30")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert!(body["holidays"].is_array());

    let (status, body) = send(&app, get("/weather-forecast?days=30")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "fallback");
    assert_eq!(body["forecast"].as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn test_ingredient_lifecycle_and_duplicate_rejection() {
    let (app, _db) = test_app().await;

    let input = json!({
        "name": "Oat Milk",
        "unit": "liters",
        "stock_quantity": 40.0,
        "reorder_level": 10.0
    });

    let (status, created) = send(&app, json_request("POST", "/ingredients", &input)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["is_low_stock"], false);

    // Duplicate name is a 400 with a detail message
    let (status, body) = send(&app, json_request("POST", "/ingredients", &input)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("Oat Milk"));

    let (status, listed) = send(&app, get("/ingredients")).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "Oat Milk");
    assert_eq!(listed[0]["is_low_stock"], false);
}

#[tokio::test]
async fn test_product_delete_cascades_recipe_rows() {
    let (app, db) = test_app().await;

    let (_, ingredient) = send(
        &app,
        json_request(
            "POST",
            "/ingredients",
            &json!({"name": "Milk", "unit": "liters", "stock_quantity": 20.0, "reorder_level": 5.0}),
        ),
    )
    .await;
    let (_, product) = send(
        &app,
        json_request(
            "POST",
            "/products",
            &json!({"name": "Latte", "category": "Coffee", "selling_price": 4.5}),
        ),
    )
    .await;

    let product_id = product["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/products/{product_id}/ingredients"),
            &json!({"ingredient_id": ingredient["id"], "quantity": 0.25}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ProductIngredient::find().count(&db).await.unwrap(), 1);

    let (status, _) = send(
        &app,
        Request::builder()
            .method("DELETE")
            .uri(format!("/products/{product_id}"))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ProductIngredient::find().count(&db).await.unwrap(), 0);

    // Recipe listing for the deleted product is now a 404
    let (status, _) = send(&app, get(&format!("/products/{product_id}/ingredients"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cost_analysis_endpoint() {
    let (app, _db) = test_app().await;

    let (_, ingredient) = send(
        &app,
        json_request(
            "POST",
            "/ingredients",
            &json!({"name": "Milk", "unit": "liters", "stock_quantity": 20.0, "reorder_level": 5.0, "unit_cost": 2.0}),
        ),
    )
    .await;
    let (_, product) = send(
        &app,
        json_request(
            "POST",
            "/products",
            &json!({"name": "Latte", "category": "Coffee", "selling_price": 4.0}),
        ),
    )
    .await;
    let product_id = product["id"].as_i64().unwrap();
    send(
        &app,
        json_request(
            "POST",
            &format!("/products/{product_id}/ingredients"),
            &json!({"ingredient_id": ingredient["id"], "quantity": 0.5}),
        ),
    )
    .await;

    let (status, body) = send(&app, get(&format!("/products/{product_id}/cost-analysis"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_cost"], 1.0);
    assert_eq!(body["profit"], 3.0);
    assert_eq!(body["profit_margin"], 75.0);
}

#[tokio::test]
async fn test_auth_flow() {
    let (app, _db) = test_app().await;

    // Wrong credentials
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/login",
            &json!({"email": "admin@gmail.com", "password": "nope"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Registration is disabled
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            &json!({"email": "new@user.com", "password": "pw", "full_name": "New User"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = login(&app).await;

    let (status, body) = send(&app, authed(get("/verify"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["user"]["email"], "admin@gmail.com");

    // Logout invalidates the token
    let (status, _) = send(
        &app,
        authed(
            Request::builder()
                .method("POST")
                .uri("/logout")
                .body(Body::empty())
                .unwrap(),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, authed(get("/verify"), &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_settings_require_auth() {
    let (app, _db) = test_app().await;

    let (status, _) = send(&app, get("/settings/shop")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = login(&app).await;
    let (status, body) = send(&app, authed(get("/settings/shop"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shopName"], "DataBrew Coffee House");
}

#[tokio::test]
async fn test_change_password_validates_current() {
    let (app, _db) = test_app().await;
    let token = login(&app).await;

    let (status, _) = send(
        &app,
        authed(
            json_request(
                "POST",
                "/settings/change-password",
                &json!({
                    "currentPassword": "wrong",
                    "newPassword": "next123",
                    "confirmPassword": "next123"
                }),
            ),
            &token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_forecast_defaults_to_seven_days() {
    let (app, db) = test_app().await;
    insert_sale(&db, "Latte", 2, 5.0).await;

    let (status, body) = send(&app, get("/forecast")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["forecast_next_days"].as_array().unwrap().len(), 7);
    assert_eq!(body["days_forecasted"], 7);
}

#[tokio::test]
async fn test_barista_schedule_lists_seeded_roster() {
    let (app, _db) = test_app().await;
    let (status, body) = send(&app, get("/barista-schedule")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schedule"].as_array().unwrap().len(), 4);
}
