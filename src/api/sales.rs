//! Sales, forecast, and staffing handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::core::{forecast, sales};
use crate::errors::Result;

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    #[serde(default = "default_period")]
    pub period: String,
}

fn default_period() -> String {
    "month".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    #[serde(default = "default_forecast_days")]
    pub days: u32,
}

fn default_forecast_days() -> u32 {
    7
}

pub async fn dashboard_metrics(State(state): State<AppState>) -> Result<Json<Value>> {
    let metrics = sales::dashboard_metrics(&state.db, state.settings.reference_date).await?;
    Ok(Json(json!(metrics)))
}

pub async fn sales_data(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Value>> {
    let days = sales::period_days(&query.period);
    let series =
        sales::sales_series(&state.db, state.settings.reference_date, days).await?;
    Ok(Json(json!({
        "period": query.period,
        "sales_data": series,
    })))
}

pub async fn best_selling(State(state): State<AppState>) -> Result<Json<Value>> {
    let best = sales::best_selling(&state.db, state.settings.reference_date).await?;
    match best {
        Some(best) => Ok(Json(json!(best))),
        None => Ok(Json(json!({
            "product_name": Value::Null,
            "message": "No sales recorded yet",
        }))),
    }
}

pub async fn sales_analytics(State(state): State<AppState>) -> Result<Json<Value>> {
    let analytics = sales::sales_analytics(&state.db, state.settings.reference_date).await?;
    Ok(Json(json!(analytics)))
}

pub async fn cash_flow(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Value>> {
    let points =
        sales::cash_flow(&state.db, state.settings.reference_date, &query.period).await?;
    Ok(Json(json!({
        "period": query.period,
        "cash_flow": points,
    })))
}

pub async fn forecast(
    State(state): State<AppState>,
    Query(query): Query<DaysQuery>,
) -> Result<Json<Value>> {
    let forecast =
        forecast::forecast(&state.db, state.settings.reference_date, query.days).await?;
    Ok(Json(json!(forecast)))
}

pub async fn barista_schedule(State(state): State<AppState>) -> Result<Json<Value>> {
    let schedule = sales::barista_schedule(&state.db).await?;
    Ok(Json(json!({ "schedule": schedule })))
}

pub async fn customer_feedback() -> Json<Value> {
    // No feedback table yet; the dashboard widget shows this canned list
    Json(json!({
        "feedback": [
            {
                "customer": "John D.",
                "rating": 5,
                "comment": "Best coffee in town! The service is excellent.",
                "date": "Today"
            },
            {
                "customer": "Sarah M.",
                "rating": 4,
                "comment": "Great ambiance, but wait time was a bit long.",
                "date": "Yesterday"
            },
            {
                "customer": "Mike R.",
                "rating": 5,
                "comment": "Amazing Iced Caramel Latte. Will come back!",
                "date": "2 days ago"
            }
        ]
    }))
}
