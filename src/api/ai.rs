//! Insight, prediction, holiday, and weather handlers.
//!
//! Everything here degrades to a fallback payload instead of failing, except
//! for database errors.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::state::AppState;
use crate::core::{insights, predictive};
use crate::errors::Result;

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    #[serde(default = "default_window_days")]
    pub days: i64,
}

fn default_window_days() -> i64 {
    30
}

pub async fn ai_insights(State(state): State<AppState>) -> Result<Json<Value>> {
    let response =
        insights::generate_insights(&state.db, &state.llm, state.settings.reference_date).await?;
    Ok(Json(json!(response)))
}

pub async fn generate_insights(State(state): State<AppState>) -> Result<Json<Value>> {
    let response =
        insights::generate_insights(&state.db, &state.llm, state.settings.reference_date).await?;

    Ok(Json(json!({
        "insights": response.insights,
        "generated_at": Utc::now().to_rfc3339(),
        "data_summary": {
            "avg_daily_sales": response.source_data.avg_daily_sales,
            "trend": response.source_data.trend,
            "top_product": response.source_data.top_products.first(),
        }
    })))
}

pub async fn predictive_insights(State(state): State<AppState>) -> Result<Json<Value>> {
    let response = predictive::generate_predictive_insights(
        &state.db,
        &state.llm,
        &state.weather,
        &state.holidays,
        state.settings.reference_date,
    )
    .await?;
    Ok(Json(json!(response)))
}

pub async fn holidays(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Json<Value> {
    let reference = state.settings.reference_date;
    let (holidays, live) = state.holidays.upcoming(reference, query.days).await;

    Json(json!({
        "holidays": holidays,
        "count": holidays.len(),
        "period_days": query.days,
        "source": if live { "api" } else { "fallback" },
    }))
}

pub async fn weather_forecast(
    State(state): State<AppState>,
    Query(query): Query<WindowQuery>,
) -> Json<Value> {
    let reference = state.settings.reference_date;
    let (forecast, live) = state.weather.forecast(reference, query.days).await;

    Json(json!({
        "forecast": forecast,
        "count": forecast.len(),
        "period_days": query.days,
        "source": if live { "api" } else { "fallback" },
    }))
}
