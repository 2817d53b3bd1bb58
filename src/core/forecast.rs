//! Sales forecasting.
//!
//! Projects the next N days from the trailing 7-day average of daily sales.
//! Days with no sales inside the trailing window are ignored rather than
//! counted as zero, so a short history does not drag the projection down.

use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};
use serde::Serialize;

use crate::errors::Result;

/// Forecast payload for the `/forecast` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    /// One projected sales figure per requested day
    pub forecast_next_days: Vec<f64>,
    /// Most recent day with recorded sales, if any
    pub last_date_in_data: Option<String>,
    /// Echo of the requested horizon
    pub days_forecasted: u32,
}

#[derive(Debug, FromQueryResult)]
struct DailyRow {
    day: String,
    sales: Option<f64>,
}

/// Produces an N-day forecast from the most recent 7 days that have sales.
pub async fn forecast(
    db: &DatabaseConnection,
    reference: NaiveDate,
    days: u32,
) -> Result<Forecast> {
    let rows = DailyRow::find_by_statement(Statement::from_sql_and_values(
        DbBackend::Sqlite,
        "SELECT date(transacted_at) AS day, SUM(quantity * unit_price) AS sales \
         FROM transactions WHERE date(transacted_at) <= ? \
         GROUP BY date(transacted_at) ORDER BY day DESC LIMIT 7",
        vec![reference.to_string().into()],
    ))
    .all(db)
    .await?;

    let last_date_in_data = rows.first().map(|r| r.day.clone());

    let totals: Vec<f64> = rows.iter().map(|r| r.sales.unwrap_or(0.0)).collect();
    let average = if totals.is_empty() {
        0.0
    } else {
        totals.iter().sum::<f64>() / totals.len() as f64
    };

    Ok(Forecast {
        forecast_next_days: vec![average; days as usize],
        last_date_in_data,
        days_forecasted: days,
    })
}
