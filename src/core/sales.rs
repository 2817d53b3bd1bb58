//! Sales aggregation query layer.
//!
//! Every query here is anchored on a reference date (the configured "today")
//! and a relative window, and returns structured rows the API layer
//! serializes as-is. Nothing in this module mutates data.

use chrono::{Datelike, Duration, NaiveDate};
use sea_orm::{DatabaseConnection, DbBackend, FromQueryResult, Statement};
use serde::Serialize;
use std::collections::HashMap;

use crate::entities::{staff, Staff};
use crate::errors::Result;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

/// One point of a daily sales series.
#[derive(Debug, Clone, Serialize)]
pub struct SalesPoint {
    /// Short display label, e.g. "Jun 24"
    pub date: String,
    /// Total sales in dollars for that day
    pub sales: f64,
}

/// Key metrics backing the dashboard cards.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardMetrics {
    pub total_sales: f64,
    pub sales_trend: f64,
    pub total_customers: i64,
    pub profit_margin: f64,
    pub active_baristas: i64,
    pub sales_sparkline: Vec<f64>,
}

/// The best-selling product for the reference date.
#[derive(Debug, Clone, Serialize)]
pub struct BestSelling {
    pub product_name: String,
    pub product_type: String,
    pub units_sold: i64,
    pub revenue: f64,
    pub change_percent: f64,
}

/// Aggregated analytics for the 30-day analytics page.
#[derive(Debug, Clone, Serialize)]
pub struct SalesAnalytics {
    pub total_revenue: f64,
    pub total_orders: i64,
    pub avg_order_value: f64,
    pub profit_margin: f64,
    pub product_sales: Vec<ProductShare>,
    pub hourly_sales: Vec<HourlyPoint>,
    pub monthly_sales: Vec<TargetedPoint>,
}

/// One product's share of revenue over the analytics window.
#[derive(Debug, Clone, Serialize)]
pub struct ProductShare {
    pub name: String,
    pub sales: f64,
    pub percentage: i64,
}

/// Sales for one hour of the reference day.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyPoint {
    pub time: String,
    pub sales: f64,
}

/// A daily point with a mock revenue target attached.
#[derive(Debug, Clone, Serialize)]
pub struct TargetedPoint {
    pub date: String,
    pub sales: f64,
    pub target: f64,
}

/// Income vs expenses for one bucket of the cash-flow chart.
#[derive(Debug, Clone, Serialize)]
pub struct CashFlowPoint {
    pub month: String,
    pub income: f64,
    pub expenses: f64,
}

/// One barista's shift for the schedule widget.
#[derive(Debug, Clone, Serialize)]
pub struct ShiftEntry {
    pub name: String,
    pub role: String,
    pub shift: String,
    pub performance: f64,
}

#[derive(Debug, FromQueryResult)]
struct DailyRow {
    day: String,
    sales: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct ScalarRow {
    sales: Option<f64>,
    orders: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    product_name: String,
    product_category: String,
    units: Option<i64>,
    revenue: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct HourRow {
    hour: String,
    sales: Option<f64>,
}

/// Number of days covered by a `period` query parameter. Unknown values get
/// the month window, matching the original dashboard contract.
#[must_use]
pub fn period_days(period: &str) -> i64 {
    match period {
        "today" => 1,
        "week" => 7,
        _ => 30,
    }
}

fn stmt(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
    Statement::from_sql_and_values(DbBackend::Sqlite, sql, values)
}

fn short_label(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

pub(crate) fn hour_label(hour: u32) -> String {
    let twelve = if hour % 12 == 0 { 12 } else { hour % 12 };
    let suffix = if hour >= 12 { "PM" } else { "AM" };
    format!("{twelve}{suffix}")
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

async fn daily_totals(
    db: &DatabaseConnection,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<HashMap<String, f64>> {
    let rows = DailyRow::find_by_statement(stmt(
        "SELECT date(transacted_at) AS day, SUM(quantity * unit_price) AS sales \
         FROM transactions \
         WHERE date(transacted_at) >= ? AND date(transacted_at) <= ? \
         GROUP BY date(transacted_at)",
        vec![start.to_string().into(), end.to_string().into()],
    ))
    .all(db)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| (r.day, r.sales.unwrap_or(0.0)))
        .collect())
}

/// Returns the daily sales series for the last `days` days ending at the
/// reference date, one point per day with zero-filled gaps.
pub async fn sales_series(
    db: &DatabaseConnection,
    reference: NaiveDate,
    days: i64,
) -> Result<Vec<SalesPoint>> {
    let start = reference - Duration::days(days - 1);
    let totals = daily_totals(db, start, reference).await?;

    let mut series = Vec::with_capacity(usize::try_from(days).unwrap_or(0));
    for offset in 0..days {
        let date = start + Duration::days(offset);
        let sales = totals.get(&date.to_string()).copied().unwrap_or(0.0);
        series.push(SalesPoint {
            date: short_label(date),
            sales,
        });
    }
    Ok(series)
}

async fn day_summary(db: &DatabaseConnection, date: NaiveDate) -> Result<(f64, i64)> {
    let row = ScalarRow::find_by_statement(stmt(
        "SELECT SUM(quantity * unit_price) AS sales, COUNT(*) AS orders \
         FROM transactions WHERE date(transacted_at) = ?",
        vec![date.to_string().into()],
    ))
    .one(db)
    .await?;

    let (sales, orders) = row
        .map(|r| (r.sales.unwrap_or(0.0), r.orders.unwrap_or(0)))
        .unwrap_or((0.0, 0));
    Ok((sales, orders))
}

/// Computes the key metrics for the dashboard cards: today's totals, the
/// trend against yesterday, and a 7-day sparkline.
pub async fn dashboard_metrics(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<DashboardMetrics> {
    let (today_sales, total_customers) = day_summary(db, reference).await?;
    let (yesterday_sales, _) = day_summary(db, reference - Duration::days(1)).await?;

    let sales_trend = if yesterday_sales > 0.0 {
        (today_sales - yesterday_sales) / yesterday_sales * 100.0
    } else {
        0.0
    };

    let active_baristas = Staff::find()
        .filter(staff::Column::Role.eq("barista"))
        .count(db)
        .await?;

    let sparkline = sales_series(db, reference, 7)
        .await?
        .into_iter()
        .map(|p| p.sales)
        .collect();

    Ok(DashboardMetrics {
        total_sales: today_sales,
        sales_trend,
        total_customers,
        // Simplified, matching the dashboard contract; cost data would be
        // needed for a real figure
        profit_margin: 22.0,
        active_baristas: i64::try_from(active_baristas).unwrap_or(0),
        sales_sparkline: sparkline,
    })
}

/// Finds the top product for the reference date by units sold, with the
/// day-over-day change for that product.
pub async fn best_selling(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<Option<BestSelling>> {
    let top = ProductRow::find_by_statement(stmt(
        "SELECT product_name, product_category, SUM(quantity) AS units, \
                SUM(quantity * unit_price) AS revenue \
         FROM transactions WHERE date(transacted_at) = ? \
         GROUP BY product_name, product_category \
         ORDER BY units DESC LIMIT 1",
        vec![reference.to_string().into()],
    ))
    .one(db)
    .await?;

    let Some(top) = top else {
        return Ok(None);
    };

    let yesterday = ProductRow::find_by_statement(stmt(
        "SELECT product_name, product_category, SUM(quantity) AS units, \
                SUM(quantity * unit_price) AS revenue \
         FROM transactions \
         WHERE date(transacted_at) = ? AND product_name = ? \
         GROUP BY product_name, product_category",
        vec![
            (reference - Duration::days(1)).to_string().into(),
            top.product_name.clone().into(),
        ],
    ))
    .one(db)
    .await?;

    let units_sold = top.units.unwrap_or(0);
    let yesterday_units = yesterday.and_then(|r| r.units).unwrap_or(0);
    let change_percent = if yesterday_units > 0 {
        (units_sold - yesterday_units) as f64 / yesterday_units as f64 * 100.0
    } else {
        0.0
    };

    Ok(Some(BestSelling {
        product_name: top.product_name,
        product_type: top.product_category,
        units_sold,
        revenue: top.revenue.unwrap_or(0.0),
        change_percent,
    }))
}

/// Builds the 30-day analytics page payload: totals, product revenue shares,
/// today's hourly histogram, and the daily series with a mock target line.
pub async fn sales_analytics(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<SalesAnalytics> {
    let start = reference - Duration::days(29);

    let summary = ScalarRow::find_by_statement(stmt(
        "SELECT SUM(quantity * unit_price) AS sales, COUNT(*) AS orders \
         FROM transactions WHERE date(transacted_at) >= ?",
        vec![start.to_string().into()],
    ))
    .one(db)
    .await?;

    let (total_revenue, total_orders) = summary
        .map(|r| (r.sales.unwrap_or(0.0), r.orders.unwrap_or(0)))
        .unwrap_or((0.0, 0));
    let avg_order_value = if total_orders > 0 {
        total_revenue / total_orders as f64
    } else {
        0.0
    };

    let product_rows = ProductRow::find_by_statement(stmt(
        "SELECT product_name, product_category, SUM(quantity) AS units, \
                SUM(quantity * unit_price) AS revenue \
         FROM transactions WHERE date(transacted_at) >= ? \
         GROUP BY product_name, product_category \
         ORDER BY revenue DESC LIMIT 5",
        vec![start.to_string().into()],
    ))
    .all(db)
    .await?;

    let top_total: f64 = product_rows.iter().map(|r| r.revenue.unwrap_or(0.0)).sum();
    let product_sales = product_rows
        .into_iter()
        .map(|r| {
            let sales = r.revenue.unwrap_or(0.0);
            let percentage = if top_total > 0.0 {
                (sales / top_total * 100.0).round() as i64
            } else {
                0
            };
            ProductShare {
                name: r.product_name,
                sales,
                percentage,
            }
        })
        .collect();

    let hour_rows = HourRow::find_by_statement(stmt(
        "SELECT strftime('%H', transacted_at) AS hour, \
                SUM(quantity * unit_price) AS sales \
         FROM transactions WHERE date(transacted_at) = ? \
         GROUP BY strftime('%H', transacted_at) ORDER BY hour",
        vec![reference.to_string().into()],
    ))
    .all(db)
    .await?;

    let hourly_sales = hour_rows
        .into_iter()
        .map(|r| HourlyPoint {
            time: hour_label(r.hour.parse().unwrap_or(0)),
            sales: r.sales.unwrap_or(0.0),
        })
        .collect();

    let monthly_sales = sales_series(db, reference, 30)
        .await?
        .into_iter()
        .map(|p| TargetedPoint {
            date: p.date,
            sales: p.sales,
            target: avg_order_value * 10.0,
        })
        .collect();

    Ok(SalesAnalytics {
        total_revenue,
        total_orders,
        avg_order_value,
        profit_margin: 24.5,
        product_sales,
        hourly_sales,
        monthly_sales,
    })
}

/// Income vs expenses per bucket. Expenses are modeled as 70% of income,
/// mirroring the dashboard's simplified cash-flow view.
pub async fn cash_flow(
    db: &DatabaseConnection,
    reference: NaiveDate,
    period: &str,
) -> Result<Vec<CashFlowPoint>> {
    let points = match period {
        "today" => {
            let rows = HourRow::find_by_statement(stmt(
                "SELECT strftime('%H', transacted_at) AS hour, \
                        SUM(quantity * unit_price) AS sales \
                 FROM transactions WHERE date(transacted_at) = ? \
                 GROUP BY strftime('%H', transacted_at) ORDER BY hour",
                vec![reference.to_string().into()],
            ))
            .all(db)
            .await?;

            rows.into_iter()
                .map(|r| cash_point(hour_label(r.hour.parse().unwrap_or(0)), r.sales))
                .collect()
        }
        "week" => {
            let start = reference - Duration::days(6);
            let totals = daily_totals(db, start, reference).await?;
            let mut points = Vec::new();
            for offset in 0..7 {
                let date = start + Duration::days(offset);
                if let Some(&sales) = totals.get(&date.to_string()) {
                    let label =
                        DAY_NAMES[date.weekday().num_days_from_sunday() as usize].to_string();
                    points.push(cash_point(label, Some(sales)));
                }
            }
            points
        }
        _ => {
            let start = reference - Duration::days(29);
            let totals = daily_totals(db, start, reference).await?;
            let mut points = Vec::new();
            for offset in 0..30 {
                let date = start + Duration::days(offset);
                if let Some(&sales) = totals.get(&date.to_string()) {
                    points.push(cash_point(short_label(date), Some(sales)));
                }
            }
            points
        }
    };
    Ok(points)
}

fn cash_point(label: String, sales: Option<f64>) -> CashFlowPoint {
    let income = sales.unwrap_or(0.0);
    CashFlowPoint {
        month: label,
        income,
        expenses: income * 0.7,
    }
}

/// Today's barista shifts, ordered by shift start.
pub async fn barista_schedule(db: &DatabaseConnection) -> Result<Vec<ShiftEntry>> {
    let rows = Staff::find()
        .filter(staff::Column::Role.eq("barista"))
        .order_by_asc(staff::Column::ShiftStart)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|s| ShiftEntry {
            name: s.name,
            role: s.role,
            shift: format!("{} - {}", s.shift_start, s.shift_end),
            performance: s.performance_score,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::{insert_sale, setup_test_db, REF_DATE};

    #[test]
    fn test_period_days_mapping() {
        assert_eq!(period_days("today"), 1);
        assert_eq!(period_days("week"), 7);
        assert_eq!(period_days("month"), 30);
        assert_eq!(period_days("bogus"), 30);
    }

    #[test]
    fn test_hour_labels() {
        assert_eq!(hour_label(0), "12AM");
        assert_eq!(hour_label(9), "9AM");
        assert_eq!(hour_label(12), "12PM");
        assert_eq!(hour_label(15), "3PM");
    }

    #[tokio::test]
    async fn test_sales_series_point_count_matches_window() -> Result<()> {
        let db = setup_test_db().await?;
        insert_sale(&db, "Latte", "Coffee", 2, 4.5, REF_DATE, 9).await?;

        for days in [1, 7, 30] {
            let series = sales_series(&db, REF_DATE, days).await?;
            assert_eq!(series.len(), usize::try_from(days).unwrap());
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_sales_series_zero_fills_missing_days() -> Result<()> {
        let db = setup_test_db().await?;
        insert_sale(&db, "Latte", "Coffee", 2, 4.5, REF_DATE, 9).await?;

        let series = sales_series(&db, REF_DATE, 7).await?;
        assert_eq!(series[6].sales, 9.0);
        assert!(series[..6].iter().all(|p| p.sales == 0.0));
        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_metrics_trend() -> Result<()> {
        let db = setup_test_db().await?;
        let yesterday = REF_DATE - Duration::days(1);
        insert_sale(&db, "Latte", "Coffee", 2, 5.0, yesterday, 10).await?; // 10.0
        insert_sale(&db, "Latte", "Coffee", 4, 5.0, REF_DATE, 10).await?; // 20.0

        let metrics = dashboard_metrics(&db, REF_DATE).await?;
        assert_eq!(metrics.total_sales, 20.0);
        assert_eq!(metrics.total_customers, 1);
        assert_eq!(metrics.sales_trend, 100.0);
        assert_eq!(metrics.sales_sparkline.len(), 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_best_selling_orders_by_units() -> Result<()> {
        let db = setup_test_db().await?;
        insert_sale(&db, "Latte", "Coffee", 3, 4.0, REF_DATE, 9).await?;
        insert_sale(&db, "Espresso", "Coffee", 8, 2.5, REF_DATE, 10).await?;

        let best = best_selling(&db, REF_DATE).await?.unwrap();
        assert_eq!(best.product_name, "Espresso");
        assert_eq!(best.units_sold, 8);
        assert_eq!(best.revenue, 20.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_best_selling_empty_day() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(best_selling(&db, REF_DATE).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_sales_analytics_shares_sum_to_hundred() -> Result<()> {
        let db = setup_test_db().await?;
        insert_sale(&db, "Latte", "Coffee", 2, 5.0, REF_DATE, 9).await?;
        insert_sale(&db, "Mocha", "Coffee", 2, 5.0, REF_DATE, 11).await?;

        let analytics = sales_analytics(&db, REF_DATE).await?;
        assert_eq!(analytics.total_revenue, 20.0);
        assert_eq!(analytics.total_orders, 2);
        assert_eq!(analytics.product_sales.len(), 2);
        let total_pct: i64 = analytics.product_sales.iter().map(|p| p.percentage).sum();
        assert_eq!(total_pct, 100);
        assert_eq!(analytics.monthly_sales.len(), 30);
        Ok(())
    }

    #[tokio::test]
    async fn test_cash_flow_expenses_are_seventy_percent() -> Result<()> {
        let db = setup_test_db().await?;
        insert_sale(&db, "Latte", "Coffee", 2, 5.0, REF_DATE, 9).await?;

        let flow = cash_flow(&db, REF_DATE, "today").await?;
        assert_eq!(flow.len(), 1);
        assert_eq!(flow[0].income, 10.0);
        assert_eq!(flow[0].expenses, 7.0);
        Ok(())
    }
}
