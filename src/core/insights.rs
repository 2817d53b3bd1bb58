//! AI insight generation for the dashboard.
//!
//! Summarizes recent sales into a compact snapshot, asks the language model
//! for 3-4 short insights, and validates the reply. Anything less than two
//! well-formed insights, or any upstream failure, produces the canned
//! fallback list so the dashboard card is never empty.

use chrono::{Duration, NaiveDate};
use sea_orm::{DatabaseConnection, FromQueryResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::adapters::llm::{strip_json_fences, LlmClient};
use crate::core::sales::hour_label;
use crate::entities::{Ingredient, IngredientModel};
use crate::errors::{Error, Result};
use sea_orm::EntityTrait;

const MIN_INSIGHTS: usize = 2;
const MAX_INSIGHTS: usize = 4;

const ALLOWED_TYPES: [&str; 4] = ["trending_up", "users", "clock", "alert"];

/// One dashboard insight card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    pub color: String,
}

/// Snapshot of recent sales fed to the model and echoed back to the client
/// as `source_data`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SalesSummary {
    pub trend: String,
    pub wow_change: f64,
    pub top_products: Vec<String>,
    pub top_product_revenue: f64,
    pub peak_hours: Vec<String>,
    pub peak_hour_customers: i64,
    pub avg_daily_sales: f64,
    pub recent_daily_sales: f64,
    pub avg_order_value: f64,
    pub low_stock_items: Vec<String>,
    pub total_customers_today: i64,
}

/// Full payload for the insight endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct InsightsResponse {
    pub insights: Vec<Insight>,
    pub source_data: SalesSummary,
}

#[derive(Debug, FromQueryResult)]
struct DailyRow {
    sales: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    product_name: String,
    revenue: Option<f64>,
}

#[derive(Debug, FromQueryResult)]
struct HourRow {
    hour: String,
    customers: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct ScalarRow {
    sales: Option<f64>,
    orders: Option<i64>,
}

fn stmt(sql: &str, values: Vec<sea_orm::Value>) -> sea_orm::Statement {
    sea_orm::Statement::from_sql_and_values(sea_orm::DbBackend::Sqlite, sql, values)
}

/// Builds the sales snapshot used for prompting.
///
/// Trend compares the most recent 7 days against the 7 days before them and
/// calls anything within 5 percent "steady".
pub async fn prepare_sales_summary(
    db: &DatabaseConnection,
    reference: NaiveDate,
) -> Result<SalesSummary> {
    let mut summary = SalesSummary {
        trend: "steady".to_string(),
        ..Default::default()
    };

    // Last 14 daily totals, oldest first, gaps skipped
    let daily = DailyRow::find_by_statement(stmt(
        "SELECT SUM(quantity * unit_price) AS sales FROM transactions \
         WHERE date(transacted_at) > ? AND date(transacted_at) <= ? \
         GROUP BY date(transacted_at) ORDER BY date(transacted_at)",
        vec![
            (reference - Duration::days(14)).to_string().into(),
            reference.to_string().into(),
        ],
    ))
    .all(db)
    .await?;

    let totals: Vec<f64> = daily.iter().map(|r| r.sales.unwrap_or(0.0)).collect();
    if !totals.is_empty() {
        summary.avg_daily_sales = totals.iter().sum::<f64>() / totals.len() as f64;

        let split = totals.len().saturating_sub(7);
        let (older, recent) = totals.split_at(split);
        let recent_avg = recent.iter().sum::<f64>() / recent.len().max(1) as f64;
        summary.recent_daily_sales = recent_avg;

        if !older.is_empty() {
            let older_avg = older.iter().sum::<f64>() / older.len() as f64;
            if older_avg > 0.0 {
                let change = (recent_avg - older_avg) / older_avg * 100.0;
                summary.wow_change = change;
                summary.trend = if change > 5.0 {
                    "increasing".to_string()
                } else if change < -5.0 {
                    "decreasing".to_string()
                } else {
                    "steady".to_string()
                };
            }
        }
    }

    // Top products over the last 7 days, by quantity sold
    let products = ProductRow::find_by_statement(stmt(
        "SELECT product_name, SUM(quantity * unit_price) AS revenue \
         FROM transactions \
         WHERE date(transacted_at) > ? AND date(transacted_at) <= ? \
         GROUP BY product_name ORDER BY SUM(quantity) DESC LIMIT 5",
        vec![
            (reference - Duration::days(7)).to_string().into(),
            reference.to_string().into(),
        ],
    ))
    .all(db)
    .await?;

    summary.top_product_revenue = products
        .first()
        .and_then(|p| p.revenue)
        .unwrap_or(0.0);
    summary.top_products = products.into_iter().map(|p| p.product_name).collect();

    // Busiest hours over the last 3 days
    let hours = HourRow::find_by_statement(stmt(
        "SELECT strftime('%H', transacted_at) AS hour, COUNT(*) AS customers \
         FROM transactions \
         WHERE date(transacted_at) > ? AND date(transacted_at) <= ? \
         GROUP BY hour ORDER BY customers DESC LIMIT 3",
        vec![
            (reference - Duration::days(3)).to_string().into(),
            reference.to_string().into(),
        ],
    ))
    .all(db)
    .await?;

    summary.peak_hour_customers = hours
        .first()
        .and_then(|h| h.customers)
        .unwrap_or(0);
    summary.peak_hours = hours
        .into_iter()
        .filter_map(|h| h.hour.parse::<u32>().ok().map(hour_label))
        .collect();

    // Today's order count and average order value
    let today = ScalarRow::find_by_statement(stmt(
        "SELECT SUM(quantity * unit_price) AS sales, COUNT(*) AS orders \
         FROM transactions WHERE date(transacted_at) = ?",
        vec![reference.to_string().into()],
    ))
    .one(db)
    .await?;
    if let Some(row) = today {
        summary.total_customers_today = row.orders.unwrap_or(0);
        if summary.total_customers_today > 0 {
            summary.avg_order_value =
                row.sales.unwrap_or(0.0) / summary.total_customers_today as f64;
        }
    }

    // Ingredients close to their reorder point, worst three
    let ingredients: Vec<IngredientModel> = Ingredient::find().all(db).await?;
    let mut low: Vec<&IngredientModel> = ingredients
        .iter()
        .filter(|i| i.stock_quantity < i.reorder_level * 1.5)
        .collect();
    low.sort_by(|a, b| {
        a.stock_quantity
            .partial_cmp(&b.stock_quantity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summary.low_stock_items = low.iter().take(3).map(|i| i.name.clone()).collect();

    Ok(summary)
}

fn join_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

/// Builds the user prompt from the sales snapshot.
fn build_prompt(summary: &SalesSummary) -> String {
    format!(
        "Analyze the following coffee shop sales data and provide 3-4 actionable business insights.\n\
         \n\
         Sales Data Summary:\n\
         - Recent sales trend: {trend}\n\
         - Week-over-week change: {wow:.1}%\n\
         - Top selling products: {top}\n\
         - Top product revenue: ${top_rev:.2}\n\
         - Peak hours: {peaks}\n\
         - Peak hour customers: {peak_customers}\n\
         - Average daily sales: ${avg_daily:.2}\n\
         - Recent daily sales: ${recent_daily:.2}\n\
         - Average order value: ${aov:.2}\n\
         - Low stock items: {low_stock}\n\
         - Customer count: {customers}\n\
         \n\
         Generate EXACTLY 3-4 insights as a JSON array. Each element must have:\n\
         - \"type\": one of \"trending_up\", \"users\", \"clock\", \"alert\"\n\
         - \"text\": a specific, actionable insight under 100 characters\n\
         - \"color\": \"#22c55e\" (positive), \"#f59e0b\" (warning), \"#ef4444\" (urgent), or \"#8b5e3c\" (neutral)\n\
         \n\
         Rules:\n\
         1. Use specific numbers and product names from the data above\n\
         2. Focus on staffing, inventory, promotions, and customer engagement\n\
         3. If there are low stock items, include at least one inventory alert\n\
         4. Return ONLY valid JSON, no additional text or markdown",
        trend = summary.trend,
        wow = summary.wow_change,
        top = join_or(&summary.top_products, "Unknown"),
        top_rev = summary.top_product_revenue,
        peaks = join_or(&summary.peak_hours, "Unknown"),
        peak_customers = summary.peak_hour_customers,
        avg_daily = summary.avg_daily_sales,
        recent_daily = summary.recent_daily_sales,
        aov = summary.avg_order_value,
        low_stock = join_or(&summary.low_stock_items, "None"),
        customers = summary.total_customers_today,
    )
}

const SYSTEM_PROMPT: &str =
    "You are an AI analytics assistant for a coffee shop called DataBrew. \
     You reply with valid JSON only.";

/// Parses and validates the model's reply.
///
/// Accepts either a bare array or an object wrapping one; the json_object
/// response format always delivers the latter, e.g. `{"insights": [...]}`.
/// Malformed entries are dropped rather than failing the whole reply. Fewer
/// than two surviving insights is treated as a failed generation.
pub fn parse_insights(raw: &str) -> Result<Vec<Insight>> {
    let cleaned = strip_json_fences(raw);
    let value: serde_json::Value = serde_json::from_str(cleaned)
        .map_err(|e| Error::validation(format!("Unparseable insight reply: {e}")))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("insights") {
            Some(serde_json::Value::Array(items)) => items,
            _ => map
                .into_iter()
                .find_map(|(_, v)| match v {
                    serde_json::Value::Array(items) => Some(items),
                    _ => None,
                })
                .ok_or_else(|| Error::validation("Insight reply contained no array"))?,
        },
        _ => return Err(Error::validation("Insight reply was not a JSON array")),
    };

    let valid: Vec<Insight> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<Insight>(item).ok())
        .filter(|i| {
            !i.text.trim().is_empty()
                && ALLOWED_TYPES.contains(&i.kind.as_str())
                && i.color.starts_with('#')
        })
        .take(MAX_INSIGHTS)
        .collect();

    if valid.len() < MIN_INSIGHTS {
        return Err(Error::validation(
            "Generated insights did not meet minimum requirements",
        ));
    }
    Ok(valid)
}

/// Static insights shown when generation is unavailable.
#[must_use]
pub fn fallback_insights() -> Vec<Insight> {
    vec![
        Insight {
            kind: "trending_up".to_string(),
            text: "Sales analytics in progress. Check back soon for insights.".to_string(),
            color: "#22c55e".to_string(),
        },
        Insight {
            kind: "users".to_string(),
            text: "Staff scheduling optimization available soon.".to_string(),
            color: "#f59e0b".to_string(),
        },
        Insight {
            kind: "clock".to_string(),
            text: "Peak hour analysis will be displayed here.".to_string(),
            color: "#8b5e3c".to_string(),
        },
    ]
}

/// Produces the insight payload for the dashboard.
///
/// Never fails on upstream problems: any LLM error downgrades to the
/// fallback list while the sales snapshot is still returned.
pub async fn generate_insights(
    db: &DatabaseConnection,
    llm: &LlmClient,
    reference: NaiveDate,
) -> Result<InsightsResponse> {
    let source_data = prepare_sales_summary(db, reference).await?;

    if !llm.is_configured() {
        warn!("LLM not configured, serving fallback insights");
        return Ok(InsightsResponse {
            insights: fallback_insights(),
            source_data,
        });
    }

    let insights = match llm.complete(SYSTEM_PROMPT, &build_prompt(&source_data)).await {
        Ok(reply) => match parse_insights(&reply) {
            Ok(insights) => insights,
            Err(error) => {
                warn!(%error, "Insight reply failed validation, serving fallback");
                fallback_insights()
            }
        },
        Err(error) => {
            warn!(%error, "Insight generation failed, serving fallback");
            fallback_insights()
        }
    };

    Ok(InsightsResponse {
        insights,
        source_data,
    })
}
