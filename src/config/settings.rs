//! Environment-variable settings.
//!
//! Everything here is read exactly once at process start; there is no
//! hot-reload. Secrets (API keys, admin password) come from the environment
//! so they never land in the repository; `.env` files are honored because
//! `main` calls `dotenvy::dotenv()` before loading.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::errors::{Error, Result};

/// Default number of days a session token stays valid.
const TOKEN_EXPIRY_DAYS: i64 = 7;

/// Application settings assembled from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SeaORM connection string
    pub database_url: String,
    /// Socket address the HTTP server binds to
    pub listen_addr: String,
    /// API key for the hosted LLM; insight endpoints fall back to canned
    /// payloads when unset
    pub llm_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible chat completions API
    pub llm_api_base: String,
    /// Model name sent with every completion request
    pub llm_model: String,
    /// Visual Crossing weather API key
    pub weather_api_key: Option<String>,
    /// Base URL of the Visual Crossing timeline API
    pub weather_api_base: String,
    /// Base URL of the Nager.Date public holiday API
    pub holiday_api_base: String,
    /// ISO 3166-1 alpha-2 country code for holiday lookups
    pub holiday_country: String,
    /// Admin login email
    pub admin_email: String,
    /// Admin login password
    pub admin_password: String,
    /// Days before an issued session token expires
    pub token_expiry_days: i64,
    /// Anchor date for all relative sales queries ("today")
    pub reference_date: NaiveDate,
}

impl Settings {
    /// Loads settings from the environment, applying defaults for everything
    /// except secrets.
    ///
    /// # Errors
    /// Returns `Error::Config` if `REFERENCE_DATE` is set but not a valid
    /// `YYYY-MM-DD` date.
    pub fn load() -> Result<Self> {
        let reference_date = match std::env::var("REFERENCE_DATE") {
            Ok(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| Error::Config {
                message: format!("Invalid REFERENCE_DATE {raw:?}: {e}"),
            })?,
            Err(_) => Local::now().date_naive(),
        };

        let llm_api_key = optional("LLM_API_KEY");
        if llm_api_key.is_none() {
            warn!("LLM_API_KEY not set; insight endpoints will serve fallback payloads");
        }
        let weather_api_key = optional("WEATHER_API_KEY");
        if weather_api_key.is_none() {
            warn!("WEATHER_API_KEY not set; weather forecasts will serve fallback payloads");
        }

        let settings = Self {
            database_url: var_or("DATABASE_URL", "sqlite://data/databrew.sqlite?mode=rwc"),
            listen_addr: var_or("LISTEN_ADDR", "0.0.0.0:8000"),
            llm_api_key,
            llm_api_base: var_or("LLM_API_BASE", "https://api.openai.com/v1"),
            llm_model: var_or("LLM_MODEL", "gpt-4o-mini"),
            weather_api_key,
            weather_api_base: var_or(
                "WEATHER_API_BASE",
                "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline",
            ),
            holiday_api_base: var_or("HOLIDAY_API_BASE", "https://date.nager.at/api/v3/PublicHolidays"),
            holiday_country: var_or("HOLIDAY_COUNTRY", "BD"),
            admin_email: var_or("ADMIN_EMAIL", "admin@gmail.com"),
            admin_password: var_or("ADMIN_PASSWORD", "admin123"),
            token_expiry_days: TOKEN_EXPIRY_DAYS,
            reference_date,
        };
        info!(
            reference_date = %settings.reference_date,
            listen_addr = %settings.listen_addr,
            "Settings loaded"
        );
        Ok(settings)
    }
}

fn var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
