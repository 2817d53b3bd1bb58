//! Shared application state for the HTTP layer.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::adapters::{self, HolidayClient, LlmClient, WeatherClient};
use crate::config::{Settings, ShopProfile};
use crate::core::auth::SessionStore;
use crate::errors::Result;

/// Everything a handler needs, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub settings: Arc<Settings>,
    pub shop: Arc<ShopProfile>,
    pub sessions: SessionStore,
    pub llm: LlmClient,
    pub weather: WeatherClient,
    pub holidays: HolidayClient,
}

impl AppState {
    /// Wires up the adapters and session store from loaded configuration.
    pub fn new(db: DatabaseConnection, settings: Settings, shop: ShopProfile) -> Result<Self> {
        let http = adapters::build_http_client()?;

        let llm = LlmClient::new(
            http.clone(),
            settings.llm_api_base.clone(),
            settings.llm_api_key.clone(),
            settings.llm_model.clone(),
        );
        let weather = WeatherClient::new(
            http.clone(),
            settings.weather_api_base.clone(),
            settings.weather_api_key.clone(),
            shop.latitude,
            shop.longitude,
        );
        let holidays = HolidayClient::new(
            http,
            settings.holiday_api_base.clone(),
            settings.holiday_country.clone(),
        );
        let sessions = SessionStore::new(
            settings.admin_email.clone(),
            settings.admin_password.clone(),
            settings.token_expiry_days,
        );

        Ok(Self {
            db,
            settings: Arc::new(settings),
            shop: Arc::new(shop),
            sessions,
            llm,
            weather,
            holidays,
        })
    }
}
