//! Daily weather forecasts from the Visual Crossing timeline API.
//!
//! Requests metric daily summaries for the shop's coordinates. Without an API
//! key, or when the upstream fails, a bland fallback forecast is produced so
//! the dashboard and prompt assembly keep working.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One day of forecast, as served to clients and fed into prompts.
#[derive(Debug, Clone, Serialize)]
pub struct DayWeather {
    pub date: String,
    pub conditions: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub precipitation_probability: f64,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    days: Vec<TimelineDay>,
}

#[derive(Debug, Deserialize)]
struct TimelineDay {
    datetime: String,
    conditions: Option<String>,
    tempmax: Option<f64>,
    tempmin: Option<f64>,
    humidity: Option<f64>,
    windspeed: Option<f64>,
    precip: Option<f64>,
    precipprob: Option<f64>,
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    latitude: f64,
    longitude: f64,
}

impl WeatherClient {
    pub fn new(
        http: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            http,
            base_url,
            api_key,
            latitude,
            longitude,
        }
    }

    /// Returns the forecast for `[reference, reference + days]`, with `true`
    /// when live data was used.
    pub async fn forecast(&self, reference: NaiveDate, days: i64) -> (Vec<DayWeather>, bool) {
        let Some(key) = self.api_key.as_deref() else {
            warn!("Weather API key not configured, using fallback forecast");
            return (fallback_forecast(reference, days), false);
        };

        match self.fetch(key, reference, days).await {
            Ok(forecast) if !forecast.is_empty() => (forecast, true),
            Ok(_) => {
                warn!("Weather API returned no days, using fallback forecast");
                (fallback_forecast(reference, days), false)
            }
            Err(error) => {
                warn!(%error, "Weather API unavailable, using fallback forecast");
                (fallback_forecast(reference, days), false)
            }
        }
    }

    async fn fetch(
        &self,
        key: &str,
        reference: NaiveDate,
        days: i64,
    ) -> reqwest::Result<Vec<DayWeather>> {
        let end = reference + Duration::days(days);
        let url = format!(
            "{}/{},{}/{}/{}",
            self.base_url, self.latitude, self.longitude, reference, end
        );

        let response: TimelineResponse = self
            .http
            .get(&url)
            .query(&[
                ("unitGroup", "metric"),
                ("key", key),
                ("contentType", "json"),
                ("include", "days"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .days
            .into_iter()
            .map(|day| DayWeather {
                date: day.datetime,
                conditions: day.conditions.unwrap_or_else(|| "Unknown".to_string()),
                temp_max: day.tempmax.unwrap_or(0.0),
                temp_min: day.tempmin.unwrap_or(0.0),
                humidity: day.humidity.unwrap_or(0.0),
                wind_speed: day.windspeed.unwrap_or(0.0),
                precipitation: day.precip.unwrap_or(0.0),
                precipitation_probability: day.precipprob.unwrap_or(0.0),
                description: day.description.unwrap_or_default(),
            })
            .collect())
    }
}

/// Mild partly-cloudy placeholder forecast used when no live data exists.
fn fallback_forecast(reference: NaiveDate, days: i64) -> Vec<DayWeather> {
    (0..days)
        .map(|offset| DayWeather {
            date: (reference + Duration::days(offset)).to_string(),
            conditions: "Partly cloudy".to_string(),
            temp_max: 30.0,
            temp_min: 22.0,
            humidity: 65.0,
            wind_speed: 15.0,
            precipitation: 0.0,
            precipitation_probability: 20.0,
            description: "Weather data unavailable".to_string(),
        })
        .collect()
}

/// Renders the forecast as a text block for the analysis prompt, surfacing
/// rainy and extreme-temperature days first.
pub fn format_for_analysis(forecast: &[DayWeather]) -> String {
    if forecast.is_empty() {
        return "No weather forecast data available.".to_string();
    }

    let rainy: Vec<_> = forecast
        .iter()
        .filter(|d| d.precipitation > 5.0 || d.precipitation_probability > 60.0)
        .collect();
    let hot: Vec<_> = forecast.iter().filter(|d| d.temp_max > 35.0).collect();
    let cool = forecast.iter().filter(|d| d.temp_max < 15.0).count();

    let mut text = format!(
        "Weather Forecast (Next 30 Days, {} days):\n\nSummary:\n- Rainy days: {}\n- Hot days (>35C): {}\n- Cool days (<15C): {}\n\n",
        forecast.len(),
        rainy.len(),
        hot.len(),
        cool
    );

    if !rainy.is_empty() {
        text.push_str("Significant Rain Expected:\n");
        for day in rainy.iter().take(5) {
            text.push_str(&format!(
                "  - {}: {}, {}mm rain, {}% chance\n",
                day.date, day.conditions, day.precipitation, day.precipitation_probability
            ));
        }
        text.push('\n');
    }

    if !hot.is_empty() {
        text.push_str("Hot Days Expected:\n");
        for day in hot.iter().take(5) {
            text.push_str(&format!(
                "  - {}: {}C max, {}\n",
                day.date, day.temp_max, day.conditions
            ));
        }
        text.push('\n');
    }

    text.push_str("Next 7 Days Detail:\n");
    for day in forecast.iter().take(7) {
        text.push_str(&format!(
            "  - {}: {}, {}/{}C, Humidity {}%, Precip {}mm\n",
            day.date, day.conditions, day.temp_max, day.temp_min, day.humidity, day.precipitation
        ));
    }

    text
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fallback_covers_whole_window() {
        let forecast = fallback_forecast(date(2025, 6, 1), 30);
        assert_eq!(forecast.len(), 30);
        assert_eq!(forecast[0].date, "2025-06-01");
        assert_eq!(forecast[29].date, "2025-06-30");
        assert_eq!(forecast[0].temp_max, 30.0);
    }

    #[test]
    fn test_format_flags_rainy_days() {
        let mut forecast = fallback_forecast(date(2025, 6, 1), 7);
        forecast[2].precipitation = 12.0;
        forecast[2].conditions = "Rain".to_string();

        let text = format_for_analysis(&forecast);
        assert!(text.contains("Rainy days: 1"));
        assert!(text.contains("2025-06-03: Rain, 12mm rain"));
    }

    #[test]
    fn test_format_empty_forecast() {
        assert!(format_for_analysis(&[]).contains("No weather forecast"));
    }
}
