//! Public holiday lookup via the Nager.Date API.
//!
//! Fetches the holiday calendar for the configured country and filters it to
//! the requested window. When the upstream is unreachable a small built-in
//! calendar of common holidays stands in, so dependent endpoints keep
//! responding.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One upcoming holiday, as served to clients and fed into prompts.
#[derive(Debug, Clone, Serialize)]
pub struct Holiday {
    pub date: String,
    pub name: String,
    #[serde(rename = "localName")]
    pub local_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub global: bool,
}

/// Raw Nager.Date response row.
#[derive(Debug, Deserialize)]
struct NagerHoliday {
    date: String,
    name: String,
    #[serde(rename = "localName")]
    local_name: Option<String>,
    types: Option<Vec<String>>,
    #[serde(default = "default_global")]
    global: bool,
}

fn default_global() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct HolidayClient {
    http: reqwest::Client,
    base_url: String,
    country_code: String,
}

impl HolidayClient {
    pub fn new(http: reqwest::Client, base_url: String, country_code: String) -> Self {
        Self {
            http,
            base_url,
            country_code,
        }
    }

    /// Returns holidays falling within `[reference, reference + days]`,
    /// with `true` when live data was used.
    pub async fn upcoming(&self, reference: NaiveDate, days: i64) -> (Vec<Holiday>, bool) {
        match self.fetch_window(reference, days).await {
            Ok(holidays) => (holidays, true),
            Err(error) => {
                warn!(%error, "Holiday API unavailable, using fallback calendar");
                (fallback_holidays(reference, days), false)
            }
        }
    }

    async fn fetch_window(&self, reference: NaiveDate, days: i64) -> reqwest::Result<Vec<Holiday>> {
        let end = reference + Duration::days(days);

        let mut raw = self.fetch_year(reference.year()).await?;
        if end.year() > reference.year() {
            raw.extend(self.fetch_year(end.year()).await?);
        }

        let holidays = raw
            .into_iter()
            .filter(|h| {
                NaiveDate::parse_from_str(&h.date, "%Y-%m-%d")
                    .map(|d| d >= reference && d <= end)
                    .unwrap_or(false)
            })
            .map(|h| Holiday {
                local_name: h.local_name.clone().unwrap_or_else(|| h.name.clone()),
                kind: h
                    .types
                    .as_ref()
                    .and_then(|t| t.first().cloned())
                    .unwrap_or_else(|| "Public".to_string()),
                date: h.date,
                name: h.name,
                global: h.global,
            })
            .collect();

        Ok(holidays)
    }

    async fn fetch_year(&self, year: i32) -> reqwest::Result<Vec<NagerHoliday>> {
        let url = format!("{}/{}/{}", self.base_url, year, self.country_code);
        self.http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}

/// A minimal calendar of widely observed holidays, used when the API is down.
fn fallback_holidays(reference: NaiveDate, days: i64) -> Vec<Holiday> {
    let end = reference + Duration::days(days);
    let year = reference.year();

    let common: [(u32, u32, &str, &str); 9] = [
        (1, 1, "New Year's Day", "Public"),
        (2, 14, "Valentine's Day", "Observance"),
        (3, 8, "International Women's Day", "Observance"),
        (4, 14, "Bengali New Year", "Public"),
        (5, 1, "Labour Day", "Public"),
        (8, 15, "Independence Day", "Public"),
        (12, 16, "Victory Day", "Public"),
        (12, 25, "Christmas Day", "Public"),
        (12, 31, "New Year's Eve", "Observance"),
    ];

    common
        .iter()
        .flat_map(|&(month, day, name, kind)| {
            // Check this year and next so a December window still sees January
            [year, year + 1]
                .into_iter()
                .filter_map(move |y| NaiveDate::from_ymd_opt(y, month, day))
                .map(move |date| (date, name, kind))
        })
        .filter(|(date, _, _)| *date >= reference && *date <= end)
        .map(|(date, name, kind)| Holiday {
            date: date.to_string(),
            name: name.to_string(),
            local_name: name.to_string(),
            kind: kind.to_string(),
            global: true,
        })
        .collect()
}

/// Renders holidays as a text block for the analysis prompt.
pub fn format_for_analysis(holidays: &[Holiday], reference: NaiveDate) -> String {
    if holidays.is_empty() {
        return "No major holidays in the next 30 days.".to_string();
    }

    let mut text = format!(
        "Upcoming holidays in the next 30 days ({} total):\n",
        holidays.len()
    );
    for holiday in holidays {
        let days_until = NaiveDate::parse_from_str(&holiday.date, "%Y-%m-%d")
            .map(|d| (d - reference).num_days())
            .unwrap_or(0);
        text.push_str(&format!(
            "- {} on {} ({} days from now, {})\n",
            holiday.name, holiday.date, days_until, holiday.kind
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fallback_filters_to_window() {
        let holidays = fallback_holidays(date(2025, 4, 10), 30);
        let names: Vec<_> = holidays.iter().map(|h| h.name.as_str()).collect();
        assert!(names.contains(&"Bengali New Year"));
        assert!(names.contains(&"Labour Day"));
        assert!(!names.contains(&"Christmas Day"));
    }

    #[test]
    fn test_fallback_crosses_year_boundary() {
        let holidays = fallback_holidays(date(2025, 12, 20), 30);
        let names: Vec<_> = holidays.iter().map(|h| h.name.as_str()).collect();
        assert!(names.contains(&"Christmas Day"));
        assert!(names.contains(&"New Year's Day"));
    }

    #[test]
    fn test_format_for_analysis_lists_each_holiday() {
        let holidays = fallback_holidays(date(2025, 12, 20), 30);
        let text = format_for_analysis(&holidays, date(2025, 12, 20));
        assert!(text.contains("Christmas Day on 2025-12-25 (5 days from now"));
    }

    #[test]
    fn test_format_for_analysis_empty() {
        let text = format_for_analysis(&[], date(2025, 6, 1));
        assert!(text.contains("No major holidays"));
    }
}
