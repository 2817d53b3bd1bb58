//! Clients for external services.
//!
//! Each adapter wraps one upstream HTTP API and degrades to canned data when
//! the upstream is unreachable or misconfigured, so dashboard endpoints never
//! fail because a third party is down.

pub mod holiday;
pub mod llm;
pub mod weather;

pub use holiday::HolidayClient;
pub use llm::LlmClient;
pub use weather::WeatherClient;

use std::time::Duration;

/// Upstream calls are cut off after this long so a slow third party cannot
/// stall a dashboard request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the shared HTTP client used by all adapters.
pub fn build_http_client() -> crate::errors::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}
