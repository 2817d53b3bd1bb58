//! Shop profile loading from databrew.toml.
//!
//! The shop profile backs the settings endpoints and supplies the
//! latitude/longitude used by the weather adapter. When the file is missing
//! the built-in defaults are used, so a bare checkout still boots.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::errors::{Error, Result};

/// Shop details as presented on the settings page and used for forecasts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopProfile {
    /// Display name of the shop
    pub name: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Postal code
    pub postal: String,
    /// Contact phone number
    pub phone: String,
    /// Contact email
    pub email: String,
    /// Opening hours, free text
    pub hours: String,
    /// Latitude for weather forecasts
    pub latitude: f64,
    /// Longitude for weather forecasts
    pub longitude: f64,
}

impl Default for ShopProfile {
    fn default() -> Self {
        Self {
            name: "DataBrew Coffee House".to_string(),
            address: "123 Gulshan Avenue, Dhaka 1212".to_string(),
            city: "Dhaka".to_string(),
            postal: "1212".to_string(),
            phone: "+880 2-9876543".to_string(),
            email: "contact@databrew.com".to_string(),
            hours: "8:00 AM - 11:00 PM (Daily)".to_string(),
            latitude: 23.7918,
            longitude: 90.3943,
        }
    }
}

/// Loads the shop profile from a TOML file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or parsed.
pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<ShopProfile> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read shop profile: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse shop profile: {e}"),
    })
}

/// Loads the shop profile from the default location (./databrew.toml),
/// falling back to the built-in defaults when the file does not exist.
pub fn load_default_profile() -> Result<ShopProfile> {
    if Path::new("databrew.toml").exists() {
        load_profile("databrew.toml")
    } else {
        info!("databrew.toml not found, using default shop profile");
        Ok(ShopProfile::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_shop_profile() {
        let toml_str = r#"
            name = "Test Roasters"
            address = "1 Bean St"
            city = "Dhaka"
            postal = "1000"
            phone = "+880 1"
            email = "hi@test"
            hours = "9-5"
            latitude = 23.5
            longitude = 90.5
        "#;

        let profile: ShopProfile = toml::from_str(toml_str).unwrap();
        assert_eq!(profile.name, "Test Roasters");
        assert_eq!(profile.latitude, 23.5);
    }

    #[test]
    fn test_default_profile_has_coordinates() {
        let profile = ShopProfile::default();
        assert!(profile.latitude != 0.0);
        assert!(profile.longitude != 0.0);
    }
}
