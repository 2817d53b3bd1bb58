/// Database connection, table creation, and seed data
pub mod database;

/// Environment-variable settings read once at startup
pub mod settings;

/// Shop profile loading from databrew.toml
pub mod shop;

pub use settings::Settings;
pub use shop::ShopProfile;
