//! Core business logic, independent of the HTTP layer.

pub mod auth;
pub mod forecast;
pub mod insights;
pub mod inventory;
pub mod predictive;
pub mod sales;
