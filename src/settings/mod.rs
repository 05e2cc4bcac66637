// src/settings/mod.rs
//! Display currency preference and exchange-rate lookups

pub mod handlers;
pub mod models;
pub mod routes;
pub mod validators;


pub use routes::settings_routes;
