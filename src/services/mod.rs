// src/services/mod.rs
//
// Clients for the external services the API depends on

pub mod currency;
pub mod google;

pub use currency::{CurrencyCache, CurrencySource, ExchangeRateApi};
pub use google::GoogleVerifier;
