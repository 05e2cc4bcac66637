// src/settings/models.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Serialize)]
pub struct CurrencyPreference {
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCurrencyRequest {
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CurrencyOption {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct AvailableCurrencies {
    pub currencies: Vec<CurrencyOption>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeRateQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
}
