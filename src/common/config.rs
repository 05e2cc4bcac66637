// src/common/config.rs
//! Application configuration loaded from environment variables

use std::env;
use tracing::warn;

pub const DEFAULT_JWT_SECRET: &str = "replace_with_strong_secret";
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;
pub const MAX_CURRENCY_CACHE_TTL_HOURS: i64 = 24 * 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
    pub exchange_rate_api_key: Option<String>,
    pub exchange_rate_base_url: String,
    pub currency_cache_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://finance.db".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_days: 7,
            google_client_id: None,
            google_tokeninfo_url: "https://oauth2.googleapis.com/tokeninfo".to_string(),
            exchange_rate_api_key: None,
            exchange_rate_base_url: "https://v6.exchangerate-api.com/v6".to_string(),
            currency_cache_ttl_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
            port: 8080,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => config.jwt_secret = secret,
            _ => warn!("JWT_SECRET not set, using the built-in development secret"),
        }

        if let Some(days) = bounded_var("TOKEN_TTL_DAYS", MAX_TOKEN_TTL_DAYS) {
            config.token_ttl_days = days;
        }

        config.google_client_id = non_empty_var("GOOGLE_CLIENT_ID");
        if let Some(url) = non_empty_var("GOOGLE_TOKENINFO_URL") {
            config.google_tokeninfo_url = url;
        }

        config.exchange_rate_api_key = non_empty_var("EXCHANGE_RATE_API_KEY");
        if let Some(url) = non_empty_var("EXCHANGE_RATE_BASE_URL") {
            config.exchange_rate_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(hours) = bounded_var("CURRENCY_CACHE_TTL_HOURS", MAX_CURRENCY_CACHE_TTL_HOURS) {
            config.currency_cache_ttl_hours = hours;
        }

        // bcrypt accepts costs 4..=31
        if let Some(cost) = parse_var::<u32>("BCRYPT_COST").filter(|c| (4..=31).contains(c)) {
            config.bcrypt_cost = cost;
        }

        if let Some(origins) = non_empty_var("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(port) = parse_var::<u16>("PORT") {
            config.port = port;
        }

        config
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|v| v.parse::<T>().ok())
}

fn bounded_var(key: &str, max: i64) -> Option<i64> {
    let value = parse_var::<i64>(key)?;
    let bounded = within_bounds(value, max);
    if bounded.is_none() {
        warn!(key, value, max, "Ignoring out-of-range setting");
    }
    bounded
}

fn within_bounds(value: i64, max: i64) -> Option<i64> {
    (1..=max).contains(&value).then_some(value)
}
