// Application state shared across all modules

use chrono::Duration;
use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::common::config::AppConfig;
use crate::services::{CurrencyCache, CurrencySource, GoogleVerifier};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub google: Arc<GoogleVerifier>,
    pub currency_source: Arc<dyn CurrencySource>,
    pub currency_cache: Arc<CurrencyCache>,
}

impl AppState {
    /// Wires services from configuration around an existing pool
    pub fn from_config(
        db: SqlitePool,
        http: Client,
        config: &AppConfig,
        currency_source: Arc<dyn CurrencySource>,
    ) -> Self {
        let google = Arc::new(GoogleVerifier::new(
            http,
            config.google_client_id.clone(),
            config.google_tokeninfo_url.clone(),
        ));
        let currency_cache = Arc::new(CurrencyCache::new(
            currency_source.clone(),
            Duration::hours(config.currency_cache_ttl_hours),
        ));

        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
            token_ttl: Duration::days(config.token_ttl_days),
            bcrypt_cost: config.bcrypt_cost,
            google,
            currency_source,
            currency_cache,
        }
    }
}
