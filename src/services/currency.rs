// src/services/currency.rs
//! Currency list and exchange rates from ExchangeRate-API, plus the
//! time-based cache of valid currency codes.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::common::ApiError;

pub type CurrencyMap = BTreeMap<String, String>;

/// Served when the currency list has never been fetched successfully
pub const FALLBACK_CURRENCIES: [(&str, &str); 5] = [
    ("EUR", "Euro"),
    ("GBP", "Pound Sterling"),
    ("INR", "Indian Rupee"),
    ("JPY", "Japanese Yen"),
    ("USD", "United States Dollar"),
];

pub fn fallback_currencies() -> CurrencyMap {
    FALLBACK_CURRENCIES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}

#[derive(Debug, Error)]
pub enum CurrencyError {
    #[error("exchange rate provider is not configured")]
    NotConfigured,

    #[error("exchange rate provider request failed: {0}")]
    Upstream(String),

    #[error("unsupported currency: {0}")]
    UnknownCurrency(String),
}

impl From<CurrencyError> for ApiError {
    fn from(e: CurrencyError) -> Self {
        match e {
            CurrencyError::NotConfigured => ApiError::ServiceUnavailable(e.to_string()),
            CurrencyError::Upstream(_) => {
                ApiError::BadGateway("Failed to fetch exchange rate".to_string())
            }
            CurrencyError::UnknownCurrency(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}

/// Upstream source of currency codes and conversion rates
#[async_trait]
pub trait CurrencySource: Send + Sync {
    async fn fetch_currencies(&self) -> Result<CurrencyMap, CurrencyError>;

    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64, CurrencyError>;
}

/// ExchangeRate-API v6 client
#[derive(Debug, Clone)]
pub struct ExchangeRateApi {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CodesResponse {
    result: String,
    #[serde(default)]
    supported_codes: Vec<(String, String)>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    result: String,
    conversion_rate: Option<f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

impl ExchangeRateApi {
    pub fn new(http: Client, api_key: Option<String>, base_url: String) -> Self {
        Self {
            http,
            api_key,
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> Result<String, CurrencyError> {
        let key = self.api_key.as_deref().ok_or(CurrencyError::NotConfigured)?;
        Ok(format!("{}/{}/{}", self.base_url, key, path))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CurrencyError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CurrencyError::Upstream(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CurrencyError::Upstream(format!("provider returned {}", status)));
        }

        resp.json::<T>()
            .await
            .map_err(|e| CurrencyError::Upstream(e.to_string()))
    }
}

#[async_trait]
impl CurrencySource for ExchangeRateApi {
    async fn fetch_currencies(&self) -> Result<CurrencyMap, CurrencyError> {
        let url = self.endpoint("codes")?;
        let body: CodesResponse = self.get_json(&url).await?;

        if body.result != "success" {
            return Err(CurrencyError::Upstream(
                body.error_type.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(body.supported_codes.into_iter().collect())
    }

    async fn fetch_rate(&self, from: &str, to: &str) -> Result<f64, CurrencyError> {
        let url = self.endpoint(&format!("pair/{}/{}", from, to))?;
        let body: PairResponse = self.get_json(&url).await?;

        match (body.result.as_str(), body.conversion_rate) {
            ("success", Some(rate)) if rate.is_finite() && rate > 0.0 => Ok(rate),
            ("success", _) => Err(CurrencyError::Upstream("missing conversion rate".to_string())),
            _ => match body.error_type.as_deref() {
                Some("unsupported-code") => {
                    Err(CurrencyError::UnknownCurrency(format!("{}/{}", from, to)))
                }
                other => Err(CurrencyError::Upstream(
                    other.unwrap_or("unknown error").to_string(),
                )),
            },
        }
    }
}

#[derive(Debug, Clone)]
struct CachedCurrencies {
    currencies: CurrencyMap,
    fetched_at: DateTime<Utc>,
    stale: bool,
}

/// Valid-currency cache, stale after its TTL or an explicit [`expire`](Self::expire).
///
/// Concurrent refreshes are not coordinated; the last one to finish wins.
pub struct CurrencyCache {
    source: Arc<dyn CurrencySource>,
    ttl: Duration,
    entry: RwLock<Option<CachedCurrencies>>,
}

impl CurrencyCache {
    pub fn new(source: Arc<dyn CurrencySource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            entry: RwLock::new(None),
        }
    }

    pub async fn get_valid_currencies(&self) -> CurrencyMap {
        self.get_valid_currencies_at(Utc::now()).await
    }

    pub async fn get_valid_currencies_at(&self, now: DateTime<Utc>) -> CurrencyMap {
        let previous = self.entry.read().await.clone();

        if let Some(cached) = &previous {
            if !cached.stale && now - cached.fetched_at < self.ttl {
                debug!(count = cached.currencies.len(), "Currency list served from cache");
                return cached.currencies.clone();
            }
        }

        match self.source.fetch_currencies().await {
            Ok(currencies) if !currencies.is_empty() => {
                info!(count = currencies.len(), "Currency list refreshed");
                *self.entry.write().await = Some(CachedCurrencies {
                    currencies: currencies.clone(),
                    fetched_at: now,
                    stale: false,
                });
                currencies
            }
            Ok(_) => {
                warn!("Currency provider returned an empty list");
                previous.map(|c| c.currencies).unwrap_or_else(fallback_currencies)
            }
            Err(e) => match previous {
                Some(cached) => {
                    warn!(error = %e, "Currency refresh failed, serving stale list");
                    cached.currencies
                }
                None => {
                    warn!(error = %e, "Currency refresh failed, serving fallback list");
                    fallback_currencies()
                }
            },
        }
    }

    pub async fn is_valid_currency(&self, code: &str) -> bool {
        self.get_valid_currencies().await.contains_key(code)
    }

    /// Marks the cached list stale so the next read refetches it.
    ///
    /// The list itself is kept for serving if that refetch fails.
    pub async fn expire(&self) {
        if let Some(cached) = self.entry.write().await.as_mut() {
            cached.stale = true;
        }
    }
}
