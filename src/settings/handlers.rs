// src/settings/handlers.rs

use axum::extract::{Extension, Json, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{
    AvailableCurrencies, CurrencyOption, CurrencyPreference, ExchangeRate, ExchangeRateQuery,
    UpdateCurrencyRequest, DEFAULT_CURRENCY,
};
use super::validators::normalize_currency_code;
use crate::auth::AuthedUser;
use crate::common::{safe_email_log, ApiError, AppState, ValidationResult};

/// GET /settings/currency - Display currency, `USD` until one is chosen
pub async fn get_currency(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<CurrencyPreference>, ApiError> {
    let state = state_lock.read().await.clone();

    let currency: Option<String> =
        sqlx::query_scalar("SELECT currency FROM user_settings WHERE user_id = ?")
            .bind(&authed.id)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %authed.id, "Database error fetching currency preference");
                ApiError::DatabaseError(e)
            })?;

    Ok(Json(CurrencyPreference {
        currency: currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    }))
}

/// PUT /settings/currency - Store the display currency
///
/// The code must be in the valid-currency set at write time.
pub async fn update_currency(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<UpdateCurrencyRequest>,
) -> Result<Json<CurrencyPreference>, ApiError> {
    let state = state_lock.read().await.clone();

    let mut validation = ValidationResult::new();
    let code = normalize_currency_code(&mut validation, "currency", request.currency.as_deref());
    let Some(currency) = code else {
        return Err(ApiError::from(validation));
    };

    if !state.currency_cache.is_valid_currency(&currency).await {
        warn!(user_id = %authed.id, currency = %currency, "Rejected unsupported currency");
        let mut validation = ValidationResult::new();
        validation.add_error("currency", "Unsupported currency code");
        return Err(ApiError::from(validation));
    }

    sqlx::query(
        r#"
        INSERT INTO user_settings (user_id, currency, updated_at)
        VALUES (?, ?, datetime('now'))
        ON CONFLICT(user_id) DO UPDATE SET currency = excluded.currency, updated_at = datetime('now')
        "#,
    )
    .bind(&authed.id)
    .bind(&currency)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(error = %e, user_id = %authed.id, "Database error saving currency preference");
        ApiError::DatabaseError(e)
    })?;

    info!(
        user_id = %authed.id,
        username = %authed.username,
        email = %safe_email_log(&authed.email),
        currency = %currency,
        "Currency preference updated"
    );

    Ok(Json(CurrencyPreference { currency }))
}

/// GET /settings/available-currencies
pub async fn available_currencies(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    _authed: AuthedUser,
) -> Result<Json<AvailableCurrencies>, ApiError> {
    let state = state_lock.read().await.clone();

    let currencies = state
        .currency_cache
        .get_valid_currencies()
        .await
        .into_iter()
        .map(|(code, name)| CurrencyOption { code, name })
        .collect::<Vec<_>>();

    debug!(count = currencies.len(), "Serving available currencies");

    Ok(Json(AvailableCurrencies { currencies }))
}

/// GET /settings/exchange-rate?from=USD&to=EUR
pub async fn exchange_rate(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<ExchangeRateQuery>,
) -> Result<Json<ExchangeRate>, ApiError> {
    let state = state_lock.read().await.clone();

    let mut validation = ValidationResult::new();
    let from = normalize_currency_code(&mut validation, "from", query.from.as_deref());
    let to = normalize_currency_code(&mut validation, "to", query.to.as_deref());
    let (Some(from), Some(to)) = (from, to) else {
        return Err(ApiError::from(validation));
    };

    let valid = state.currency_cache.get_valid_currencies().await;
    for (field, code) in [("from", &from), ("to", &to)] {
        if !valid.contains_key(code.as_str()) {
            validation.add_error(field, "Unsupported currency code");
        }
    }
    validation.into_result()?;

    if from == to {
        return Ok(Json(ExchangeRate { from, to, rate: 1.0 }));
    }

    let rate = state
        .currency_source
        .fetch_rate(&from, &to)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %authed.id,
                from = %from,
                to = %to,
                "Exchange rate lookup failed"
            );
            ApiError::from(e)
        })?;

    debug!(from = %from, to = %to, rate, "Exchange rate fetched");

    Ok(Json(ExchangeRate { from, to, rate }))
}
