// src/settings/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn settings_routes() -> Router {
    Router::new()
        .route(
            "/settings/currency",
            get(handlers::get_currency).put(handlers::update_currency),
        )
        .route(
            "/settings/available-currencies",
            get(handlers::available_currencies),
        )
        .route("/settings/exchange-rate", get(handlers::exchange_rate))
}
