// src/income/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn income_routes() -> Router {
    Router::new().route(
        "/income",
        get(handlers::list_income)
            .post(handlers::save_income)
            .delete(handlers::delete_income),
    )
}
