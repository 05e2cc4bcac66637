// src/loans/routes.rs

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

pub fn loans_routes() -> Router {
    Router::new()
        .route("/loans", get(handlers::list_loans).post(handlers::create_loan))
        .route(
            "/loans/:id",
            put(handlers::update_loan).delete(handlers::delete_loan),
        )
}
