// src/installments/routes.rs

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;

pub fn installments_routes() -> Router {
    Router::new()
        .route(
            "/installments",
            get(handlers::list_installments).post(handlers::create_installment),
        )
        .route("/installments/payment", post(handlers::record_payment))
        .route("/installments/upcoming", get(handlers::upcoming_installments))
        .route("/installments/:id", delete(handlers::delete_installment))
}
