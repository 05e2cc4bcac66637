// src/expenses/routes.rs

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers;

pub fn expenses_routes() -> Router {
    Router::new()
        .route(
            "/expenses/all",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/recent",
            get(handlers::recent_expenses).post(handlers::create_expense),
        )
        .route(
            "/expenses/:id",
            put(handlers::update_expense).delete(handlers::delete_expense),
        )
}
