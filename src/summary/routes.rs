// src/summary/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn summary_routes() -> Router {
    Router::new().route("/summary", get(handlers::get_summary))
}
