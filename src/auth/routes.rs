//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /register` - Create a password account
/// - `POST /login` - Username/password login
/// - `POST /google` - Google ID token sign-in
/// - `GET /check` - Validate the current session token
pub fn auth_routes() -> Router {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/google", post(handlers::google_auth))
        .route("/check", get(handlers::check))
}
