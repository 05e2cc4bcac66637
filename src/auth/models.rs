//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Stored in `password_hash` for accounts created through Google sign-in
pub const OAUTH_PASSWORD_SENTINEL: &str = "GOOGLE_OAUTH";

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub is_google: bool,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Google ID token payload for OAuth
#[derive(Debug, Deserialize)]
pub struct GoogleTokenPayload {
    #[serde(alias = "id_token", alias = "credential")]
    pub token: String,
}

/// Response body for register, login and Google sign-in
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
