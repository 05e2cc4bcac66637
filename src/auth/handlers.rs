//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::{HeaderMap, StatusCode},
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::extractors::{authenticate, AuthOutcome};
use super::models::{
    AuthResponse, GoogleTokenPayload, LoginRequest, RegisterRequest, User,
    OAUTH_PASSWORD_SENTINEL,
};
use super::token::{self, Claims, TokenError};
use super::validators::{pick_username, username_base, LoginValidator, RegisterValidator};
use crate::common::{
    generate_user_id, safe_email_log, safe_token_log, ApiError, AppState, Validator,
};
use crate::services::google::GoogleIdentity;

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            TokenError::Invalid => ApiError::Unauthorized("Invalid token".to_string()),
            TokenError::Signing(msg) => ApiError::InternalServer(format!("jwt error: {}", msg)),
        }
    }
}

/// POST /register
///
/// # Request Body
/// ```json
/// { "email": "...", "username": "...", "password": "...", "confirm_password": "..." }
/// ```
pub async fn register(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = RegisterValidator.validate(&request);
    if !validation_result.is_valid {
        warn!(errors = ?validation_result.errors, "Registration validation failed");
        return Err(ApiError::from(validation_result));
    }

    let email = request.email.unwrap_or_default().trim().to_string();
    let username = request.username.unwrap_or_default().trim().to_string();
    let password = request.password.unwrap_or_default();

    // Columns are COLLATE NOCASE, so these comparisons ignore case
    let conflict: Option<(String, String)> =
        sqlx::query_as("SELECT username, email FROM users WHERE username = ? OR email = ?")
            .bind(&username)
            .bind(&email)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error checking registration conflicts");
                ApiError::DatabaseError(e)
            })?;

    if let Some((existing_username, _)) = conflict {
        warn!(email = %safe_email_log(&email), "Registration conflict");
        return Err(if existing_username.eq_ignore_ascii_case(&username) {
            ApiError::Conflict("Username already taken".to_string())
        } else {
            ApiError::Conflict("Email already registered".to_string())
        });
    }

    let password_hash = hash_password(password, state.bcrypt_cost).await?;
    let id = generate_user_id();

    sqlx::query("INSERT INTO users (id, username, email, password_hash, is_google) VALUES (?, ?, ?, ?, 0)")
        .bind(&id)
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .execute(&state.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("Username or email already registered".to_string())
            }
            e => {
                error!(error = %e, "Database error inserting user");
                ApiError::DatabaseError(e)
            }
        })?;

    let user = fetch_user(&state.db, &id).await?.ok_or_else(|| {
        ApiError::InternalServer("registered user could not be read back".to_string())
    })?;
    let token = token::issue_token(&user, &state.jwt_secret, state.token_ttl)?;

    info!(user_id = %user.id, email = %safe_email_log(&user.email), "User registered");

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// POST /login
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    LoginValidator.validate(&request).into_result()?;

    let username = request.username.unwrap_or_default().trim().to_string();
    let password = request.password.unwrap_or_default();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&username)
        .fetch_optional(&state.db)
        .await?;

    let invalid = || ApiError::Unauthorized("Invalid username or password".to_string());

    let user = match user {
        Some(u) if u.password_hash != OAUTH_PASSWORD_SENTINEL => u,
        Some(u) => {
            warn!(user_id = %u.id, "Password login attempted on Google-only account");
            return Err(invalid());
        }
        None => {
            debug!("Login attempted for unknown username");
            return Err(invalid());
        }
    };

    if !verify_password(password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(invalid());
    }

    let token = token::issue_token(&user, &state.jwt_secret, state.token_ttl)?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse { user, token }))
}

/// POST /google
/// Exchanges a Google ID token for a session token, creating the user on
/// first sign-in
pub async fn google_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<GoogleTokenPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!("Received Google auth request");
    let state = state_lock.read().await.clone();

    if payload.token.trim().is_empty() {
        return Err(ApiError::BadRequest("token is required".to_string()));
    }

    debug!(token = %safe_token_log(payload.token.trim()), "Verifying Google ID token");
    let identity = state.google.verify(payload.token.trim()).await?;

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&identity.email)
        .fetch_optional(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, "Database error checking existing user during OAuth flow");
            ApiError::DatabaseError(e)
        })?;

    let user = match existing {
        Some(u) => {
            debug!(user_id = %u.id, "Found existing user for Google sign-in");
            u
        }
        None => create_google_user(&state.db, &identity).await?,
    };

    let mut claims = Claims::for_user(&user, state.token_ttl);
    claims.google = Some(true);
    let token = token::sign(&claims, &state.jwt_secret)?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = "google",
        "User authentication successful via Google OAuth"
    );

    Ok(Json(AuthResponse { user, token }))
}

/// GET /check
/// Unlike resource routes, tells an expired token apart from an invalid one
pub async fn check(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let claims = match authenticate(&headers, &state.jwt_secret) {
        AuthOutcome::Authenticated(claims) => claims,
        AuthOutcome::Expired => return Err(TokenError::Expired.into()),
        AuthOutcome::Invalid | AuthOutcome::Missing => return Err(TokenError::Invalid.into()),
    };

    let user = fetch_user(&state.db, &claims.sub)
        .await?
        .ok_or_else(|| ApiError::from(TokenError::Invalid))?;

    Ok(Json(serde_json::json!({ "user": user })))
}

// ---- Helper Functions ----

async fn fetch_user(pool: &SqlitePool, id: &str) -> Result<Option<User>, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)
}

async fn create_google_user(pool: &SqlitePool, identity: &GoogleIdentity) -> Result<User, ApiError> {
    let base = username_base(&identity.email);

    // A concurrent sign-in can claim the same candidate, so retry a few times
    for _ in 0..3 {
        let taken: Vec<String> = sqlx::query_scalar("SELECT username FROM users WHERE username LIKE ?")
            .bind(format!("{}%", base))
            .fetch_all(pool)
            .await?;
        let username = pick_username(&base, taken.iter().map(String::as_str));
        let id = generate_user_id();

        info!(
            user_id = %id,
            email = %safe_email_log(&identity.email),
            google_sub = %identity.subject,
            email_verified = identity.email_verified,
            display_name = ?identity.name,
            provider = "google",
            "Creating new user account via Google OAuth"
        );

        let inserted = sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, is_google) VALUES (?, ?, ?, ?, 1)",
        )
        .bind(&id)
        .bind(&username)
        .bind(&identity.email)
        .bind(OAUTH_PASSWORD_SENTINEL)
        .execute(pool)
        .await;

        match inserted {
            Ok(_) => {
                return fetch_user(pool, &id).await?.ok_or_else(|| {
                    ApiError::InternalServer("created user could not be read back".to_string())
                })
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                warn!(username = %username, "Generated username collided, retrying");
            }
            Err(e) => {
                error!(error = %e, "Database error inserting new user during OAuth flow");
                return Err(ApiError::DatabaseError(e));
            }
        }
    }

    Err(ApiError::Conflict("Could not allocate a username".to_string()))
}

async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| ApiError::InternalServer(format!("hashing task failed: {}", e)))?
        .map_err(|e| ApiError::InternalServer(format!("password hashing failed: {}", e)))
}

async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| ApiError::InternalServer(format!("hashing task failed: {}", e)))?;

    Ok(verified.unwrap_or_else(|e| {
        warn!(error = %e, "Stored password hash could not be parsed");
        false
    }))
}
