//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::token::{self, Claims, TokenError};
use crate::common::{ApiError, AppState};

/// Result of checking a request's bearer token
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    Authenticated(Claims),
    Missing,
    Invalid,
    Expired,
}

/// Reads `Authorization: Bearer <token>` and verifies the token
pub fn authenticate(headers: &HeaderMap, secret: &str) -> AuthOutcome {
    let header = match headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        Some(h) => h,
        None => return AuthOutcome::Missing,
    };

    let bare_token = match header.strip_prefix("Bearer ") {
        Some(t) if !t.trim().is_empty() => t.trim(),
        _ => return AuthOutcome::Missing,
    };

    match token::verify(bare_token, secret) {
        Ok(claims) => AuthOutcome::Authenticated(claims),
        Err(TokenError::Expired) => AuthOutcome::Expired,
        Err(_) => AuthOutcome::Invalid,
    }
}

/// Authenticated user extractor
///
/// Every failure collapses into the same 401 so resource routes never
/// reveal whether a token was missing, malformed or expired.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let secret = state_lock.read().await.jwt_secret.clone();

        match authenticate(&parts.headers, &secret) {
            AuthOutcome::Authenticated(claims) => {
                debug!(user_id = %claims.sub, "Request authenticated");
                Ok(AuthedUser {
                    id: claims.sub,
                    username: claims.username,
                    email: claims.email,
                })
            }
            outcome => {
                warn!(outcome = ?outcome, path = %parts.uri.path(), "Authentication failed");
                Err(ApiError::Unauthorized("Unauthorized".into()))
            }
        }
    }
}
