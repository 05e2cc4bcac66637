// src/services/google.rs
//! Google ID token verification through the tokeninfo endpoint
//!
//! Docs: https://developers.google.com/identity/sign-in/web/backend-auth

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::common::{safe_email_log, ApiError};

#[derive(Debug, Error)]
pub enum GoogleAuthError {
    #[error("Google sign-in is not configured")]
    NotConfigured,

    #[error("invalid or malformed id_token")]
    InvalidToken,

    #[error("expired or invalid id_token")]
    Rejected,

    #[error("token audience mismatch")]
    AudienceMismatch,

    #[error("token missing required fields")]
    MissingFields,

    #[error("token has expired")]
    Expired,

    #[error("google token validation service unavailable: {0}")]
    Unavailable(String),
}

impl From<GoogleAuthError> for ApiError {
    fn from(e: GoogleAuthError) -> Self {
        match e {
            GoogleAuthError::NotConfigured => ApiError::ServiceUnavailable(e.to_string()),
            GoogleAuthError::InvalidToken | GoogleAuthError::MissingFields => {
                ApiError::BadRequest(e.to_string())
            }
            GoogleAuthError::Rejected
            | GoogleAuthError::AudienceMismatch
            | GoogleAuthError::Expired => ApiError::Unauthorized(e.to_string()),
            GoogleAuthError::Unavailable(_) => {
                ApiError::BadGateway("google token validation service unavailable".to_string())
            }
        }
    }
}

/// Identity extracted from a verified Google ID token
#[derive(Debug, Clone, PartialEq)]
pub struct GoogleIdentity {
    pub subject: String,
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoogleVerifier {
    http: Client,
    client_id: Option<String>,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    pub fn new(http: Client, client_id: Option<String>, tokeninfo_url: String) -> Self {
        Self {
            http,
            client_id,
            tokeninfo_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some()
    }

    /// Verifies an ID token with Google and checks it against the configured client id
    pub async fn verify(&self, id_token: &str) -> Result<GoogleIdentity, GoogleAuthError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or(GoogleAuthError::NotConfigured)?;

        debug!("Initiating Google token validation with tokeninfo endpoint");

        let resp = self
            .http
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    endpoint = %self.tokeninfo_url,
                    "HTTP error contacting Google tokeninfo endpoint"
                );
                GoogleAuthError::Unavailable(e.to_string())
            })?;

        let status = resp.status();
        debug!(http_status = %status, "Received response from Google tokeninfo endpoint");

        if !status.is_success() {
            return Err(match status.as_u16() {
                400 => {
                    warn!(http_status = %status, "Google tokeninfo rejected a malformed token");
                    GoogleAuthError::InvalidToken
                }
                401 => {
                    warn!(http_status = %status, "Google tokeninfo reported expired or invalid token");
                    GoogleAuthError::Rejected
                }
                _ => {
                    warn!(http_status = %status, "Google tokeninfo returned error status");
                    GoogleAuthError::Unavailable(format!("tokeninfo returned {}", status))
                }
            });
        }

        let body = resp.json::<Value>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Google tokeninfo JSON response");
            GoogleAuthError::InvalidToken
        })?;

        check_token_info(&body, client_id, Utc::now().timestamp())
    }
}

/// Validates a tokeninfo payload: audience, expiry and required fields.
///
/// Google returns most numeric and boolean fields as strings, so both
/// representations are accepted.
pub fn check_token_info(
    body: &Value,
    client_id: &str,
    now: i64,
) -> Result<GoogleIdentity, GoogleAuthError> {
    match body.get("aud").and_then(Value::as_str) {
        Some(aud) if aud == client_id => {}
        Some(aud) => {
            warn!(
                token_audience = %aud,
                expected_client_id = %client_id,
                "Google token audience validation failed - rejecting token"
            );
            return Err(GoogleAuthError::AudienceMismatch);
        }
        None => {
            warn!("Google token missing audience field - rejecting token");
            return Err(GoogleAuthError::AudienceMismatch);
        }
    }

    if let Some(exp) = body.get("exp").and_then(as_i64) {
        if exp < now {
            warn!(token_exp = exp, current_time = now, "Google token has expired");
            return Err(GoogleAuthError::Expired);
        }
    }

    let email = body.get("email").and_then(Value::as_str).map(str::to_string);
    let sub = body.get("sub").and_then(Value::as_str).map(str::to_string);

    let (email, subject) = match (email, sub) {
        (Some(email), Some(sub)) if !email.is_empty() && !sub.is_empty() => (email, sub),
        (email, sub) => {
            warn!(
                has_email = email.is_some(),
                has_sub = sub.is_some(),
                "Google token missing required fields (email/sub)"
            );
            return Err(GoogleAuthError::MissingFields);
        }
    };

    let email_verified = body
        .get("email_verified")
        .and_then(as_bool)
        .unwrap_or(false);
    if !email_verified {
        warn!(email = %safe_email_log(&email), "Google token contains unverified email address");
    }

    Ok(GoogleIdentity {
        subject,
        email,
        email_verified,
        name: body.get("name").and_then(Value::as_str).map(str::to_string),
    })
}

fn as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn as_bool(value: &Value) -> Option<bool> {
    value
        .as_bool()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLIENT_ID: &str = "finance-client.apps.googleusercontent.com";

    fn payload(aud: &str) -> Value {
        json!({
            "aud": aud,
            "sub": "1098765",
            "email": "jane.doe@example.com",
            "email_verified": "true",
            "name": "Jane Doe",
            "exp": "4102444800"
        })
    }

    #[test]
    fn test_valid_payload_yields_identity() {
        let identity = check_token_info(&payload(CLIENT_ID), CLIENT_ID, 1_700_000_000).unwrap();
        assert_eq!(identity.subject, "1098765");
        assert_eq!(identity.email, "jane.doe@example.com");
        assert!(identity.email_verified);
        assert_eq!(identity.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_audience_mismatch_rejected() {
        let result = check_token_info(&payload("someone-else"), CLIENT_ID, 1_700_000_000);
        assert!(matches!(result, Err(GoogleAuthError::AudienceMismatch)));
    }

    #[test]
    fn test_missing_audience_rejected() {
        let mut body = payload(CLIENT_ID);
        body.as_object_mut().unwrap().remove("aud");
        let result = check_token_info(&body, CLIENT_ID, 1_700_000_000);
        assert!(matches!(result, Err(GoogleAuthError::AudienceMismatch)));
    }

    #[test]
    fn test_expired_payload_rejected() {
        let mut body = payload(CLIENT_ID);
        body["exp"] = json!(1_600_000_000);
        let result = check_token_info(&body, CLIENT_ID, 1_700_000_000);
        assert!(matches!(result, Err(GoogleAuthError::Expired)));
    }

    #[test]
    fn test_missing_email_rejected() {
        let mut body = payload(CLIENT_ID);
        body.as_object_mut().unwrap().remove("email");
        let result = check_token_info(&body, CLIENT_ID, 1_700_000_000);
        assert!(matches!(result, Err(GoogleAuthError::MissingFields)));
    }

    #[tokio::test]
    async fn test_unconfigured_verifier_refuses() {
        let verifier = GoogleVerifier::new(Client::new(), None, "http://127.0.0.1:9".into());
        let result = verifier.verify("anything").await;
        assert!(matches!(result, Err(GoogleAuthError::NotConfigured)));
    }

    #[test]
    fn test_error_status_mapping() {
        use axum::{http::StatusCode, response::IntoResponse};
        let status = |e: GoogleAuthError| ApiError::from(e).into_response().status();
        assert_eq!(status(GoogleAuthError::AudienceMismatch), StatusCode::UNAUTHORIZED);
        assert_eq!(status(GoogleAuthError::InvalidToken), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(GoogleAuthError::Unavailable("timeout".into())),
            StatusCode::BAD_GATEWAY
        );
    }
}
