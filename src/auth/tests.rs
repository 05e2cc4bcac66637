//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - Registration validation and conflicts
//! - Login and session checks
//! - Google sign-in against a stub tokeninfo endpoint

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::Validator;
    use crate::testing::{test_config, TestApp, TEST_PASSWORD};
    use axum::{
        extract::Query,
        http::{Method, StatusCode},
        routing::get,
        Json, Router,
    };
    use chrono::Duration;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use tokio::net::TcpListener;

    // ============================================================================
    // Validator Tests
    // ============================================================================

    fn register_request(username: &str, password: &str) -> models::RegisterRequest {
        models::RegisterRequest {
            email: Some("someone@example.com".to_string()),
            username: Some(username.to_string()),
            password: Some(password.to_string()),
            confirm_password: Some(password.to_string()),
        }
    }

    #[test]
    fn test_register_validator_valid_data() {
        let result = validators::RegisterValidator.validate(&register_request("jane_doe", TEST_PASSWORD));
        assert!(result.is_valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_username_outside_allowed_characters_rejected() {
        for username in ["jane-doe", "jane1", "jane doe", "jané"] {
            let result = validators::RegisterValidator.validate(&register_request(username, TEST_PASSWORD));
            assert!(
                result.errors.iter().any(|e| e.field == "username"),
                "{} should be rejected",
                username
            );
        }
    }

    #[test]
    fn test_password_missing_every_class_lists_all_four() {
        let result = validators::validate_password("        ");
        let messages: Vec<&str> = result.errors.iter().map(|e| e.message.as_str()).collect();

        assert_eq!(messages.len(), 4);
        assert!(messages.contains(&validators::MISSING_UPPERCASE));
        assert!(messages.contains(&validators::MISSING_LOWERCASE));
        assert!(messages.contains(&validators::MISSING_DIGIT));
        assert!(messages.contains(&validators::MISSING_SPECIAL));
    }

    #[test]
    fn test_password_confirmation_must_match() {
        let mut request = register_request("jane_doe", TEST_PASSWORD);
        request.confirm_password = Some("Different#1".to_string());
        let result = validators::RegisterValidator.validate(&request);
        assert!(result.errors.iter().any(|e| e.field == "confirm_password"));
    }

    #[test]
    fn test_username_generation_from_email() {
        assert_eq!(validators::username_base("jane.doe+work@example.com"), "janedoework");
        assert_eq!(validators::username_base("...@example.com"), "user");
        assert_eq!(validators::pick_username("jane", ["bob"]), "jane");
        assert_eq!(validators::pick_username("jane", ["Jane", "jane1"]), "jane2");
    }

    // ============================================================================
    // Route Tests
    // ============================================================================

    #[tokio::test]
    async fn test_register_returns_user_and_token() {
        let app = TestApp::new().await;
        let (status, body) = app
            .request(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "email": "alice@example.com",
                    "username": "alice",
                    "password": TEST_PASSWORD,
                    "confirm_password": TEST_PASSWORD
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["username"], "alice");
        assert!(body["user"].get("password_hash").is_none());
        assert!(body["token"].as_str().unwrap().len() > 20);
    }

    #[tokio::test]
    async fn test_register_case_only_duplicate_conflicts() {
        let app = TestApp::new().await;
        app.register("Alice").await;

        let (status, body) = app
            .request(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "email": "other@example.com",
                    "username": "alice",
                    "password": TEST_PASSWORD,
                    "confirm_password": TEST_PASSWORD
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Username already taken");
    }

    #[tokio::test]
    async fn test_register_weak_password_reports_every_reason() {
        let app = TestApp::new().await;
        let (status, body) = app
            .request(
                Method::POST,
                "/register",
                None,
                Some(json!({
                    "email": "weak@example.com",
                    "username": "weakling",
                    "password": "        ",
                    "confirm_password": "        "
                })),
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let details = body["details"].as_array().unwrap();
        assert_eq!(details.iter().filter(|d| d["field"] == "password").count(), 4);
    }

    #[tokio::test]
    async fn test_login_success_and_failures() {
        let app = TestApp::new().await;
        app.register("bob").await;

        let (status, body) = app
            .request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": "bob", "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["username"], "bob");

        let (status, _) = app
            .request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": "bob", "password": "Wrong#Pass1" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app
            .request(
                Method::POST,
                "/login",
                None,
                Some(json!({ "username": "nobody", "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_check_distinguishes_expired_from_invalid() {
        let app = TestApp::new().await;
        let (token, user_id) = app.register("carol").await;

        let (status, body) = app.get("/check", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["id"], user_id.as_str());

        let user = User {
            id: user_id,
            username: "carol".into(),
            email: "carol@example.com".into(),
            password_hash: String::new(),
            is_google: false,
            created_at: None,
        };
        let expired =
            token::issue_token(&user, &test_config().jwt_secret, Duration::seconds(-60)).unwrap();

        let (status, body) = app.get("/check", &expired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Token expired");

        let (status, body) = app.get("/check", "not-a-token").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");

        let (status, body) = app.request(Method::GET, "/check", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");

        // Resource routes collapse both cases
        let (status, body) = app.get("/income", &expired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }

    // ============================================================================
    // Google Sign-in
    // ============================================================================

    /// Serves a tokeninfo payload whose audience is `aud`
    async fn spawn_tokeninfo(aud: &'static str, email: &'static str) -> String {
        let app = Router::new().route(
            "/tokeninfo",
            get(move |Query(query): Query<HashMap<String, String>>| async move {
                if query.get("id_token").map(String::as_str) == Some("malformed") {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({ "error": "invalid_token" })),
                    );
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "aud": aud,
                        "sub": "110248495921238986420",
                        "email": email,
                        "email_verified": "true",
                        "exp": "4102444800"
                    })),
                )
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/tokeninfo", addr)
    }

    async fn google_app(aud: &'static str, email: &'static str) -> TestApp {
        let mut config = test_config();
        config.google_tokeninfo_url = spawn_tokeninfo(aud, email).await;
        TestApp::with_config(config).await
    }

    #[tokio::test]
    async fn test_google_sign_in_creates_user_with_suffixed_username() {
        let config = test_config();
        let client_id: &'static str =
            Box::leak(config.google_client_id.clone().unwrap().into_boxed_str());
        let app = google_app(client_id, "janedoe@gmail.com").await;
        app.register("janedoe").await;

        let (status, body) = app
            .request(Method::POST, "/google", None, Some(json!({ "token": "good" })))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["user"]["username"], "janedoe1");
        assert_eq!(body["user"]["is_google"], true);

        let claims = token::verify(body["token"].as_str().unwrap(), &config.jwt_secret).unwrap();
        assert_eq!(claims.google, Some(true));

        // Second sign-in reuses the same account
        let (_, again) = app
            .request(Method::POST, "/google", None, Some(json!({ "token": "good" })))
            .await;
        assert_eq!(again["user"]["id"], body["user"]["id"]);
    }

    #[tokio::test]
    async fn test_google_sign_in_rejects_foreign_audience() {
        let app = google_app("another-app.apps.googleusercontent.com", "mallory@gmail.com").await;

        let (status, body): (StatusCode, Value) = app
            .request(Method::POST, "/google", None, Some(json!({ "token": "good" })))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "token audience mismatch");
    }

    #[tokio::test]
    async fn test_google_sign_in_malformed_token() {
        let app = google_app("test-client.apps.googleusercontent.com", "x@gmail.com").await;
        let (status, _) = app
            .request(Method::POST, "/google", None, Some(json!({ "token": "malformed" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
