// src/auth/validators.rs

use regex::Regex;
use std::sync::OnceLock;

use super::models::*;
use crate::common::{ValidationResult, Validator};

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const MISSING_UPPERCASE: &str = "Password must contain an uppercase letter";
pub const MISSING_LOWERCASE: &str = "Password must contain a lowercase letter";
pub const MISSING_DIGIT: &str = "Password must contain a number";
pub const MISSING_SPECIAL: &str = "Password must contain a special character";

fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_]+$").expect("valid username regex"))
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex")
    })
}

pub struct RegisterValidator;

impl Validator<RegisterRequest> for RegisterValidator {
    fn validate(&self, data: &RegisterRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        match data.email.as_deref().map(str::trim) {
            None | Some("") => result.add_error("email", "Email is required"),
            Some(email) if email.len() > 254 || !email_pattern().is_match(email) => {
                result.add_error("email", "Email address is invalid")
            }
            Some(_) => {}
        }

        match data.username.as_deref().map(str::trim) {
            None | Some("") => result.add_error("username", "Username is required"),
            Some(username) => {
                if !username_pattern().is_match(username) {
                    result.add_error(
                        "username",
                        "Username may only contain letters and underscores",
                    );
                }
                if !(3..=30).contains(&username.chars().count()) {
                    result.add_error("username", "Username must be between 3 and 30 characters");
                }
            }
        }

        match data.password.as_deref() {
            None | Some("") => result.add_error("password", "Password is required"),
            Some(password) => result.merge(validate_password(password)),
        }

        if data.confirm_password.as_deref() != data.password.as_deref() {
            result.add_error("confirm_password", "Passwords do not match");
        }

        result
    }
}

/// Length and character-class checks; every missing class is reported
pub fn validate_password(password: &str) -> ValidationResult {
    let mut result = ValidationResult::new();

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        result.add_error(
            "password",
            &format!("Password must be at least {} characters", PASSWORD_MIN_LENGTH),
        );
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        result.add_error("password", MISSING_UPPERCASE);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        result.add_error("password", MISSING_LOWERCASE);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        result.add_error("password", MISSING_DIGIT);
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        result.add_error("password", MISSING_SPECIAL);
    }

    result
}

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        if data.username.as_deref().map_or(true, |u| u.trim().is_empty()) {
            result.add_error("username", "Username is required");
        }
        if data.password.as_deref().map_or(true, str::is_empty) {
            result.add_error("password", "Password is required");
        }
        result
    }
}

/// Username seed for Google accounts: the email local part reduced to
/// `[A-Za-z0-9_]`, or `user` when nothing usable remains
pub fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(24)
        .collect();
    if base.is_empty() {
        "user".to_string()
    } else {
        base
    }
}

/// First of `base`, `base1`, `base2` and so on not in `taken`, ignoring case
pub fn pick_username<'a, I>(base: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: std::collections::HashSet<String> =
        taken.into_iter().map(str::to_lowercase).collect();

    if !taken.contains(&base.to_lowercase()) {
        return base.to_string();
    }

    (1u32..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| !taken.contains(&candidate.to_lowercase()))
        .unwrap_or_else(|| base.to_string())
}
