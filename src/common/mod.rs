// Common module - shared types and utilities across all modules

pub mod config;
pub mod error;
pub mod helpers;
pub mod id_generator;
pub mod migrations;
pub mod money;
pub mod state;
pub mod validation;

// Re-export commonly used types for convenience
pub use error::ApiError;
pub use helpers::{safe_email_log, safe_token_log};
pub use id_generator::*;
pub use money::{round_cents, validate_amount, validated_amount, AmountInput};
pub use state::AppState;
pub use validation::{ValidationError, ValidationResult, Validator};

use serde::Deserialize;

/// Optional `?month=&year=` filter accepted by list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl PeriodQuery {
    pub fn validate(&self) -> Result<(), ApiError> {
        validation::validate_period_filter(self.month, self.year).into_result()
    }
}

/// Predicate matching `column` against an optional month and year.
///
/// Bind order: month, month, year, year.
pub fn period_predicate(column: &str) -> String {
    format!(
        "(? IS NULL OR CAST(strftime('%m', {col}) AS INTEGER) = ?) \
         AND (? IS NULL OR CAST(strftime('%Y', {col}) AS INTEGER) = ?)",
        col = column
    )
}
