// Common validation types and helpers shared by the record validators

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
            self.errors.extend(other.errors);
        }
    }

    /// Converts into `Err(ApiError)` when any error was recorded.
    pub fn into_result(self) -> Result<(), super::ApiError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(self.into())
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Trims optional text; blank values are stored as NULL.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Checks a required title-like text field.
pub fn validate_text(result: &mut ValidationResult, field: &str, value: Option<&str>, max: usize) {
    match value.map(str::trim) {
        None | Some("") => result.add_error(field, "This field is required"),
        Some(v) if v.chars().count() > max => {
            result.add_error(field, &format!("Must be at most {} characters", max))
        }
        Some(_) => {}
    }
}

/// Checks a required date field.
pub fn validate_date(result: &mut ValidationResult, field: &str, value: Option<&str>) {
    match value.map(str::trim) {
        None | Some("") => result.add_error(field, "Date is required"),
        Some(v) if parse_date(v).is_none() => {
            result.add_error(field, "Date must be in YYYY-MM-DD format")
        }
        Some(_) => {}
    }
}

/// Checks an optional date field.
pub fn validate_optional_date(result: &mut ValidationResult, field: &str, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        if parse_date(v).is_none() {
            result.add_error(field, "Date must be in YYYY-MM-DD format");
        }
    }
}

/// Validates the optional `month`/`year` list filter.
pub fn validate_period_filter(month: Option<u32>, year: Option<i32>) -> ValidationResult {
    let mut result = ValidationResult::new();
    if let Some(m) = month {
        if !(1..=12).contains(&m) {
            result.add_error("month", "Month must be between 1 and 12");
        }
    }
    if let Some(y) = year {
        if !(1900..=9999).contains(&y) {
            result.add_error("year", "Year must be between 1900 and 9999");
        }
    }
    result
}
