// src/income/validators.rs

use super::models::*;
use crate::common::validation::{validate_date, validate_text};
use crate::common::{validate_amount, ValidationResult, Validator};

pub struct IncomeValidator;

impl Validator<SaveIncomeRequest> for IncomeValidator {
    fn validate(&self, data: &SaveIncomeRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.incomeid.as_deref().map_or(false, |id| id.trim().is_empty()) {
            result.add_error("incomeid", "Income id must not be blank");
        }
        validate_text(&mut result, "incometitle", data.incometitle.as_deref(), 255);
        validate_amount(&mut result, "amount", data.amount.as_ref());
        validate_date(&mut result, "income_date", data.income_date.as_deref());

        if data.source.as_deref().map_or(false, |s| s.chars().count() > 100) {
            result.add_error("source", "Source must be at most 100 characters");
        }

        result
    }
}
