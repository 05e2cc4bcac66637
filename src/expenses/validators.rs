// src/expenses/validators.rs

use super::models::*;
use crate::common::validation::{validate_date, validate_optional_date, validate_text};
use crate::common::{validate_amount, ValidationResult, Validator};

const TITLE_MAX: usize = 255;
const CATEGORY_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 2000;

pub const RECENT_DEFAULT_LIMIT: i64 = 5;
pub const RECENT_MAX_LIMIT: i64 = 50;

pub struct ExpenseValidator;

impl Validator<CreateExpenseRequest> for ExpenseValidator {
    fn validate(&self, data: &CreateExpenseRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_text(&mut result, "expensetitle", data.expensetitle.as_deref(), TITLE_MAX);
        validate_amount(&mut result, "amount", data.amount.as_ref());
        validate_date(&mut result, "expense_date", data.expense_date.as_deref());
        check_optional_lengths(&mut result, data.category.as_deref(), data.description.as_deref());

        result
    }
}

impl Validator<UpdateExpenseRequest> for ExpenseValidator {
    fn validate(&self, data: &UpdateExpenseRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.expensetitle.is_some() {
            validate_text(&mut result, "expensetitle", data.expensetitle.as_deref(), TITLE_MAX);
        }
        if data.amount.is_some() {
            validate_amount(&mut result, "amount", data.amount.as_ref());
        }
        validate_optional_date(&mut result, "expense_date", data.expense_date.as_deref());
        check_optional_lengths(&mut result, data.category.as_deref(), data.description.as_deref());

        result
    }
}

fn check_optional_lengths(result: &mut ValidationResult, category: Option<&str>, description: Option<&str>) {
    if category.map_or(false, |c| c.chars().count() > CATEGORY_MAX) {
        result.add_error(
            "category",
            &format!("Category must be at most {} characters", CATEGORY_MAX),
        );
    }
    if description.map_or(false, |d| d.chars().count() > DESCRIPTION_MAX) {
        result.add_error(
            "description",
            &format!("Description must be at most {} characters", DESCRIPTION_MAX),
        );
    }
}

/// Resolves the `limit` query parameter of the recent list
pub fn recent_limit(limit: Option<i64>) -> Result<i64, ValidationResult> {
    match limit {
        None => Ok(RECENT_DEFAULT_LIMIT),
        Some(n) if n < 1 => {
            let mut result = ValidationResult::new();
            result.add_error("limit", "Limit must be at least 1");
            Err(result)
        }
        Some(n) => Ok(n.min(RECENT_MAX_LIMIT)),
    }
}
