// src/loans/validators.rs

use super::models::*;
use crate::common::validation::{parse_date, validate_date, validate_optional_date, validate_text};
use crate::common::{round_cents, validate_amount, AmountInput, ValidationResult, Validator};

pub const MAX_INTEREST_RATE: f64 = 100.0;

pub struct LoanValidator;

impl Validator<LoanRequest> for LoanValidator {
    fn validate(&self, data: &LoanRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_text(&mut result, "loantitle", data.loantitle.as_deref(), 255);
        validate_amount(&mut result, "amount", data.amount.as_ref());
        validate_date(&mut result, "start_date", data.start_date.as_deref());
        validate_optional_date(&mut result, "due_date", data.due_date.as_deref());

        if data.lender.as_deref().map_or(false, |l| l.chars().count() > 255) {
            result.add_error("lender", "Lender must be at most 255 characters");
        }

        if let Some(rate) = &data.interest_rate {
            match rate.non_negative() {
                Some(r) if r <= MAX_INTEREST_RATE => {}
                _ => result.add_error(
                    "interest_rate",
                    "Interest rate must be a number between 0 and 100",
                ),
            }
        }

        if let Some(paid) = &data.amount_paid {
            match (paid.non_negative(), data.amount.as_ref().and_then(AmountInput::positive)) {
                (None, _) => result.add_error("amount_paid", "Amount paid must be zero or more"),
                (Some(p), Some(total)) if round_cents(p) > total => {
                    result.add_error("amount_paid", "Amount paid cannot exceed the loan amount")
                }
                _ => {}
            }
        }

        let start = data.start_date.as_deref().and_then(parse_date);
        let due = data.due_date.as_deref().and_then(parse_date);
        if let (Some(start), Some(due)) = (start, due) {
            if due < start {
                result.add_error("due_date", "Due date must be on or after the start date");
            }
        }

        result
    }
}
