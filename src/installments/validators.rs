// src/installments/validators.rs

use super::models::*;
use crate::common::validation::{validate_date, validate_optional_date, validate_text};
use crate::common::{validate_amount, ValidationResult, Validator};

pub const MAX_INSTALLMENT_COUNT: i64 = 600;
pub const UPCOMING_DEFAULT_DAYS: i64 = 30;
pub const UPCOMING_MAX_DAYS: i64 = 365;

pub struct InstallmentValidator;

impl Validator<CreateInstallmentRequest> for InstallmentValidator {
    fn validate(&self, data: &CreateInstallmentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        validate_text(&mut result, "installmenttitle", data.installmenttitle.as_deref(), 255);
        validate_amount(&mut result, "total_amount", data.total_amount.as_ref());
        validate_date(&mut result, "start_date", data.start_date.as_deref());

        match data.installment_count {
            None => result.add_error("installment_count", "Installment count is required"),
            Some(n) if !(1..=MAX_INSTALLMENT_COUNT).contains(&n) => result.add_error(
                "installment_count",
                &format!("Installment count must be between 1 and {}", MAX_INSTALLMENT_COUNT),
            ),
            Some(_) => {}
        }

        if data.frequency().is_none() {
            result.add_error(
                "frequency",
                "Frequency must be one of weekly, biweekly, monthly, quarterly, yearly",
            );
        }

        result
    }
}

pub struct PaymentValidator;

impl Validator<PaymentRequest> for PaymentValidator {
    fn validate(&self, data: &PaymentRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.installmentid.as_deref().map_or(true, |id| id.trim().is_empty()) {
            result.add_error("installmentid", "Installment id is required");
        }
        if data.amount.is_some() {
            validate_amount(&mut result, "amount", data.amount.as_ref());
        }
        validate_optional_date(&mut result, "payment_date", data.payment_date.as_deref());

        result
    }
}

/// Resolves the `days` window of the upcoming list
pub fn upcoming_window(days: Option<i64>) -> Result<i64, ValidationResult> {
    match days {
        None => Ok(UPCOMING_DEFAULT_DAYS),
        Some(d) if (0..=UPCOMING_MAX_DAYS).contains(&d) => Ok(d),
        Some(_) => {
            let mut result = ValidationResult::new();
            result.add_error(
                "days",
                &format!("Days must be between 0 and {}", UPCOMING_MAX_DAYS),
            );
            Err(result)
        }
    }
}
