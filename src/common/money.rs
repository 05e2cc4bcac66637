//! Monetary amount input handling.
//!
//! Clients send amounts either as JSON numbers or as numeric strings
//! (`"1500.00"`), so request structs take an [`AmountInput`] and validators
//! decide whether it is usable.

use serde::Deserialize;

use super::ValidationResult;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

/// Largest amount accepted on input
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

impl AmountInput {
    fn parsed(&self) -> Option<f64> {
        let value = match self {
            AmountInput::Number(n) => *n,
            AmountInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (value.is_finite() && value <= MAX_AMOUNT).then_some(value)
    }

    /// Returns the amount rounded to cents when that is still above zero.
    pub fn positive(&self) -> Option<f64> {
        self.parsed().map(round_cents).filter(|v| *v > 0.0)
    }

    /// Like [`positive`](Self::positive) but unrounded, and zero is allowed.
    pub fn non_negative(&self) -> Option<f64> {
        self.parsed().filter(|v| *v >= 0.0)
    }

    fn exceeds_max(&self) -> bool {
        match self {
            AmountInput::Number(n) => *n > MAX_AMOUNT,
            AmountInput::Text(s) => s.trim().parse::<f64>().map_or(false, |v| v > MAX_AMOUNT),
        }
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

/// Rounds to whole cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Records an error unless `amount` is present and at least one cent.
pub fn validate_amount(result: &mut ValidationResult, field: &str, amount: Option<&AmountInput>) {
    match amount {
        None => result.add_error(field, "Amount is required"),
        Some(a) if a.exceeds_max() => {
            result.add_error(field, "Amount must not exceed 1000000000000")
        }
        Some(a) if a.positive().is_none() => {
            result.add_error(field, "Amount must be a positive number")
        }
        Some(_) => {}
    }
}

/// Reads an amount that has already passed validation.
pub fn validated_amount(amount: Option<&AmountInput>) -> f64 {
    amount.and_then(AmountInput::positive).unwrap_or(0.0)
}
