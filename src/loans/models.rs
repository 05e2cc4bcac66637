// src/loans/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::AmountInput;

/// Status is derived from the repayment progress, never stored
pub const LOAN_COLUMNS: &str = "id AS loanid, title AS loantitle, lender, amount, interest_rate, \
     start_date, due_date, amount_paid, \
     CASE WHEN amount_paid >= amount THEN 'paid' ELSE 'active' END AS status, \
     created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub loanid: String,
    pub loantitle: String,
    pub lender: Option<String>,
    pub amount: f64,
    pub interest_rate: Option<f64>,
    pub start_date: String,
    pub due_date: Option<String>,
    pub amount_paid: f64,
    pub status: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Create body, and the patch body of PUT /loans/:id
#[derive(Debug, Default, Deserialize)]
pub struct LoanRequest {
    #[serde(alias = "title")]
    pub loantitle: Option<String>,
    pub lender: Option<String>,
    pub amount: Option<AmountInput>,
    pub interest_rate: Option<AmountInput>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub amount_paid: Option<AmountInput>,
}

impl LoanRequest {
    /// Fills fields missing from a patch with the stored values
    pub fn merged_with(self, existing: &Loan) -> LoanRequest {
        LoanRequest {
            loantitle: self.loantitle.or_else(|| Some(existing.loantitle.clone())),
            lender: self.lender.or_else(|| existing.lender.clone()),
            amount: self.amount.or(Some(existing.amount.into())),
            interest_rate: self
                .interest_rate
                .or_else(|| existing.interest_rate.map(AmountInput::from)),
            start_date: self.start_date.or_else(|| Some(existing.start_date.clone())),
            due_date: self.due_date.or_else(|| existing.due_date.clone()),
            amount_paid: self.amount_paid.or(Some(existing.amount_paid.into())),
        }
    }
}
