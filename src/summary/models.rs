// src/summary/models.rs

use serde::Serialize;

use crate::common::round_cents;

/// Dashboard figures for one calendar month
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub month: u32,
    pub year: i32,
    pub currency: String,
    /// All-time income minus all-time expenses
    pub total_balance: f64,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub net_flow: f64,
    pub outstanding_loans: f64,
    pub installment_balance: f64,
    pub active_installments: usize,
    pub overdue_installments: usize,
}

/// Raw sums read from storage
#[derive(Debug, Default, Clone)]
pub struct Totals {
    pub income_all_time: f64,
    pub expenses_all_time: f64,
    pub income_in_period: f64,
    pub expenses_in_period: f64,
    pub outstanding_loans: f64,
    pub installment_balance: f64,
    pub active_installments: usize,
    pub overdue_installments: usize,
}

impl Totals {
    pub fn into_summary(self, month: u32, year: i32, currency: String) -> Summary {
        Summary {
            month,
            year,
            currency,
            total_balance: round_cents(self.income_all_time - self.expenses_all_time),
            monthly_income: round_cents(self.income_in_period),
            monthly_expenses: round_cents(self.expenses_in_period),
            net_flow: round_cents(self.income_in_period - self.expenses_in_period),
            outstanding_loans: round_cents(self.outstanding_loans),
            installment_balance: round_cents(self.installment_balance),
            active_installments: self.active_installments,
            overdue_installments: self.overdue_installments,
        }
    }
}
