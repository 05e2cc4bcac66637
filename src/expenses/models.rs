// src/expenses/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::AmountInput;

/// Column list shared by every expense read; aliases match the JSON names
pub const EXPENSE_COLUMNS: &str = "id AS expenseid, title AS expensetitle, amount, category, \
     expense_date, description, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub expenseid: String,
    pub expensetitle: String,
    pub amount: f64,
    pub category: Option<String>,
    pub expense_date: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    #[serde(alias = "title")]
    pub expensetitle: Option<String>,
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    #[serde(alias = "date")]
    pub expense_date: Option<String>,
    pub description: Option<String>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    #[serde(alias = "title")]
    pub expensetitle: Option<String>,
    pub amount: Option<AmountInput>,
    pub category: Option<String>,
    #[serde(alias = "date")]
    pub expense_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}
