// src/income/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::AmountInput;

pub const INCOME_COLUMNS: &str =
    "id AS incomeid, title AS incometitle, amount, income_date, source, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Income {
    pub incomeid: String,
    pub incometitle: String,
    pub amount: f64,
    pub income_date: String,
    pub source: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Body of POST /income; carrying `incomeid` turns the call into an update
#[derive(Debug, Deserialize)]
pub struct SaveIncomeRequest {
    #[serde(alias = "id")]
    pub incomeid: Option<String>,
    #[serde(alias = "title")]
    pub incometitle: Option<String>,
    pub amount: Option<AmountInput>,
    #[serde(alias = "date")]
    pub income_date: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteIncomeQuery {
    pub id: Option<String>,
}
