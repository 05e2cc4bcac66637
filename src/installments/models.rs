// src/installments/models.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::schedule::{Frequency, PlanTerms, Schedule};
use crate::common::validation::parse_date;
use crate::common::{AmountInput, ApiError};

pub const INSTALLMENT_COLUMNS: &str = "id AS installmentid, title AS installmenttitle, \
     total_amount, installment_count, paid_count, amount_paid, frequency, start_date, \
     created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Installment {
    pub installmentid: String,
    pub installmenttitle: String,
    pub total_amount: f64,
    pub installment_count: i64,
    pub paid_count: i64,
    pub amount_paid: f64,
    pub frequency: String,
    pub start_date: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Installment {
    pub fn terms(&self) -> Result<PlanTerms, ApiError> {
        let corrupt = |what: &str| {
            ApiError::InternalServer(format!(
                "installment {} has invalid {}",
                self.installmentid, what
            ))
        };

        Ok(PlanTerms {
            total_amount: self.total_amount,
            installment_count: u32::try_from(self.installment_count).map_err(|_| corrupt("count"))?,
            paid_count: u32::try_from(self.paid_count).map_err(|_| corrupt("paid count"))?,
            amount_paid: self.amount_paid,
            frequency: self.frequency.parse().map_err(|_| corrupt("frequency"))?,
            start_date: parse_date(&self.start_date).ok_or_else(|| corrupt("start date"))?,
        })
    }

    pub fn with_schedule(self, today: NaiveDate) -> Result<InstallmentView, ApiError> {
        let schedule = self.terms()?.snapshot(today);
        Ok(InstallmentView {
            installment: self,
            schedule,
        })
    }
}

/// A plan together with its computed schedule fields
#[derive(Debug, Clone, Serialize)]
pub struct InstallmentView {
    #[serde(flatten)]
    pub installment: Installment,
    #[serde(flatten)]
    pub schedule: Schedule,
}

#[derive(Debug, Deserialize)]
pub struct CreateInstallmentRequest {
    #[serde(alias = "title")]
    pub installmenttitle: Option<String>,
    #[serde(alias = "amount")]
    pub total_amount: Option<AmountInput>,
    pub installment_count: Option<i64>,
    pub frequency: Option<String>,
    pub start_date: Option<String>,
}

impl CreateInstallmentRequest {
    pub fn frequency(&self) -> Option<Frequency> {
        match self.frequency.as_deref().map(str::trim) {
            None | Some("") => Some(Frequency::Monthly),
            Some(f) => f.parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(alias = "installment_id", alias = "id")]
    pub installmentid: Option<String>,
    pub amount: Option<AmountInput>,
    pub payment_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub paymentid: String,
    pub installmentid: String,
    pub amount: f64,
    pub payment_date: String,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub payment: Payment,
    pub installment: InstallmentView,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
}
