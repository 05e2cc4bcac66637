// src/installments/schedule.rs
//! Installment plan arithmetic: per-period amounts, due dates and progress.
//!
//! Everything here is pure; callers pass `today` explicitly.

use chrono::{Days, Months, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::common::round_cents;

/// Balances below half a cent count as settled
const SETTLED_EPSILON: f64 = 0.005;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Date reached after `periods` steps from `start`.
    ///
    /// Month-based steps keep the day of month, clamped to the month's end.
    pub fn advance(&self, start: NaiveDate, periods: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Weekly => start.checked_add_days(Days::new(7 * u64::from(periods))),
            Frequency::Biweekly => start.checked_add_days(Days::new(14 * u64::from(periods))),
            Frequency::Monthly => start.checked_add_months(Months::new(periods)),
            Frequency::Quarterly => start.checked_add_months(Months::new(periods.checked_mul(3)?)),
            Frequency::Yearly => start.checked_add_months(Months::new(periods.checked_mul(12)?)),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "biweekly" => Ok(Frequency::Biweekly),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency: {}", other)),
        }
    }
}

/// The stored terms of a plan
#[derive(Debug, Clone, PartialEq)]
pub struct PlanTerms {
    pub total_amount: f64,
    pub installment_count: u32,
    pub paid_count: u32,
    pub amount_paid: f64,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
}

impl PlanTerms {
    pub fn per_period_amount(&self) -> f64 {
        if self.installment_count == 0 {
            return 0.0;
        }
        round_cents(self.total_amount / f64::from(self.installment_count))
    }

    pub fn periods_remaining(&self) -> u32 {
        self.installment_count.saturating_sub(self.paid_count)
    }

    pub fn remaining_balance(&self) -> f64 {
        round_cents((self.total_amount - self.amount_paid).max(0.0))
    }

    pub fn is_complete(&self) -> bool {
        self.remaining_balance() < SETTLED_EPSILON
    }

    /// Cumulative amount due once `period` periods have been paid
    fn scheduled_through(&self, period: u32) -> f64 {
        if period >= self.installment_count {
            self.total_amount
        } else {
            round_cents(self.per_period_amount() * f64::from(period))
        }
    }

    /// Number of whole periods that `amount_paid` covers
    pub fn periods_covered(&self, amount_paid: f64) -> u32 {
        (1..=self.installment_count)
            .take_while(|&period| amount_paid + SETTLED_EPSILON >= self.scheduled_through(period))
            .fold(0, |covered, _| covered + 1)
    }

    /// Start date advanced by the number of periods already paid
    pub fn next_due_date(&self) -> Option<NaiveDate> {
        if self.is_complete() {
            return None;
        }
        self.frequency.advance(self.start_date, self.paid_count)
    }

    /// Share of the total already paid, 0 to 100 with one decimal
    pub fn progress_percentage(&self) -> f64 {
        if self.total_amount <= 0.0 {
            return 0.0;
        }
        let pct = (self.amount_paid / self.total_amount * 100.0).clamp(0.0, 100.0);
        (pct * 10.0).round() / 10.0
    }

    /// Amount that completes the current period; the last period absorbs rounding
    pub fn next_payment_amount(&self) -> f64 {
        let remaining = self.remaining_balance();
        let due = round_cents(self.scheduled_through(self.paid_count + 1) - self.amount_paid);
        due.clamp(0.0, remaining)
    }

    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.next_due_date().map(|due| (due - today).num_days())
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.days_until_due(today).map_or(false, |days| days < 0)
    }

    /// Terms after recording a payment of `amount`.
    ///
    /// A period only counts as paid once the running total reaches it.
    pub fn after_payment(&self, amount: f64) -> PlanTerms {
        let amount_paid = round_cents(self.amount_paid + amount);
        PlanTerms {
            amount_paid,
            paid_count: self.periods_covered(amount_paid),
            ..self.clone()
        }
    }

    pub fn snapshot(&self, today: NaiveDate) -> Schedule {
        Schedule {
            per_period_amount: self.per_period_amount(),
            periods_remaining: self.periods_remaining(),
            remaining_balance: self.remaining_balance(),
            progress_percentage: self.progress_percentage(),
            next_due_date: self.next_due_date().map(|d| d.format("%Y-%m-%d").to_string()),
            next_payment_amount: self.next_payment_amount(),
            days_until_due: self.days_until_due(today),
            is_overdue: self.is_overdue(today),
            is_complete: self.is_complete(),
        }
    }
}

/// Computed fields returned alongside each plan
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Schedule {
    pub per_period_amount: f64,
    pub periods_remaining: u32,
    pub remaining_balance: f64,
    pub progress_percentage: f64,
    pub next_due_date: Option<String>,
    pub next_payment_amount: f64,
    pub days_until_due: Option<i64>,
    pub is_overdue: bool,
    pub is_complete: bool,
}
