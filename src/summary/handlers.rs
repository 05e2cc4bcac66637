// src/summary/handlers.rs

use axum::extract::{Extension, Json, Query};
use chrono::{Datelike, Utc};
use sqlx::SqliteConnection;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::models::{Summary, Totals};
use crate::auth::AuthedUser;
use crate::common::{period_predicate, ApiError, AppState, PeriodQuery};
use crate::installments::models::{Installment, INSTALLMENT_COLUMNS};
use crate::settings::models::DEFAULT_CURRENCY;

/// GET /summary - Balance and cash flow for the current (or requested) month
///
/// Every sum is read inside one transaction so the figures agree with each other.
pub async fn get_summary(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(period): Query<PeriodQuery>,
) -> Result<Json<Summary>, ApiError> {
    let state = state_lock.read().await.clone();
    period.validate()?;

    let today = Utc::now().date_naive();
    let month = period.month.unwrap_or_else(|| today.month());
    let year = period.year.unwrap_or_else(|| today.year());

    let mut tx = state.db.begin().await.map_err(|e| {
        error!(error = %e, user_id = %authed.id, "Failed to start summary transaction");
        ApiError::DatabaseError(e)
    })?;

    let mut totals = Totals {
        income_all_time: sum_all(&mut tx, "income", &authed.id).await?,
        expenses_all_time: sum_all(&mut tx, "expenses", &authed.id).await?,
        income_in_period: sum_period(&mut tx, "income", "income_date", &authed.id, month, year).await?,
        expenses_in_period: sum_period(&mut tx, "expenses", "expense_date", &authed.id, month, year)
            .await?,
        ..Totals::default()
    };

    totals.outstanding_loans = sqlx::query_scalar(
        "SELECT CAST(COALESCE(SUM(MAX(amount - amount_paid, 0)), 0) AS REAL) FROM loans WHERE user_id = ?",
    )
    .bind(&authed.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| log_db_error(e, &authed.id, "loans"))?;

    let sql = format!("SELECT {} FROM installments WHERE user_id = ?", INSTALLMENT_COLUMNS);
    let plans = sqlx::query_as::<_, Installment>(&sql)
        .bind(&authed.id)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| log_db_error(e, &authed.id, "installments"))?;

    for plan in &plans {
        let terms = plan.terms()?;
        if terms.is_complete() {
            continue;
        }
        totals.installment_balance += terms.remaining_balance();
        totals.active_installments += 1;
        if terms.is_overdue(today) {
            totals.overdue_installments += 1;
        }
    }

    let currency: Option<String> =
        sqlx::query_scalar("SELECT currency FROM user_settings WHERE user_id = ?")
            .bind(&authed.id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| log_db_error(e, &authed.id, "user_settings"))?;

    tx.commit().await?;

    let summary = totals.into_summary(
        month,
        year,
        currency.unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
    );

    debug!(
        user_id = %authed.id,
        month,
        year,
        net_flow = summary.net_flow,
        "Computed summary"
    );

    Ok(Json(summary))
}

async fn sum_all(conn: &mut SqliteConnection, table: &str, user_id: &str) -> Result<f64, ApiError> {
    let sql = format!(
        "SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) FROM {} WHERE user_id = ?",
        table
    );
    sqlx::query_scalar(&sql)
        .bind(user_id)
        .fetch_one(conn)
        .await
        .map_err(|e| log_db_error(e, user_id, table))
}

async fn sum_period(
    conn: &mut SqliteConnection,
    table: &str,
    date_column: &str,
    user_id: &str,
    month: u32,
    year: i32,
) -> Result<f64, ApiError> {
    let sql = format!(
        "SELECT CAST(COALESCE(SUM(amount), 0) AS REAL) FROM {} WHERE user_id = ? AND {}",
        table,
        period_predicate(date_column)
    );
    sqlx::query_scalar(&sql)
        .bind(user_id)
        .bind(month)
        .bind(month)
        .bind(year)
        .bind(year)
        .fetch_one(conn)
        .await
        .map_err(|e| log_db_error(e, user_id, table))
}

fn log_db_error(e: sqlx::Error, user_id: &str, table: &str) -> ApiError {
    error!(error = %e, user_id = %user_id, table = %table, "Database error computing summary");
    ApiError::DatabaseError(e)
}
