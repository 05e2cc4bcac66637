// src/loans/handlers.rs

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{Loan, LoanRequest, LOAN_COLUMNS};
use super::validators::LoanValidator;
use crate::auth::AuthedUser;
use crate::common::validation::non_blank;
use crate::common::{
    generate_loan_id, round_cents, validated_amount, AmountInput, ApiError, AppState, Validator,
};

/// Column values of a validated loan request
struct LoanValues<'a> {
    title: Option<&'a str>,
    lender: Option<&'a str>,
    amount: f64,
    interest_rate: Option<f64>,
    start_date: Option<&'a str>,
    due_date: Option<&'a str>,
    amount_paid: f64,
}

impl<'a> LoanValues<'a> {
    fn from_request(request: &'a LoanRequest) -> Self {
        Self {
            title: request.loantitle.as_deref().map(str::trim),
            lender: non_blank(request.lender.as_deref()),
            amount: validated_amount(request.amount.as_ref()),
            interest_rate: request.interest_rate.as_ref().and_then(AmountInput::non_negative),
            start_date: request.start_date.as_deref().map(str::trim),
            due_date: non_blank(request.due_date.as_deref()),
            amount_paid: request
                .amount_paid
                .as_ref()
                .and_then(AmountInput::non_negative)
                .map(round_cents)
                .unwrap_or(0.0),
        }
    }
}

/// GET /loans - All loans of the caller, open ones first
pub async fn list_loans(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<Loan>>, ApiError> {
    let state = state_lock.read().await.clone();

    let sql = format!(
        "SELECT {} FROM loans WHERE user_id = ? \
         ORDER BY (amount_paid >= amount), due_date IS NULL, due_date, start_date DESC",
        LOAN_COLUMNS
    );

    let loans = sqlx::query_as::<_, Loan>(&sql)
        .bind(&authed.id)
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %authed.id, "Database error fetching loans");
            ApiError::DatabaseError(e)
        })?;

    debug!(user_id = %authed.id, loan_count = loans.len(), "Fetched loans");

    Ok(Json(loans))
}

/// POST /loans
pub async fn create_loan(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<LoanRequest>,
) -> Result<(StatusCode, Json<Loan>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = LoanValidator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            user_id = %authed.id,
            errors = ?validation_result.errors,
            "Loan creation validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let loan_id = generate_loan_id();
    let values = LoanValues::from_request(&request);

    sqlx::query(
        r#"
        INSERT INTO loans (id, user_id, title, lender, amount, interest_rate, start_date, due_date, amount_paid)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&loan_id)
    .bind(&authed.id)
    .bind(values.title)
    .bind(values.lender)
    .bind(values.amount)
    .bind(values.interest_rate)
    .bind(values.start_date)
    .bind(values.due_date)
    .bind(values.amount_paid)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            loan_id = %loan_id,
            "Database error creating loan"
        );
        ApiError::DatabaseError(e)
    })?;

    let loan = fetch_loan(&state.db, &loan_id, &authed.id)
        .await?
        .ok_or_else(|| ApiError::InternalServer("created loan could not be read back".to_string()))?;

    info!(
        user_id = %authed.id,
        loan_id = %loan_id,
        amount = loan.amount,
        "Loan created"
    );

    Ok((StatusCode::CREATED, Json(loan)))
}

/// PUT /loans/:id - Partial update, validated against the merged record
pub async fn update_loan(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(loan_id): Path<String>,
    Json(request): Json<LoanRequest>,
) -> Result<Json<Loan>, ApiError> {
    let state = state_lock.read().await.clone();

    let existing = fetch_loan(&state.db, &loan_id, &authed.id).await?;
    let Some(existing) = existing else {
        warn!(
            user_id = %authed.id,
            loan_id = %loan_id,
            "Loan not found or access denied"
        );
        return Err(ApiError::NotFound("Loan not found".to_string()));
    };

    let merged = request.merged_with(&existing);
    LoanValidator.validate(&merged).into_result()?;
    let values = LoanValues::from_request(&merged);

    let result = sqlx::query(
        r#"
        UPDATE loans
        SET title = ?, lender = ?, amount = ?, interest_rate = ?, start_date = ?,
            due_date = ?, amount_paid = ?, updated_at = datetime('now')
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(values.title)
    .bind(values.lender)
    .bind(values.amount)
    .bind(values.interest_rate)
    .bind(values.start_date)
    .bind(values.due_date)
    .bind(values.amount_paid)
    .bind(&loan_id)
    .bind(&authed.id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            loan_id = %loan_id,
            "Database error updating loan"
        );
        ApiError::DatabaseError(e)
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Loan not found".to_string()));
    }

    let loan = fetch_loan(&state.db, &loan_id, &authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Loan not found".to_string()))?;

    info!(
        user_id = %authed.id,
        loan_id = %loan_id,
        status = %loan.status,
        "Loan updated"
    );

    Ok(Json(loan))
}

/// DELETE /loans/:id
pub async fn delete_loan(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(loan_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM loans WHERE id = ? AND user_id = ?")
        .bind(&loan_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %authed.id,
                loan_id = %loan_id,
                "Database error deleting loan"
            );
            ApiError::DatabaseError(e)
        })?;

    if result.rows_affected() == 0 {
        warn!(
            user_id = %authed.id,
            loan_id = %loan_id,
            "Loan not found or access denied for deletion"
        );
        return Err(ApiError::NotFound("Loan not found".to_string()));
    }

    info!(user_id = %authed.id, loan_id = %loan_id, "Loan deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_loan(pool: &SqlitePool, loan_id: &str, user_id: &str) -> Result<Option<Loan>, ApiError> {
    let sql = format!("SELECT {} FROM loans WHERE id = ? AND user_id = ?", LOAN_COLUMNS);
    sqlx::query_as::<_, Loan>(&sql)
        .bind(loan_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, loan_id = %loan_id, "Database error fetching loan");
            ApiError::DatabaseError(e)
        })
}
