// src/income/handlers.rs

use axum::{
    extract::{Extension, Json, Query},
    http::StatusCode,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{DeleteIncomeQuery, Income, SaveIncomeRequest, INCOME_COLUMNS};
use super::validators::IncomeValidator;
use crate::auth::AuthedUser;
use crate::common::validation::non_blank;
use crate::common::{
    generate_income_id, period_predicate, validated_amount, ApiError, AppState, PeriodQuery,
    Validator,
};

/// GET /income - Income entries of the caller, optionally for one month
pub async fn list_income(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(period): Query<PeriodQuery>,
) -> Result<Json<Vec<Income>>, ApiError> {
    let state = state_lock.read().await.clone();
    period.validate()?;

    let sql = format!(
        "SELECT {} FROM income WHERE user_id = ? AND {} \
         ORDER BY income_date DESC, created_at DESC",
        INCOME_COLUMNS,
        period_predicate("income_date")
    );

    let entries = sqlx::query_as::<_, Income>(&sql)
        .bind(&authed.id)
        .bind(period.month)
        .bind(period.month)
        .bind(period.year)
        .bind(period.year)
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %authed.id, "Database error fetching income");
            ApiError::DatabaseError(e)
        })?;

    debug!(user_id = %authed.id, income_count = entries.len(), "Fetched income");

    Ok(Json(entries))
}

/// POST /income - Create an income entry, or update one when `incomeid` is given
///
/// # Request Body
/// ```json
/// { "incomeid": "IN_...", "incometitle": "Salary", "amount": "1500.00", "income_date": "2024-01-15", "source": "Employer" }
/// ```
pub async fn save_income(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<SaveIncomeRequest>,
) -> Result<(StatusCode, Json<Income>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = IncomeValidator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            user_id = %authed.id,
            errors = ?validation_result.errors,
            "Income validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let title = request.incometitle.as_deref().map(str::trim);
    let amount = validated_amount(request.amount.as_ref());
    let income_date = request.income_date.as_deref().map(str::trim);
    let source = non_blank(request.source.as_deref());

    let (income_id, status) = match non_blank(request.incomeid.as_deref()) {
        Some(income_id) => {
            let result = sqlx::query(
                r#"
                UPDATE income
                SET title = ?, amount = ?, income_date = ?, source = ?, updated_at = datetime('now')
                WHERE id = ? AND user_id = ?
                "#,
            )
            .bind(title)
            .bind(amount)
            .bind(income_date)
            .bind(source)
            .bind(income_id)
            .bind(&authed.id)
            .execute(&state.db)
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    user_id = %authed.id,
                    income_id = %income_id,
                    "Database error updating income"
                );
                ApiError::DatabaseError(e)
            })?;

            if result.rows_affected() == 0 {
                warn!(
                    user_id = %authed.id,
                    income_id = %income_id,
                    "Income not found or access denied"
                );
                return Err(ApiError::NotFound("Income not found".to_string()));
            }

            info!(user_id = %authed.id, income_id = %income_id, "Income updated");
            (income_id.to_string(), StatusCode::OK)
        }
        None => {
            let income_id = generate_income_id();

            sqlx::query(
                "INSERT INTO income (id, user_id, title, amount, income_date, source) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&income_id)
            .bind(&authed.id)
            .bind(title)
            .bind(amount)
            .bind(income_date)
            .bind(source)
            .execute(&state.db)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %authed.id, "Database error creating income");
                ApiError::DatabaseError(e)
            })?;

            info!(user_id = %authed.id, income_id = %income_id, amount, "Income created");
            (income_id, StatusCode::CREATED)
        }
    };

    let sql = format!("SELECT {} FROM income WHERE id = ? AND user_id = ?", INCOME_COLUMNS);
    let income = sqlx::query_as::<_, Income>(&sql)
        .bind(&income_id)
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, income_id = %income_id, "Database error fetching saved income");
            ApiError::DatabaseError(e)
        })?;

    Ok((status, Json(income)))
}

/// DELETE /income?id=
pub async fn delete_income(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<DeleteIncomeQuery>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let income_id = non_blank(query.id.as_deref())
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;

    let result = sqlx::query("DELETE FROM income WHERE id = ? AND user_id = ?")
        .bind(income_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %authed.id,
                income_id = %income_id,
                "Database error deleting income"
            );
            ApiError::DatabaseError(e)
        })?;

    if result.rows_affected() == 0 {
        warn!(
            user_id = %authed.id,
            income_id = %income_id,
            "Income not found or access denied for deletion"
        );
        return Err(ApiError::NotFound("Income not found".to_string()));
    }

    info!(user_id = %authed.id, income_id = %income_id, "Income deleted");

    Ok(StatusCode::NO_CONTENT)
}
