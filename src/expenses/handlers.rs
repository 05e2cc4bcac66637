// src/expenses/handlers.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{CreateExpenseRequest, Expense, RecentQuery, UpdateExpenseRequest, EXPENSE_COLUMNS};
use super::validators::{recent_limit, ExpenseValidator};
use crate::auth::AuthedUser;
use crate::common::validation::non_blank;
use crate::common::{
    generate_expense_id, period_predicate, validated_amount, ApiError, AppState, PeriodQuery,
    Validator,
};

/// GET /expenses/all - All expenses of the caller, optionally for one month
pub async fn list_expenses(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(period): Query<PeriodQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let state = state_lock.read().await.clone();
    period.validate()?;

    let sql = format!(
        "SELECT {} FROM expenses WHERE user_id = ? AND {} \
         ORDER BY expense_date DESC, created_at DESC",
        EXPENSE_COLUMNS,
        period_predicate("expense_date")
    );

    let expenses = sqlx::query_as::<_, Expense>(&sql)
        .bind(&authed.id)
        .bind(period.month)
        .bind(period.month)
        .bind(period.year)
        .bind(period.year)
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %authed.id, "Database error fetching expenses");
            ApiError::DatabaseError(e)
        })?;

    debug!(
        user_id = %authed.id,
        expense_count = expenses.len(),
        "Fetched expenses"
    );

    Ok(Json(expenses))
}

/// GET /expenses/recent - Latest expenses, newest first
pub async fn recent_expenses(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    let state = state_lock.read().await.clone();
    let limit = recent_limit(query.limit).map_err(ApiError::from)?;

    let sql = format!(
        "SELECT {} FROM expenses WHERE user_id = ? \
         ORDER BY expense_date DESC, created_at DESC LIMIT ?",
        EXPENSE_COLUMNS
    );

    let expenses = sqlx::query_as::<_, Expense>(&sql)
        .bind(&authed.id)
        .bind(limit)
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %authed.id, "Database error fetching recent expenses");
            ApiError::DatabaseError(e)
        })?;

    Ok(Json(expenses))
}

/// POST /expenses/all and /expenses/recent - Record a new expense
pub async fn create_expense(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = ExpenseValidator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            user_id = %authed.id,
            errors = ?validation_result.errors,
            "Expense creation validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let expense_id = generate_expense_id();

    sqlx::query(
        r#"
        INSERT INTO expenses (id, user_id, title, amount, category, expense_date, description)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&expense_id)
    .bind(&authed.id)
    .bind(request.expensetitle.as_deref().map(str::trim))
    .bind(validated_amount(request.amount.as_ref()))
    .bind(non_blank(request.category.as_deref()))
    .bind(request.expense_date.as_deref().map(str::trim))
    .bind(non_blank(request.description.as_deref()))
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            expense_id = %expense_id,
            "Database error creating expense"
        );
        ApiError::DatabaseError(e)
    })?;

    let expense = fetch_expense(&state.db, &expense_id, &authed.id)
        .await?
        .ok_or_else(|| ApiError::InternalServer("created expense could not be read back".to_string()))?;

    info!(
        user_id = %authed.id,
        expense_id = %expense_id,
        amount = expense.amount,
        "Expense created"
    );

    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /expenses/:id - Update an expense owned by the caller
pub async fn update_expense(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(expense_id): Path<String>,
    Json(request): Json<UpdateExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    let state = state_lock.read().await.clone();

    ExpenseValidator.validate(&request).into_result()?;

    let amount = request.amount.is_some().then(|| validated_amount(request.amount.as_ref()));

    let result = sqlx::query(
        r#"
        UPDATE expenses
        SET title = COALESCE(?, title),
            amount = COALESCE(?, amount),
            category = COALESCE(?, category),
            expense_date = COALESCE(?, expense_date),
            description = COALESCE(?, description),
            updated_at = datetime('now')
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(non_blank(request.expensetitle.as_deref()))
    .bind(amount)
    .bind(non_blank(request.category.as_deref()))
    .bind(non_blank(request.expense_date.as_deref()))
    .bind(non_blank(request.description.as_deref()))
    .bind(&expense_id)
    .bind(&authed.id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            expense_id = %expense_id,
            "Database error updating expense"
        );
        ApiError::DatabaseError(e)
    })?;

    if result.rows_affected() == 0 {
        warn!(
            user_id = %authed.id,
            expense_id = %expense_id,
            "Expense not found or access denied"
        );
        return Err(ApiError::NotFound("Expense not found".to_string()));
    }

    let expense = fetch_expense(&state.db, &expense_id, &authed.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

    info!(user_id = %authed.id, expense_id = %expense_id, "Expense updated");

    Ok(Json(expense))
}

/// DELETE /expenses/:id
pub async fn delete_expense(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(expense_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
        .bind(&expense_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %authed.id,
                expense_id = %expense_id,
                "Database error deleting expense"
            );
            ApiError::DatabaseError(e)
        })?;

    if result.rows_affected() == 0 {
        warn!(
            user_id = %authed.id,
            expense_id = %expense_id,
            "Expense not found or access denied for deletion"
        );
        return Err(ApiError::NotFound("Expense not found".to_string()));
    }

    info!(user_id = %authed.id, expense_id = %expense_id, "Expense deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_expense(
    pool: &SqlitePool,
    expense_id: &str,
    user_id: &str,
) -> Result<Option<Expense>, ApiError> {
    let sql = format!("SELECT {} FROM expenses WHERE id = ? AND user_id = ?", EXPENSE_COLUMNS);
    sqlx::query_as::<_, Expense>(&sql)
        .bind(expense_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::DatabaseError)
}
