// src/installments/handlers.rs

use axum::{
    extract::{Extension, Json, Path, Query},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::models::{
    CreateInstallmentRequest, Installment, InstallmentView, Payment, PaymentRequest,
    PaymentResponse, UpcomingQuery, INSTALLMENT_COLUMNS,
};
use super::validators::{upcoming_window, InstallmentValidator, PaymentValidator};
use crate::auth::AuthedUser;
use crate::common::validation::non_blank;
use crate::common::{
    generate_installment_id, generate_payment_id, round_cents, validated_amount, AmountInput,
    ApiError, AppState, Validator,
};

/// GET /installments - All plans of the caller with their schedules
pub async fn list_installments(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<Vec<InstallmentView>>, ApiError> {
    let state = state_lock.read().await.clone();
    let today = Utc::now().date_naive();

    let plans = fetch_plans(&state, &authed.id).await?;
    let views = plans
        .into_iter()
        .map(|plan| plan.with_schedule(today))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(user_id = %authed.id, plan_count = views.len(), "Fetched installment plans");

    Ok(Json(views))
}

/// POST /installments - Create a payment plan
pub async fn create_installment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<CreateInstallmentRequest>,
) -> Result<(StatusCode, Json<InstallmentView>), ApiError> {
    let state = state_lock.read().await.clone();

    let validation_result = InstallmentValidator.validate(&request);
    if !validation_result.is_valid {
        warn!(
            user_id = %authed.id,
            errors = ?validation_result.errors,
            "Installment plan validation failed"
        );
        return Err(ApiError::from(validation_result));
    }

    let installment_id = generate_installment_id();
    let frequency = request.frequency().unwrap_or_default();

    sqlx::query(
        r#"
        INSERT INTO installments (id, user_id, title, total_amount, installment_count, frequency, start_date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&installment_id)
    .bind(&authed.id)
    .bind(request.installmenttitle.as_deref().map(str::trim))
    .bind(validated_amount(request.total_amount.as_ref()))
    .bind(request.installment_count)
    .bind(frequency.as_str())
    .bind(request.start_date.as_deref().map(str::trim))
    .execute(&state.db)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            user_id = %authed.id,
            installment_id = %installment_id,
            "Database error creating installment plan"
        );
        ApiError::DatabaseError(e)
    })?;

    let sql = format!(
        "SELECT {} FROM installments WHERE id = ? AND user_id = ?",
        INSTALLMENT_COLUMNS
    );
    let plan = sqlx::query_as::<_, Installment>(&sql)
        .bind(&installment_id)
        .bind(&authed.id)
        .fetch_one(&state.db)
        .await?;

    info!(
        user_id = %authed.id,
        installment_id = %installment_id,
        frequency = %frequency,
        "Installment plan created"
    );

    Ok((
        StatusCode::CREATED,
        Json(plan.with_schedule(Utc::now().date_naive())?),
    ))
}

/// DELETE /installments/:id - Removes a plan and its payments
pub async fn delete_installment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Path(installment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let state = state_lock.read().await.clone();

    let result = sqlx::query("DELETE FROM installments WHERE id = ? AND user_id = ?")
        .bind(&installment_id)
        .bind(&authed.id)
        .execute(&state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %authed.id,
                installment_id = %installment_id,
                "Database error deleting installment plan"
            );
            ApiError::DatabaseError(e)
        })?;

    if result.rows_affected() == 0 {
        warn!(
            user_id = %authed.id,
            installment_id = %installment_id,
            "Installment plan not found or access denied for deletion"
        );
        return Err(ApiError::NotFound("Installment plan not found".to_string()));
    }

    info!(user_id = %authed.id, installment_id = %installment_id, "Installment plan deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /installments/payment - Record one payment against a plan
///
/// The amount defaults to the next scheduled payment. The plan read, the
/// payment insert and the plan update share one transaction.
pub async fn record_payment(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Json(request): Json<PaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    PaymentValidator.validate(&request).into_result()?;

    let installment_id = non_blank(request.installmentid.as_deref())
        .unwrap_or_default()
        .to_string();
    let today = Utc::now().date_naive();
    let payment_date = non_blank(request.payment_date.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| today.format("%Y-%m-%d").to_string());

    let mut tx = state.db.begin().await.map_err(|e| {
        error!(error = %e, "Failed to start payment transaction");
        ApiError::DatabaseError(e)
    })?;

    let sql = format!(
        "SELECT {} FROM installments WHERE id = ? AND user_id = ?",
        INSTALLMENT_COLUMNS
    );
    let plan = sqlx::query_as::<_, Installment>(&sql)
        .bind(&installment_id)
        .bind(&authed.id)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(plan) = plan else {
        warn!(
            user_id = %authed.id,
            installment_id = %installment_id,
            "Installment plan not found or access denied for payment"
        );
        return Err(ApiError::NotFound("Installment plan not found".to_string()));
    };

    let terms = plan.terms()?;
    if terms.is_complete() {
        return Err(ApiError::BadRequest(
            "Installment plan is already fully paid".to_string(),
        ));
    }

    let amount = request
        .amount
        .as_ref()
        .and_then(AmountInput::positive)
        .map(round_cents)
        .unwrap_or_else(|| terms.next_payment_amount());

    if amount - terms.remaining_balance() > 0.005 {
        warn!(
            user_id = %authed.id,
            installment_id = %installment_id,
            amount,
            remaining = terms.remaining_balance(),
            "Payment exceeds remaining balance"
        );
        return Err(ApiError::BadRequest(
            "Payment exceeds the remaining balance".to_string(),
        ));
    }

    let updated = terms.after_payment(amount);
    let payment_id = generate_payment_id();

    sqlx::query(
        "INSERT INTO installment_payments (id, installment_id, user_id, amount, payment_date) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&payment_id)
    .bind(&installment_id)
    .bind(&authed.id)
    .bind(amount)
    .bind(&payment_date)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            installment_id = %installment_id,
            "Database error inserting installment payment"
        );
        ApiError::DatabaseError(e)
    })?;

    sqlx::query(
        r#"
        UPDATE installments
        SET paid_count = ?, amount_paid = ?, updated_at = datetime('now')
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(i64::from(updated.paid_count))
    .bind(updated.amount_paid)
    .bind(&installment_id)
    .bind(&authed.id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        error!(
            error = %e,
            installment_id = %installment_id,
            "Database error updating installment progress"
        );
        ApiError::DatabaseError(e)
    })?;

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit payment transaction");
        ApiError::DatabaseError(e)
    })?;

    info!(
        user_id = %authed.id,
        installment_id = %installment_id,
        payment_id = %payment_id,
        amount,
        paid_count = updated.paid_count,
        "Installment payment recorded"
    );

    let plan = Installment {
        paid_count: i64::from(updated.paid_count),
        amount_paid: updated.amount_paid,
        ..plan
    };

    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            payment: Payment {
                paymentid: payment_id,
                installmentid: installment_id,
                amount,
                payment_date,
            },
            installment: plan.with_schedule(today)?,
        }),
    ))
}

/// GET /installments/upcoming - Open plans due within `days`, overdue ones included
pub async fn upcoming_installments(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Vec<InstallmentView>>, ApiError> {
    let state = state_lock.read().await.clone();
    let window = upcoming_window(query.days).map_err(ApiError::from)?;
    let today = Utc::now().date_naive();

    let mut upcoming = Vec::new();
    for plan in fetch_plans(&state, &authed.id).await? {
        let view = plan.with_schedule(today)?;
        if matches!(view.schedule.days_until_due, Some(days) if days <= window) {
            upcoming.push(view);
        }
    }
    upcoming.sort_by_key(|view| view.schedule.days_until_due);

    debug!(
        user_id = %authed.id,
        window_days = window,
        due_count = upcoming.len(),
        "Computed upcoming installments"
    );

    Ok(Json(upcoming))
}

async fn fetch_plans(state: &AppState, user_id: &str) -> Result<Vec<Installment>, ApiError> {
    let sql = format!(
        "SELECT {} FROM installments WHERE user_id = ? ORDER BY start_date DESC, created_at DESC",
        INSTALLMENT_COLUMNS
    );
    sqlx::query_as::<_, Installment>(&sql)
        .bind(user_id)
        .fetch_all(&state.db)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "Database error fetching installment plans");
            ApiError::DatabaseError(e)
        })
}
