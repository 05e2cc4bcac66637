#[cfg(test)]
mod tests {
    use super::super::validators::*;
    use crate::testing::TestApp;
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    fn days_from_today(days: i64) -> String {
        (Utc::now().date_naive() + Duration::days(days))
            .format("%Y-%m-%d")
            .to_string()
    }

    async fn create_plan(app: &TestApp, token: &str, body: Value) -> Value {
        let (status, created) = app.post("/installments", token, body).await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        created
    }

    #[test]
    fn test_upcoming_window_bounds() {
        assert_eq!(upcoming_window(None).unwrap(), UPCOMING_DEFAULT_DAYS);
        assert_eq!(upcoming_window(Some(0)).unwrap(), 0);
        assert!(upcoming_window(Some(-1)).is_err());
        assert!(upcoming_window(Some(UPCOMING_MAX_DAYS + 1)).is_err());
    }

    #[tokio::test]
    async fn test_create_plan_returns_schedule() {
        let app = TestApp::new().await;
        let (token, _) = app.register("planner").await;

        let created = create_plan(
            &app,
            &token,
            json!({
                "installmenttitle": "Phone",
                "total_amount": "1200",
                "installment_count": 12,
                "start_date": "2024-01-31"
            }),
        )
        .await;

        assert!(created["installmentid"].as_str().unwrap().starts_with("IP_"));
        assert_eq!(created["frequency"], "monthly");
        assert_eq!(created["per_period_amount"], 100.0);
        assert_eq!(created["periods_remaining"], 12);
        assert_eq!(created["next_due_date"], "2024-01-31");
        assert_eq!(created["progress_percentage"], 0.0);
    }

    #[tokio::test]
    async fn test_invalid_plan_rejected() {
        let app = TestApp::new().await;
        let (token, _) = app.register("planless").await;

        let (status, body) = app
            .post(
                "/installments",
                &token,
                json!({
                    "installmenttitle": "TV",
                    "total_amount": 900,
                    "installment_count": 0,
                    "frequency": "fortnightly",
                    "start_date": "2024-01-01"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_payments_advance_plan_until_complete() {
        let app = TestApp::new().await;
        let (token, _) = app.register("payer").await;

        let created = create_plan(
            &app,
            &token,
            json!({
                "installmenttitle": "Course",
                "total_amount": 100,
                "installment_count": 3,
                "frequency": "weekly",
                "start_date": "2024-03-01"
            }),
        )
        .await;
        let plan_id = created["installmentid"].as_str().unwrap();

        let (status, paid) = app
            .post("/installments/payment", &token, json!({ "installmentid": plan_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", paid);
        assert_eq!(paid["payment"]["amount"], 33.33);
        assert_eq!(paid["installment"]["paid_count"], 1);
        assert_eq!(paid["installment"]["next_due_date"], "2024-03-08");

        let (status, _) = app
            .post(
                "/installments/payment",
                &token,
                json!({ "installmentid": plan_id, "amount": 100 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, paid) = app
            .post(
                "/installments/payment",
                &token,
                json!({ "installmentid": plan_id, "amount": "66.67", "payment_date": "2024-03-09" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(paid["installment"]["is_complete"], true);
        assert_eq!(paid["installment"]["progress_percentage"], 100.0);
        assert_eq!(paid["installment"]["next_due_date"], Value::Null);

        let (status, body) = app
            .post("/installments/payment", &token, json!({ "installmentid": plan_id }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Installment plan is already fully paid");
    }

    #[tokio::test]
    async fn test_small_payments_keep_plan_open() {
        let app = TestApp::new().await;
        let (token, _) = app.register("trickler").await;

        let created = create_plan(
            &app,
            &token,
            json!({
                "installmenttitle": "Bike",
                "total_amount": "300.00",
                "installment_count": 3,
                "start_date": "2024-01-15"
            }),
        )
        .await;
        let plan_id = created["installmentid"].as_str().unwrap();

        let mut last = Value::Null;
        for _ in 0..3 {
            let (status, paid) = app
                .post(
                    "/installments/payment",
                    &token,
                    json!({ "installmentid": plan_id, "amount": 1 }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{}", paid);
            last = paid;
        }
        let plan = &last["installment"];
        assert_eq!(plan["paid_count"], 0);
        assert_eq!(plan["periods_remaining"], 3);
        assert_eq!(plan["remaining_balance"], 297.0);
        assert_eq!(plan["is_complete"], false);
        assert_eq!(plan["next_due_date"], "2024-01-15");
        assert_eq!(plan["next_payment_amount"], 97.0);

        let (_, summary) = app.get("/summary?month=1&year=2024", &token).await;
        assert_eq!(summary["installment_balance"], 297.0);
        assert_eq!(summary["active_installments"], 1);

        let (status, paid) = app
            .post("/installments/payment", &token, json!({ "installmentid": plan_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", paid);
        assert_eq!(paid["payment"]["amount"], 97.0);
        assert_eq!(paid["installment"]["paid_count"], 1);
        assert_eq!(paid["installment"]["next_due_date"], "2024-02-15");
    }

    #[tokio::test]
    async fn test_payment_amount_limits() {
        let app = TestApp::new().await;
        let (token, _) = app.register("overpayer").await;

        let created = create_plan(
            &app,
            &token,
            json!({
                "installmenttitle": "Sofa",
                "total_amount": 300,
                "installment_count": 3,
                "start_date": "2024-01-15"
            }),
        )
        .await;
        let plan_id = created["installmentid"].as_str().unwrap();

        app.post(
            "/installments/payment",
            &token,
            json!({ "installmentid": plan_id, "amount": 250 }),
        )
        .await;

        let (status, body) = app
            .post(
                "/installments/payment",
                &token,
                json!({ "installmentid": plan_id, "amount": 50.01 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Payment exceeds the remaining balance");

        let (status, body) = app
            .post(
                "/installments/payment",
                &token,
                json!({ "installmentid": plan_id, "amount": "0.001" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, paid) = app
            .post(
                "/installments/payment",
                &token,
                json!({ "installmentid": plan_id, "amount": 50 }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", paid);
        assert_eq!(paid["installment"]["is_complete"], true);
        assert_eq!(paid["installment"]["paid_count"], 3);

        let (status, body) = app
            .post(
                "/installments/payment",
                &token,
                json!({ "installmentid": plan_id, "amount": 1 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Installment plan is already fully paid");
    }

    #[tokio::test]
    async fn test_upcoming_includes_overdue_and_respects_window() {
        let app = TestApp::new().await;
        let (token, _) = app.register("scheduler").await;

        create_plan(
            &app,
            &token,
            json!({
                "installmenttitle": "Overdue",
                "total_amount": 300,
                "installment_count": 3,
                "start_date": days_from_today(-10)
            }),
        )
        .await;
        create_plan(
            &app,
            &token,
            json!({
                "installmenttitle": "Far away",
                "total_amount": 300,
                "installment_count": 3,
                "start_date": days_from_today(100)
            }),
        )
        .await;

        let (status, body) = app.get("/installments/upcoming", &token).await;
        assert_eq!(status, StatusCode::OK);
        let due = body.as_array().unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0]["installmenttitle"], "Overdue");
        assert_eq!(due[0]["is_overdue"], true);

        let (_, body) = app.get("/installments/upcoming?days=120", &token).await;
        let due = body.as_array().unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[1]["installmenttitle"], "Far away");

        let (status, _) = app.get("/installments/upcoming?days=9999", &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_other_users_plan_is_not_found() {
        let app = TestApp::new().await;
        let (owner, _) = app.register("owner").await;
        let (intruder, _) = app.register("intruder").await;

        let created = create_plan(
            &app,
            &owner,
            json!({
                "installmenttitle": "Sofa",
                "total_amount": 800,
                "installment_count": 4,
                "start_date": "2024-06-01"
            }),
        )
        .await;
        let plan_id = created["installmentid"].as_str().unwrap();

        let (status, _) = app
            .post("/installments/payment", &intruder, json!({ "installmentid": plan_id }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app
            .delete(&format!("/installments/{}", plan_id), &intruder)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = app.get("/installments", &owner).await;
        assert_eq!(listed[0]["paid_count"], 0);

        let (status, _) = app
            .delete(&format!("/installments/{}", plan_id), &owner)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
