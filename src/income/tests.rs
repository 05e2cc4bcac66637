#[cfg(test)]
mod tests {
    use crate::testing::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_salary_created_then_updated_in_place() {
        let app = TestApp::new().await;
        let (token, _) = app.register("earner").await;

        let (status, created) = app
            .post(
                "/income",
                &token,
                json!({ "incometitle": "Salary", "amount": "1500.00", "income_date": "2024-01-15" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        assert_eq!(created["amount"], 1500.0);
        assert_eq!(created["incometitle"], "Salary");
        let income_id = created["incomeid"].as_str().unwrap();

        let (status, updated) = app
            .post(
                "/income",
                &token,
                json!({
                    "incomeid": income_id,
                    "incometitle": "Salary",
                    "amount": 1750,
                    "income_date": "2024-01-15",
                    "source": "Employer"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["incomeid"], income_id);
        assert_eq!(updated["amount"], 1750.0);
        assert_eq!(updated["source"], "Employer");

        let (_, listed) = app.get("/income", &token).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_income_requires_positive_amount_and_date() {
        let app = TestApp::new().await;
        let (token, _) = app.register("careless").await;

        let (status, body) = app
            .post(
                "/income",
                &token,
                json!({ "incometitle": "Gift", "amount": "-5", "income_date": "" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_income_is_isolated_between_users() {
        let app = TestApp::new().await;
        let (alice, _) = app.register("alice").await;
        let (bob, _) = app.register("bob").await;

        let (_, created) = app
            .post(
                "/income",
                &alice,
                json!({ "incometitle": "Bonus", "amount": 300, "income_date": "2024-02-01" }),
            )
            .await;
        let income_id = created["incomeid"].as_str().unwrap();

        let (status, _) = app
            .post(
                "/income",
                &bob,
                json!({
                    "incomeid": income_id,
                    "incometitle": "Hijacked",
                    "amount": 1,
                    "income_date": "2024-02-01"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.delete(&format!("/income?id={}", income_id), &bob).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = app.get("/income", &bob).await;
        assert!(listed.as_array().unwrap().is_empty());

        let (_, listed) = app.get("/income?month=2&year=2024", &alice).await;
        assert_eq!(listed[0]["incometitle"], "Bonus");

        let (status, _) = app.delete(&format!("/income?id={}", income_id), &alice).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_delete_without_id_is_bad_request() {
        let app = TestApp::new().await;
        let (token, _) = app.register("forgetful").await;

        let (status, _) = app.delete("/income", &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_oversized_income_rejected_and_summary_stays_numeric() {
        let app = TestApp::new().await;
        let (token, _) = app.register("tycoon").await;

        let (status, body) = app
            .post(
                "/income",
                &token,
                json!({ "incometitle": "Windfall", "amount": 1e307, "income_date": "2024-01-10" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["details"][0]["field"], "amount");

        let (status, _) = app
            .post(
                "/income",
                &token,
                json!({ "incometitle": "Windfall", "amount": 1_000_000_000_000u64, "income_date": "2024-01-10" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, summary) = app.get("/summary?month=1&year=2024", &token).await;
        assert_eq!(summary["monthly_income"], 1e12);
        assert_eq!(summary["total_balance"], 1e12);
    }
}
