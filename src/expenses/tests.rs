#[cfg(test)]
mod tests {
    use super::super::validators::*;
    use crate::testing::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_recent_limit_defaults_and_caps() {
        assert_eq!(recent_limit(None).unwrap(), RECENT_DEFAULT_LIMIT);
        assert_eq!(recent_limit(Some(500)).unwrap(), RECENT_MAX_LIMIT);
        assert_eq!(recent_limit(Some(3)).unwrap(), 3);
        assert!(recent_limit(Some(0)).is_err());
    }

    #[tokio::test]
    async fn test_create_and_list_expenses() {
        let app = TestApp::new().await;
        let (token, _) = app.register("spender").await;

        let (status, body) = app
            .post(
                "/expenses/all",
                &token,
                json!({
                    "expensetitle": "Groceries",
                    "amount": "42.50",
                    "category": "Food",
                    "expense_date": "2024-03-02"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        assert_eq!(body["expensetitle"], "Groceries");
        assert_eq!(body["amount"], 42.5);
        assert!(body["expenseid"].as_str().unwrap().starts_with("EX_"));

        let (status, body) = app.get("/expenses/all", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_expense_rejected() {
        let app = TestApp::new().await;
        let (token, _) = app.register("sloppy").await;

        let (status, body) = app
            .post(
                "/expenses/all",
                &token,
                json!({ "expensetitle": "", "amount": "abc", "expense_date": "03/02/2024" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert!(fields.contains(&"expensetitle"));
        assert!(fields.contains(&"amount"));
        assert!(fields.contains(&"expense_date"));
    }

    #[tokio::test]
    async fn test_sub_cent_expense_is_validation_error() {
        let app = TestApp::new().await;
        let (token, _) = app.register("penny").await;

        let (status, body) = app
            .post(
                "/expenses/all",
                &token,
                json!({ "expensetitle": "Gum", "amount": "0.001", "expense_date": "2024-03-02" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["details"][0]["field"], "amount");
    }

    #[tokio::test]
    async fn test_month_filter_and_recent_order() {
        let app = TestApp::new().await;
        let (token, _) = app.register("monthly").await;

        for (title, date) in [
            ("January rent", "2024-01-01"),
            ("February rent", "2024-02-01"),
            ("February food", "2024-02-14"),
        ] {
            let (status, _) = app
                .post(
                    "/expenses/recent",
                    &token,
                    json!({ "expensetitle": title, "amount": 10, "expense_date": date }),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, body) = app.get("/expenses/all?month=2&year=2024", &token).await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, _) = app.get("/expenses/all?month=13", &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = app.get("/expenses/recent?limit=2", &token).await;
        let recent = body.as_array().unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0]["expensetitle"], "February food");
    }

    #[tokio::test]
    async fn test_other_users_expense_is_not_found() {
        let app = TestApp::new().await;
        let (owner, _) = app.register("owner").await;
        let (intruder, _) = app.register("intruder").await;

        let (_, created) = app
            .post(
                "/expenses/all",
                &owner,
                json!({ "expensetitle": "Laptop", "amount": 999.99, "expense_date": "2024-05-05" }),
            )
            .await;
        let uri = format!("/expenses/{}", created["expenseid"].as_str().unwrap());

        let (status, _) = app.put(&uri, &intruder, json!({ "amount": 1 })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.delete(&uri, &intruder).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, listed) = app.get("/expenses/all", &intruder).await;
        assert!(listed.as_array().unwrap().is_empty());

        let (status, updated) = app
            .put(&uri, &owner, json!({ "amount": "1200", "category": "Tech" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["amount"], 1200.0);
        assert_eq!(updated["expensetitle"], "Laptop");

        let (status, _) = app.delete(&uri, &owner).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.delete(&uri, &owner).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
