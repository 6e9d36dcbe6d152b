//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use serde_json::json;

use crate::{
    AppState, CorsConfig, endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, list_expenses_endpoint,
        update_expense_endpoint,
    },
    logging::logging_middleware,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState, cors_config: CorsConfig) -> Router {
    Router::new()
        .route(
            endpoints::EXPENSES,
            get(list_expenses_endpoint).post(create_expense_endpoint),
        )
        .route(
            endpoints::EXPENSE,
            put(update_expense_endpoint).delete(delete_expense_endpoint),
        )
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .layer(cors_config.into_layer())
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "The requested resource could not be found." })),
    )
        .into_response()
}

#[cfg(test)]
mod expense_api_tests {
    use axum::{
        body::Bytes,
        http::{HeaderName, HeaderValue, StatusCode},
    };
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::{Value, json};
    use time::macros::datetime;

    use crate::{AppState, CorsConfig, Expense, build_router, endpoints};

    fn get_test_server() -> TestServer {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(connection).expect("Could not initialize database.");
        let app = build_router(state, CorsConfig::default());

        TestServer::try_new(app).expect("Could not create test server.")
    }

    fn expense_path(id: i64) -> String {
        endpoints::format_endpoint(endpoints::EXPENSE, id)
    }

    async fn create_coffee(server: &TestServer) -> Expense {
        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "title": "Coffee",
                "category": "Food",
                "amount": 3.5,
                "date": "2024-01-05T00:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);

        response.json::<Expense>()
    }

    #[tokio::test]
    async fn create_expense_defaults_type() {
        let server = get_test_server();

        let expense = create_coffee(&server).await;

        assert!(expense.id > 0);
        assert_eq!(expense.title.as_ref(), "Coffee");
        assert_eq!(expense.category, "Food");
        assert_eq!(expense.expense_type, "Debet");
        assert_eq!(expense.amount, 3.5);
        assert_eq!(expense.date, datetime!(2024-01-05 0:00 UTC));
    }

    #[tokio::test]
    async fn created_expense_is_listed_within_its_range() {
        let server = get_test_server();
        let expense = create_coffee(&server).await;

        let january = server
            .get(endpoints::EXPENSES)
            .add_query_param("startDate", "2024-01-01")
            .add_query_param("endDate", "2024-01-31")
            .await;
        january.assert_status_ok();
        assert_eq!(january.json::<Vec<Expense>>(), vec![expense]);

        let february = server
            .get(endpoints::EXPENSES)
            .add_query_param("startDate", "2024-02-01")
            .await;
        february.assert_status_ok();
        assert_eq!(february.json::<Vec<Expense>>(), vec![]);
    }

    #[tokio::test]
    async fn list_is_sorted_by_date_descending() {
        let server = get_test_server();
        for (title, date) in [
            ("Second", "2024-01-10T09:00:00Z"),
            ("First", "2024-01-01T09:00:00Z"),
            ("Third", "2024-01-20T09:00:00+02:00"),
        ] {
            server
                .post(endpoints::EXPENSES)
                .json(&json!({
                    "title": title,
                    "category": "Misc",
                    "amount": 1.0,
                    "date": date,
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let expenses = server.get(endpoints::EXPENSES).await.json::<Vec<Expense>>();

        let titles: Vec<&str> = expenses.iter().map(|e| e.title.as_ref()).collect();
        assert_eq!(titles, ["Third", "Second", "First"]);
        assert!(expenses.windows(2).all(|pair| pair[0].date >= pair[1].date));
    }

    #[tokio::test]
    async fn list_with_only_end_date_includes_everything_up_to_that_day() {
        let server = get_test_server();
        let coffee = create_coffee(&server).await;
        server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "title": "Rent",
                "category": "Housing",
                "amount": 1450.0,
                "date": "2024-01-06T00:00:00Z",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .get(endpoints::EXPENSES)
            .add_query_param("endDate", "2024-01-05")
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Expense>>(), vec![coffee]);
    }

    #[tokio::test]
    async fn list_with_malformed_date_is_bad_request() {
        let server = get_test_server();

        let response = server
            .get(endpoints::EXPENSES)
            .add_query_param("startDate", "2024/01/01")
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Invalid startDate format. Use YYYY-MM-DD" }));
    }

    #[tokio::test]
    async fn create_with_missing_field_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "title": "Coffee",
                "category": "Food",
                "date": "2024-01-05T00:00:00Z",
            }))
            .await;

        response.assert_status_bad_request();
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn create_with_malformed_json_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .text("{\"title\": ")
            .content_type("application/json")
            .await;

        response.assert_status_bad_request();
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn create_with_invalid_utf8_is_bad_request() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .bytes(Bytes::from_static(
                b"{\"title\":\"Caf\xff\",\"category\":\"Food\",\"amount\":3.5,\"date\":\"2024-01-05T00:00:00Z\"}",
            ))
            .content_type("application/json")
            .await;

        response.assert_status_bad_request();
        assert!(response.json::<Value>()["error"].is_string());
        let expenses = server.get(endpoints::EXPENSES).await.json::<Vec<Expense>>();
        assert!(expenses.is_empty());
    }

    #[tokio::test]
    async fn create_keeps_title_as_sent() {
        let server = get_test_server();

        let response = server
            .post(endpoints::EXPENSES)
            .json(&json!({
                "title": " Coffee ",
                "category": "Food",
                "amount": 3.5,
                "date": "2024-01-05T00:00:00Z",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.json::<Expense>().title.as_ref(), " Coffee ");
    }

    #[tokio::test]
    async fn deleted_id_is_not_reused_by_later_create() {
        let server = get_test_server();
        let deleted = create_coffee(&server).await;
        server
            .delete(&expense_path(deleted.id))
            .await
            .assert_status_ok();

        let created = create_coffee(&server).await;

        assert!(created.id > deleted.id);
        server
            .delete(&expense_path(deleted.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn poisoned_database_lock_is_internal_server_error() {
        let connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        let state = AppState::new(connection).expect("Could not initialize database.");
        let db_connection = state.db_connection.clone();
        let _ = std::thread::spawn(move || {
            let _guard = db_connection.lock().unwrap();
            panic!("poisoning the database lock");
        })
        .join();
        let server = TestServer::try_new(build_router(state, CorsConfig::default()))
            .expect("Could not create test server.");

        let response = server.get(endpoints::EXPENSES).await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.assert_json(&json!({
            "error": "An unexpected error occurred, check the server logs for more details."
        }));
    }

    #[tokio::test]
    async fn update_preserves_type_when_omitted() {
        let server = get_test_server();
        let expense = create_coffee(&server).await;
        server
            .put(&expense_path(expense.id))
            .json(&json!({
                "title": "Coffee",
                "category": "Food",
                "type": "Credit",
                "amount": 3.5,
                "date": "2024-01-05T00:00:00Z",
            }))
            .await
            .assert_status_ok();

        let response = server
            .put(&expense_path(expense.id))
            .json(&json!({
                "title": "Flat white",
                "category": "Cafe",
                "amount": 4.75,
                "date": "2024-01-06T07:30:00Z",
            }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<Expense>();
        assert_eq!(updated.id, expense.id);
        assert_eq!(updated.title.as_ref(), "Flat white");
        assert_eq!(updated.category, "Cafe");
        assert_eq!(updated.expense_type, "Credit");
        assert_eq!(updated.amount, 4.75);
        assert_eq!(updated.date, datetime!(2024-01-06 7:30 UTC));
    }

    #[tokio::test]
    async fn update_missing_expense_is_not_found_and_changes_nothing() {
        let server = get_test_server();
        let expense = create_coffee(&server).await;

        let response = server
            .put(&expense_path(expense.id + 1))
            .json(&json!({
                "title": "Tea",
                "category": "Food",
                "amount": 2.0,
                "date": "2024-01-05T00:00:00Z",
            }))
            .await;

        response.assert_status_not_found();
        response.assert_json(&json!({ "error": "Expense not found" }));
        let expenses = server.get(endpoints::EXPENSES).await.json::<Vec<Expense>>();
        assert_eq!(expenses, vec![expense]);
    }

    #[tokio::test]
    async fn update_with_invalid_id_is_bad_request() {
        let server = get_test_server();

        let response = server
            .put("/api/expenses/not-a-number")
            .json(&json!({
                "title": "Tea",
                "category": "Food",
                "amount": 2.0,
                "date": "2024-01-05T00:00:00Z",
            }))
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Invalid ID" }));
    }

    #[tokio::test]
    async fn deleted_expense_is_gone() {
        let server = get_test_server();
        let expense = create_coffee(&server).await;

        let response = server.delete(&expense_path(expense.id)).await;

        response.assert_status_ok();
        response.assert_json(&json!({ "message": "Expense deleted successfully" }));

        let expenses = server.get(endpoints::EXPENSES).await.json::<Vec<Expense>>();
        assert!(expenses.is_empty());
        server
            .delete(&expense_path(expense.id))
            .await
            .assert_status_not_found();
        server
            .put(&expense_path(expense.id))
            .json(&json!({
                "title": "Coffee",
                "category": "Food",
                "amount": 3.5,
                "date": "2024-01-05T00:00:00Z",
            }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_with_invalid_id_is_bad_request() {
        let server = get_test_server();

        server
            .delete("/api/expenses/1.5")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server();

        let response = server.get("/api/budgets").await;

        response.assert_status_not_found();
        assert!(response.json::<Value>()["error"].is_string());
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin() {
        let server = get_test_server();

        let response = server
            .method(axum::http::Method::OPTIONS, endpoints::EXPENSES)
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("http://localhost:3000"),
            )
            .add_header(
                HeaderName::from_static("access-control-request-method"),
                HeaderValue::from_static("PUT"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("access-control-allow-origin"),
            "http://localhost:3000"
        );
        assert_eq!(response.header("access-control-allow-credentials"), "true");
        let allowed_methods = response.header("access-control-allow-methods");
        let allowed_methods = allowed_methods.to_str().unwrap();
        for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
            assert!(allowed_methods.contains(method), "{allowed_methods}");
        }
    }

    #[tokio::test]
    async fn cors_exposes_content_length() {
        let server = get_test_server();

        let response = server
            .get(endpoints::EXPENSES)
            .add_header(
                HeaderName::from_static("origin"),
                HeaderValue::from_static("http://localhost:3000"),
            )
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header("access-control-allow-origin"),
            "http://localhost:3000"
        );
        assert_eq!(
            response.header("access-control-expose-headers"),
            "content-length"
        );
    }
}
