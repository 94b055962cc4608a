//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState, endpoints,
    expense::{
        create_expense_endpoint, delete_expense_endpoint, get_delete_expense_page,
        get_edit_expense_page, get_expenses_page, update_expense_endpoint,
    },
    metrics::{get_metrics, track_requests},
    not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_expenses_page))
        .route(endpoints::ADD_EXPENSE, post(create_expense_endpoint))
        .route(
            endpoints::UPDATE_EXPENSE,
            get(get_edit_expense_page).post(update_expense_endpoint),
        )
        .route(
            endpoints::DELETE_EXPENSE,
            get(get_delete_expense_page).post(delete_expense_endpoint),
        )
        .route(endpoints::METRICS, get(get_metrics))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_requests,
        ))
        .with_state(state)
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};

    use crate::{
        AppState, endpoints,
        endpoints::format_endpoint,
        expense::{ExpenseForm, MAX_TEXT_LENGTH, UpdateResponse, get_expense, list_expenses},
        money::MinorUnits,
    };

    use super::build_router;

    fn get_test_server() -> (TestServer, AppState) {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection).expect("Could not create app state");
        let server =
            TestServer::new(build_router(state.clone())).expect("Could not create test server.");

        (server, state)
    }

    fn expense_form(name: &str, category: &str, price: &str) -> ExpenseForm {
        ExpenseForm {
            name: name.to_owned(),
            category: category.to_owned(),
            price: price.to_owned(),
        }
    }

    fn get_total(page: &str) -> String {
        Html::parse_document(page)
            .select(&Selector::parse("#total").unwrap())
            .next()
            .expect("No total found")
            .text()
            .collect::<String>()
            .trim()
            .to_owned()
    }

    async fn add_expense(server: &TestServer, price: &str) {
        server
            .post(endpoints::ADD_EXPENSE)
            .form(&expense_form("Coffee", "Food", price))
            .await
            .assert_status(StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn add_then_list_shows_total() {
        let (server, _) = get_test_server();
        add_expense(&server, "1.00").await;
        add_expense(&server, "2.50").await;
        add_expense(&server, "0.75").await;

        let response = server.get(endpoints::ROOT).await;

        response.assert_status_ok();
        assert_eq!(get_total(&response.text()), "4.25");
    }

    #[tokio::test]
    async fn add_redirects_to_root() {
        let (server, _) = get_test_server();

        let response = server
            .post(endpoints::ADD_EXPENSE)
            .form(&expense_form("Coffee", "Food", "9.99"))
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::ROOT);
    }

    #[tokio::test]
    async fn add_with_missing_field_is_bad_request() {
        let (server, state) = get_test_server();

        server
            .post(endpoints::ADD_EXPENSE)
            .form(&[("name", "Coffee"), ("category", "Food")])
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(state.metrics.data_entries(), 0);
        let connection = state.db_connection.lock().unwrap();
        assert!(list_expenses(&connection).unwrap().expenses.is_empty());
    }

    #[tokio::test]
    async fn add_with_unparsable_price_is_bad_request() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::ADD_EXPENSE)
            .form(&expense_form("Coffee", "Food", "a lot"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn add_with_long_name_or_category_is_bad_request() {
        let (server, state) = get_test_server();
        let long_text = "x".repeat(MAX_TEXT_LENGTH + 1);

        server
            .post(endpoints::ADD_EXPENSE)
            .form(&expense_form(&long_text, "Food", "1"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .post(endpoints::ADD_EXPENSE)
            .form(&expense_form("Coffee", &long_text, "1"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(state.metrics.data_entries(), 0);
        let connection = state.db_connection.lock().unwrap();
        assert!(list_expenses(&connection).unwrap().expenses.is_empty());
    }

    #[tokio::test]
    async fn add_accepts_exponent_notation() {
        let (server, state) = get_test_server();

        add_expense(&server, "1.5e1").await;

        let expense = get_expense(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(expense.price, MinorUnits::new(1500));
    }

    #[tokio::test]
    async fn add_with_price_out_of_range_is_bad_request() {
        let (server, _) = get_test_server();

        server
            .post(endpoints::ADD_EXPENSE)
            .form(&expense_form("Coffee", "Food", "92233720368547758"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server.get(endpoints::ROOT).await.assert_status_ok();
    }

    #[tokio::test]
    async fn update_with_long_name_reports_failure_and_keeps_expense() {
        let (server, state) = get_test_server();
        add_expense(&server, "3.50").await;

        let response = server
            .post(&format_endpoint(endpoints::UPDATE_EXPENSE, 1))
            .form(&expense_form(&"x".repeat(MAX_TEXT_LENGTH + 1), "Food", "1"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<UpdateResponse>(),
            UpdateResponse {
                success: false,
                error: Some(format!("name must be at most {MAX_TEXT_LENGTH} characters")),
            }
        );
        let expense = get_expense(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(expense.name, "Coffee");
    }

    #[tokio::test]
    async fn update_with_non_numeric_id_reports_failure_as_json() {
        let (server, _) = get_test_server();

        let response = server
            .post("/update/abc")
            .form(&expense_form("Train", "Transport", "1"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let update_response = response.json::<UpdateResponse>();
        assert!(!update_response.success);
        assert!(update_response.error.is_some());
    }

    #[tokio::test]
    async fn update_replaces_expense_and_acknowledges() {
        let (server, state) = get_test_server();
        add_expense(&server, "3.50").await;

        let response = server
            .post(&format_endpoint(endpoints::UPDATE_EXPENSE, 1))
            .form(&expense_form("Train", "Transport", "12.999"))
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.json::<UpdateResponse>(),
            UpdateResponse {
                success: true,
                error: None
            }
        );
        let expense = get_expense(1, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(expense.price, MinorUnits::new(1299));
    }

    #[tokio::test]
    async fn update_missing_expense_is_not_found() {
        let (server, _) = get_test_server();

        let response = server
            .post(&format_endpoint(endpoints::UPDATE_EXPENSE, 42))
            .form(&expense_form("Train", "Transport", "1"))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        assert!(!response.json::<UpdateResponse>().success);
    }

    #[tokio::test]
    async fn update_with_missing_field_reports_failure() {
        let (server, _) = get_test_server();
        add_expense(&server, "3.50").await;

        let response = server
            .post(&format_endpoint(endpoints::UPDATE_EXPENSE, 1))
            .form(&[("name", "Train")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let update_response = response.json::<UpdateResponse>();
        assert!(!update_response.success);
        assert!(update_response.error.is_some());
    }

    #[tokio::test]
    async fn edit_page_for_missing_expense_is_not_found() {
        let (server, _) = get_test_server();

        server
            .get(&format_endpoint(endpoints::UPDATE_EXPENSE, 42))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_flow() {
        let (server, _) = get_test_server();
        add_expense(&server, "3.50").await;
        let delete_endpoint = format_endpoint(endpoints::DELETE_EXPENSE, 1);

        server.get(&delete_endpoint).await.assert_status_ok();

        let response = server.post(&delete_endpoint).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), endpoints::ROOT);

        server
            .get(&delete_endpoint)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .post(&delete_endpoint)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let response = server.get(endpoints::ROOT).await;
        assert_eq!(get_total(&response.text()), "0.00");
    }

    #[tokio::test]
    async fn only_creates_count_as_data_entries() {
        let (server, state) = get_test_server();
        add_expense(&server, "1").await;
        add_expense(&server, "2").await;

        server
            .post(&format_endpoint(endpoints::UPDATE_EXPENSE, 1))
            .form(&expense_form("Tea", "Food", "5"))
            .await
            .assert_status_ok();
        server
            .post(&format_endpoint(endpoints::DELETE_EXPENSE, 2))
            .await
            .assert_status(StatusCode::SEE_OTHER);

        assert_eq!(state.metrics.data_entries(), 2);

        let metrics = server.get(endpoints::METRICS).await.text();
        assert!(metrics.contains("data_entries_total 2"), "{metrics}");
    }

    #[tokio::test]
    async fn metrics_count_requests_by_route() {
        let (server, _) = get_test_server();
        add_expense(&server, "1").await;
        server.get(&format_endpoint(endpoints::DELETE_EXPENSE, 1)).await;

        let metrics = server.get(endpoints::METRICS).await.text();

        assert!(
            metrics.contains(r#"http_requests_total{method="POST",path="/add",status="303"} 1"#),
            "{metrics}"
        );
        assert!(
            metrics.contains(
                r#"http_requests_total{method="GET",path="/delete/{expense_id}",status="200"} 1"#
            ),
            "{metrics}"
        );
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let (server, _) = get_test_server();

        server
            .get("/does/not/exist")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn many_creates_get_distinct_ids() {
        let (server, state) = get_test_server();

        for i in 0..10 {
            server
                .post(endpoints::ADD_EXPENSE)
                .form(&expense_form(&format!("Expense {i}"), "Test", "1.01"))
                .await
                .assert_status(StatusCode::SEE_OTHER);
        }

        let list = list_expenses(&state.db_connection.lock().unwrap()).unwrap();
        let mut ids = list
            .expenses
            .iter()
            .map(|expense| expense.id)
            .collect::<Vec<_>>();
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert_eq!(list.total, MinorUnits::new(1010));
        assert_eq!(state.metrics.data_entries(), 10);
    }
}
