//! Test utilities for wrap-core
//!
//! This module provides a mock server speaking just enough of the YNAB and
//! Telegram Bot APIs for the clients, the pipeline and the CLI to be tested
//! end to end without network access.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Budget id served by the mock
pub const MOCK_BUDGET_ID: &str = "mock-budget";

/// Personal access token the mock YNAB API accepts
pub const MOCK_YNAB_TOKEN: &str = "mock-ynab-token";

/// Bot token the mock Telegram API accepts
pub const MOCK_BOT_TOKEN: &str = "123456:mock-bot-token";

/// Data and failure modes served by [`MockApiServer`]
#[derive(Debug, Clone, Default)]
pub struct MockFixture {
    pub budget_name: String,
    /// YNAB `category_groups` array
    pub category_groups: Value,
    /// YNAB `transactions` array
    pub transactions: Value,
    /// Fail every YNAB request with this status and error name
    pub ynab_error: Option<(u16, String)>,
    /// Reject every `sendMessage` with this description
    pub telegram_error: Option<String>,
}

#[derive(Default)]
struct Recorded {
    sent_messages: Vec<Value>,
    since_dates: Vec<String>,
}

#[derive(Clone)]
struct MockState {
    fixture: Arc<MockFixture>,
    recorded: Arc<Mutex<Recorded>>,
}

/// Mock YNAB + Telegram server for testing
pub struct MockApiServer {
    addr: SocketAddr,
    recorded: Arc<Mutex<Recorded>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockApiServer {
    /// Start the mock server on an available port
    pub async fn start(fixture: MockFixture) -> Self {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let state = MockState {
            fixture: Arc::new(fixture),
            recorded: recorded.clone(),
        };

        let app = Router::new()
            .route("/v1/budgets/:budget_id", get(handle_budget))
            .route("/v1/budgets/:budget_id/categories", get(handle_categories))
            .route(
                "/v1/budgets/:budget_id/transactions",
                get(handle_transactions),
            )
            .route("/telegram/:bot/sendMessage", post(handle_send_message))
            .route("/telegram/:bot/getMe", get(handle_get_me))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            recorded,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for the YNAB API (`YNAB_BASE_URL`)
    pub fn ynab_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Base URL for the Bot API (`TELEGRAM_API_URL`)
    pub fn telegram_url(&self) -> String {
        format!("http://{}/telegram", self.addr)
    }

    /// Bodies of every accepted `sendMessage` call, in order
    pub fn sent_messages(&self) -> Vec<Value> {
        self.recorded.lock().unwrap().sent_messages.clone()
    }

    /// `since_date` of every transactions request, in order
    pub fn since_dates(&self) -> Vec<String> {
        self.recorded.lock().unwrap().since_dates.clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

// =============================================================================
// YNAB handlers
// =============================================================================

fn ynab_error(status: u16, name: &str, detail: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({
        "error": {
            "id": status.as_u16().to_string(),
            "name": name,
            "detail": detail,
        }
    });
    (status, Json(body)).into_response()
}

/// Auth, budget id and injected failures shared by every YNAB route
fn check_ynab(state: &MockState, headers: &HeaderMap, budget_id: &str) -> Option<Response> {
    let expected = format!("Bearer {}", MOCK_YNAB_TOKEN);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);

    if !authorized {
        return Some(ynab_error(401, "unauthorized", "Unauthorized"));
    }
    if let Some((status, name)) = &state.fixture.ynab_error {
        return Some(ynab_error(*status, name, "Injected failure"));
    }
    if budget_id != MOCK_BUDGET_ID {
        return Some(ynab_error(404, "resource_not_found", "Resource not found"));
    }
    None
}

fn array_or_empty(value: &Value) -> Value {
    if value.is_array() {
        value.clone()
    } else {
        json!([])
    }
}

async fn handle_budget(
    State(state): State<MockState>,
    Path(budget_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = check_ynab(&state, &headers, &budget_id) {
        return rejection;
    }

    Json(json!({
        "data": {
            "budget": {
                "id": MOCK_BUDGET_ID,
                "name": state.fixture.budget_name,
                "last_modified_on": "2024-03-10T18:30:00+00:00",
            }
        }
    }))
    .into_response()
}

async fn handle_categories(
    State(state): State<MockState>,
    Path(budget_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = check_ynab(&state, &headers, &budget_id) {
        return rejection;
    }

    Json(json!({
        "data": {
            "category_groups": array_or_empty(&state.fixture.category_groups),
            "server_knowledge": 100,
        }
    }))
    .into_response()
}

async fn handle_transactions(
    State(state): State<MockState>,
    Path(budget_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Some(rejection) = check_ynab(&state, &headers, &budget_id) {
        return rejection;
    }

    let since = params.get("since_date").cloned();
    if let Some(since) = &since {
        state.recorded.lock().unwrap().since_dates.push(since.clone());
    }

    // ISO dates compare correctly as strings
    let transactions: Vec<Value> = array_or_empty(&state.fixture.transactions)
        .as_array()
        .cloned()
        .unwrap_or_default()
        .into_iter()
        .filter(|tx| match (&since, tx["date"].as_str()) {
            (Some(since), Some(date)) => date >= since.as_str(),
            _ => true,
        })
        .collect();

    Json(json!({
        "data": {
            "transactions": transactions,
            "server_knowledge": 100,
        }
    }))
    .into_response()
}

// =============================================================================
// Telegram handlers
// =============================================================================

fn telegram_authorized(bot: &str) -> bool {
    bot == format!("bot{}", MOCK_BOT_TOKEN)
}

fn telegram_error(status: StatusCode, description: &str) -> Response {
    let body = json!({
        "ok": false,
        "error_code": status.as_u16(),
        "description": description,
    });
    (status, Json(body)).into_response()
}

async fn handle_send_message(
    State(state): State<MockState>,
    Path(bot): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !telegram_authorized(&bot) {
        return telegram_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    if let Some(description) = &state.fixture.telegram_error {
        return telegram_error(StatusCode::BAD_REQUEST, description);
    }

    let message_id = {
        let mut recorded = state.recorded.lock().unwrap();
        recorded.sent_messages.push(body.clone());
        recorded.sent_messages.len()
    };

    Json(json!({
        "ok": true,
        "result": {
            "message_id": message_id,
            "date": 1_710_147_600,
            "chat": { "id": body["chat_id"] },
            "text": body["text"],
        }
    }))
    .into_response()
}

async fn handle_get_me(Path(bot): Path<String>) -> Response {
    if !telegram_authorized(&bot) {
        return telegram_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    Json(json!({
        "ok": true,
        "result": {
            "id": 123_456,
            "is_bot": true,
            "first_name": "Weekly Wrap",
            "username": "weekly_wrap_bot",
        }
    }))
    .into_response()
}

// =============================================================================
// Sample data
// =============================================================================

fn category(id: &str, group_id: &str, name: &str, budgeted: i64, activity: i64, balance: i64) -> Value {
    json!({
        "id": id,
        "category_group_id": group_id,
        "name": name,
        "hidden": false,
        "deleted": false,
        "budgeted": budgeted,
        "activity": activity,
        "balance": balance,
    })
}

fn transaction(
    id: &str,
    date: &str,
    amount: i64,
    memo: Option<&str>,
    payee: &str,
    category: Option<(&str, &str)>,
) -> Value {
    json!({
        "id": id,
        "date": date,
        "amount": amount,
        "memo": memo,
        "cleared": "cleared",
        "approved": true,
        "flag_color": null,
        "account_id": "acct-checking",
        "account_name": "Checking",
        "payee_id": format!("payee-{}", id),
        "payee_name": payee,
        "category_id": category.map(|(id, _)| id),
        "category_name": category.map(|(_, name)| name),
        "transfer_account_id": null,
        "import_id": null,
        "deleted": false,
        "subtransactions": [],
    })
}

/// A household budget for the week of 2024-03-04 to 2024-03-11
///
/// Analyzed at 2024-03-11T09:00Z it totals $299.84 across Groceries,
/// Fuel and Dining Out, with Dining Out the only category over budget.
/// It also carries an inflow, a deleted transaction, one dated before the
/// window and an uncategorized transfer, none of which count as spending.
pub fn sample_fixture() -> MockFixture {
    const GROCERIES: (&str, &str) = ("cat-groceries", "Groceries");
    const DINING: (&str, &str) = ("cat-dining", "Dining Out");
    const FUEL: (&str, &str) = ("cat-fuel", "Fuel");

    let category_groups = json!([
        {
            "id": "grp-everyday",
            "name": "Everyday",
            "hidden": false,
            "deleted": false,
            "categories": [
                category("cat-groceries", "grp-everyday", "Groceries", 400_000, -250_000, 150_000),
                category("cat-dining", "grp-everyday", "Dining Out", 100_000, -125_500, -25_500),
                category("cat-fuel", "grp-everyday", "Fuel", 120_000, -90_000, 30_000),
                category("cat-fun", "grp-everyday", "Fun Money", 0, 0, 0),
            ],
        },
        {
            "id": "grp-bills",
            "name": "Monthly Bills",
            "hidden": false,
            "deleted": false,
            "categories": [
                category("cat-subs", "grp-bills", "Subscriptions", 50_000, -5_000, 45_000),
            ],
        },
    ]);

    let mut deleted = transaction("t-deleted", "2024-03-06", -60_000, Some("Duplicate"), "Fresh Market", Some(GROCERIES));
    deleted["deleted"] = json!(true);

    let mut transfer = transaction("t-transfer", "2024-03-08", -200_000, Some("To savings"), "Transfer : Savings", None);
    transfer["transfer_account_id"] = json!("acct-savings");

    let transactions = json!([
        transaction("t-early", "2024-03-02", -30_000, Some("Last week"), "Corner Shop", Some(GROCERIES)),
        transaction("t-1", "2024-03-05", -82_340, None, "Fresh Market", Some(GROCERIES)),
        transaction("t-2", "2024-03-06", -42_000, Some("Anniversary dinner"), "Bistro", Some(DINING)),
        deleted,
        transaction("t-3", "2024-03-07", -18_500, Some(""), "Taqueria", Some(DINING)),
        transaction("t-4", "2024-03-07", -91_000, None, "Gas Station", Some(FUEL)),
        transaction("t-5", "2024-03-08", -12_000, Some("Team lunch"), "Cafe", Some(DINING)),
        transfer,
        transaction("t-6", "2024-03-09", -45_000, Some("Weekly shop"), "Fresh Market", Some(GROCERIES)),
        transaction("t-paycheck", "2024-03-09", 2_500_000, Some("Salary"), "Employer", Some(("cat-rta", "Inflow: Ready to Assign"))),
        transaction("t-7", "2024-03-10", -9_000, None, "Bakery", Some(DINING)),
    ]);

    MockFixture {
        budget_name: "Household".to_string(),
        category_groups,
        transactions,
        ynab_error: None,
        telegram_error: None,
    }
}
