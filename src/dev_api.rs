//! An in-memory Transactions API for local development and tests.
//!
//! It implements the same contract the tracker expects from the real API:
//! JSON in and out, integer IDs assigned on create, and error responses with
//! a `message` field. Nothing is persisted.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use time::{Date, macros::format_description};

use crate::transaction::{Amount, Transaction, TransactionId, TransactionType};

/// The route for the transaction collection.
pub const TRANSACTIONS: &str = "/api/transactions";
/// The route for a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";

#[derive(Debug, Default)]
struct Store {
    transactions: Vec<Transaction>,
    last_id: i64,
}

/// The state of the dev API server.
#[derive(Debug, Clone, Default)]
pub struct DevApiState {
    store: Arc<Mutex<Store>>,
}

impl DevApiState {
    /// Create an API with no transactions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an API that starts out with `transactions`.
    ///
    /// New transactions get IDs after the largest integer ID in `transactions`.
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        let last_id = transactions
            .iter()
            .filter_map(|transaction| match transaction.id {
                TransactionId::Number(id) => Some(id),
                TransactionId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);

        Self {
            store: Arc::new(Mutex::new(Store {
                transactions,
                last_id,
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, DevApiError> {
        self.store
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire store lock: {error}"))
            .map_err(|_| DevApiError::StoreLock)
    }
}

/// Return a router that serves the Transactions API.
pub fn build_dev_api_router(state: DevApiState) -> Router {
    Router::new()
        .route(
            TRANSACTIONS,
            get(list_transactions).post(create_transaction),
        )
        .route(
            TRANSACTION,
            axum::routing::put(update_transaction).delete(delete_transaction),
        )
        .with_state(state)
}

/// The create/update request body.
#[derive(Debug, Deserialize)]
struct TransactionPayload {
    description: String,
    amount: Amount,
    date: String,
    #[serde(rename = "type")]
    type_: TransactionType,
}

/// A payload that passed validation.
struct ValidPayload {
    description: String,
    amount: Amount,
    date: Date,
    type_: TransactionType,
}

impl TransactionPayload {
    fn validate(self) -> Result<ValidPayload, DevApiError> {
        if self.description.trim().is_empty() {
            return Err(DevApiError::Validation("Description is required".to_owned()));
        }

        let is_number = self
            .amount
            .as_str()
            .trim()
            .parse::<f64>()
            .is_ok_and(f64::is_finite);
        if !is_number {
            return Err(DevApiError::Validation("Invalid amount".to_owned()));
        }

        let date = Date::parse(&self.date, format_description!("[year]-[month]-[day]"))
            .map_err(|_| DevApiError::Validation("Invalid date".to_owned()))?;

        Ok(ValidPayload {
            description: self.description,
            amount: self.amount,
            date,
            type_: self.type_,
        })
    }
}

#[derive(Debug, PartialEq)]
enum DevApiError {
    NotFound,
    Validation(String),
    StoreLock,
}

impl IntoResponse for DevApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            DevApiError::NotFound => (StatusCode::NOT_FOUND, "Transaction not found".to_owned()),
            DevApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            DevApiError::StoreLock => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_owned(),
            ),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<JsonRejection> for DevApiError {
    fn from(rejection: JsonRejection) -> Self {
        DevApiError::Validation(rejection.body_text())
    }
}

fn same_id(transaction: &Transaction, id: &str) -> bool {
    transaction.id.to_string() == id
}

async fn list_transactions(
    State(state): State<DevApiState>,
) -> Result<Json<Vec<Transaction>>, DevApiError> {
    Ok(Json(state.lock()?.transactions.clone()))
}

async fn create_transaction(
    State(state): State<DevApiState>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), DevApiError> {
    let Json(payload) = payload?;
    let payload = payload.validate()?;
    let mut store = state.lock()?;

    store.last_id += 1;
    let transaction = Transaction {
        id: TransactionId::Number(store.last_id),
        description: payload.description,
        amount: payload.amount,
        date: payload.date,
        type_: payload.type_,
    };
    store.transactions.push(transaction.clone());
    tracing::info!("created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

async fn update_transaction(
    State(state): State<DevApiState>,
    Path(transaction_id): Path<String>,
    payload: Result<Json<TransactionPayload>, JsonRejection>,
) -> Result<Json<Transaction>, DevApiError> {
    let Json(payload) = payload?;
    let payload = payload.validate()?;
    let mut store = state.lock()?;

    let transaction = store
        .transactions
        .iter_mut()
        .find(|transaction| same_id(transaction, &transaction_id))
        .ok_or(DevApiError::NotFound)?;
    transaction.description = payload.description;
    transaction.amount = payload.amount;
    transaction.date = payload.date;
    transaction.type_ = payload.type_;
    tracing::info!("updated transaction {transaction_id}");

    Ok(Json(transaction.clone()))
}

async fn delete_transaction(
    State(state): State<DevApiState>,
    Path(transaction_id): Path<String>,
) -> Result<StatusCode, DevApiError> {
    let mut store = state.lock()?;
    let count_before = store.transactions.len();

    store
        .transactions
        .retain(|transaction| !same_id(transaction, &transaction_id));

    if store.transactions.len() == count_before {
        return Err(DevApiError::NotFound);
    }

    tracing::info!("deleted transaction {transaction_id}");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use time::macros::date;

    use crate::transaction::{Amount, Transaction, TransactionId, TransactionType};

    use super::{DevApiState, TRANSACTIONS, build_dev_api_router};

    fn new_test_server(state: DevApiState) -> TestServer {
        TestServer::try_new(build_dev_api_router(state)).expect("Could not create test server.")
    }

    fn coffee() -> Transaction {
        Transaction {
            id: TransactionId::Number(1),
            description: "Coffee".to_owned(),
            amount: Amount::new("4.50"),
            date: date!(2024 - 01 - 01),
            type_: TransactionType::Expense,
        }
    }

    #[tokio::test]
    async fn lists_transactions_in_insertion_order() {
        let server = new_test_server(DevApiState::with_transactions(vec![coffee()]));

        let response = server.get(TRANSACTIONS).await;

        response.assert_status_ok();
        response.assert_json(&json!([{
            "id": 1,
            "description": "Coffee",
            "amount": "4.50",
            "date": "2024-01-01",
            "type": "expense"
        }]));
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let server = new_test_server(DevApiState::with_transactions(vec![coffee()]));

        let response = server
            .post(TRANSACTIONS)
            .json(&json!({
                "description": "Paycheck",
                "amount": "2000",
                "date": "2024-01-15",
                "type": "income"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(json!(2), body["id"]);
        assert_eq!(json!("2000"), body["amount"]);
    }

    #[tokio::test]
    async fn create_rejects_invalid_amount() {
        let server = new_test_server(DevApiState::new());

        let response = server
            .post(TRANSACTIONS)
            .json(&json!({
                "description": "Paycheck",
                "amount": "lots",
                "date": "2024-01-15",
                "type": "income"
            }))
            .expect_failure()
            .await;

        response.assert_status_bad_request();
        response.assert_json(&json!({ "message": "Invalid amount" }));
    }

    #[tokio::test]
    async fn create_rejects_empty_description_and_bad_date() {
        let server = new_test_server(DevApiState::new());

        let response = server
            .post(TRANSACTIONS)
            .json(&json!({
                "description": " ",
                "amount": "1",
                "date": "2024-01-15",
                "type": "income"
            }))
            .expect_failure()
            .await;
        response.assert_json(&json!({ "message": "Description is required" }));

        let response = server
            .post(TRANSACTIONS)
            .json(&json!({
                "description": "Paycheck",
                "amount": "1",
                "date": "15/01/2024",
                "type": "income"
            }))
            .expect_failure()
            .await;
        response.assert_json(&json!({ "message": "Invalid date" }));
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let server = new_test_server(DevApiState::with_transactions(vec![coffee()]));

        server
            .put("/api/transactions/1")
            .json(&json!({
                "description": "Tea",
                "amount": "3.00",
                "date": "2024-01-02",
                "type": "expense"
            }))
            .await
            .assert_status_ok();

        let body: Value = server.get(TRANSACTIONS).await.json();
        assert_eq!(json!("Tea"), body[0]["description"]);
        assert_eq!(json!("3.00"), body[0]["amount"]);
    }

    #[tokio::test]
    async fn update_and_delete_unknown_id_return_not_found() {
        let server = new_test_server(DevApiState::new());

        let response = server
            .put("/api/transactions/9")
            .json(&json!({
                "description": "Tea",
                "amount": "3.00",
                "date": "2024-01-02",
                "type": "expense"
            }))
            .expect_failure()
            .await;
        response.assert_status_not_found();
        response.assert_json(&json!({ "message": "Transaction not found" }));

        server
            .delete("/api/transactions/9")
            .expect_failure()
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_removes_transaction() {
        let server = new_test_server(DevApiState::with_transactions(vec![coffee()]));

        server
            .delete("/api/transactions/1")
            .await
            .assert_status(axum::http::StatusCode::NO_CONTENT);

        let body: Value = server.get(TRANSACTIONS).await.json();
        assert_eq!(json!([]), body);
    }
}
