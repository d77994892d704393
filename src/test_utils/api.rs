use std::sync::{Arc, Mutex};

use time::{Date, macros::format_description};
use tokio::sync::Notify;

use crate::{
    api::{ApiError, TransactionsApi},
    transaction::{Amount, Draft, Transaction, TransactionId},
};

/// A call made to [FakeApi], in the order it was made.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ApiCall {
    List,
    Create(Draft),
    Update(TransactionId, Draft),
    Delete(TransactionId),
}

#[derive(Debug, Default)]
struct FakeApiInner {
    transactions: Vec<Transaction>,
    next_id: i64,
    calls: Vec<ApiCall>,
    list_error: Option<ApiError>,
    mutation_error: Option<ApiError>,
}

/// An in-memory [TransactionsApi] that records every call.
///
/// Clones share the same data, so a test can keep a clone to inspect calls
/// after handing the other to a tracker.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeApi {
    inner: Arc<Mutex<FakeApiInner>>,
    release: Option<Arc<Notify>>,
}

impl FakeApi {
    pub(crate) fn with_transactions(transactions: Vec<Transaction>) -> Self {
        let next_id = transactions
            .iter()
            .filter_map(|transaction| match transaction.id {
                TransactionId::Number(id) => Some(id),
                TransactionId::Text(_) => None,
            })
            .max()
            .unwrap_or(0);

        Self {
            inner: Arc::new(Mutex::new(FakeApiInner {
                transactions,
                next_id,
                ..Default::default()
            })),
            release: None,
        }
    }

    /// Make create, update and delete wait for `release` before completing.
    pub(crate) fn block_mutations_until(mut self, release: Arc<Notify>) -> Self {
        self.release = Some(release);
        self
    }

    pub(crate) fn fail_list_with(&self, error: ApiError) {
        self.inner.lock().unwrap().list_error = Some(error);
    }

    pub(crate) fn fail_mutations_with(&self, error: ApiError) {
        self.inner.lock().unwrap().mutation_error = Some(error);
    }

    pub(crate) fn clear_failures(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.list_error = None;
        inner.mutation_error = None;
    }

    pub(crate) fn calls(&self) -> Vec<ApiCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    async fn wait_for_release(&self) {
        if let Some(release) = &self.release {
            release.notified().await;
        }
    }
}

fn parse_date(date: &str) -> Result<Date, ApiError> {
    Date::parse(date, format_description!("[year]-[month]-[day]")).map_err(|_| ApiError::Server {
        status: 400,
        message: Some("Invalid date".to_owned()),
    })
}

fn not_found() -> ApiError {
    ApiError::Server {
        status: 404,
        message: Some("Transaction not found".to_owned()),
    }
}

impl TransactionsApi for FakeApi {
    async fn list(&self) -> Result<Vec<Transaction>, ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(ApiCall::List);

        match &inner.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(inner.transactions.clone()),
        }
    }

    async fn create(&self, draft: &Draft) -> Result<(), ApiError> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(ApiCall::Create(draft.clone()));
        self.wait_for_release().await;

        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = &inner.mutation_error {
            return Err(error.clone());
        }

        inner.next_id += 1;
        let transaction = Transaction {
            id: TransactionId::Number(inner.next_id),
            description: draft.description.clone(),
            amount: Amount::new(draft.amount.clone()),
            date: parse_date(&draft.date)?,
            type_: draft.type_,
        };
        inner.transactions.push(transaction);

        Ok(())
    }

    async fn update(&self, id: &TransactionId, draft: &Draft) -> Result<(), ApiError> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(ApiCall::Update(id.clone(), draft.clone()));
        self.wait_for_release().await;

        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = &inner.mutation_error {
            return Err(error.clone());
        }

        let date = parse_date(&draft.date)?;
        let transaction = inner
            .transactions
            .iter_mut()
            .find(|transaction| &transaction.id == id)
            .ok_or_else(not_found)?;
        transaction.description = draft.description.clone();
        transaction.amount = Amount::new(draft.amount.clone());
        transaction.date = date;
        transaction.type_ = draft.type_;

        Ok(())
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), ApiError> {
        self.inner
            .lock()
            .unwrap()
            .calls
            .push(ApiCall::Delete(id.clone()));
        self.wait_for_release().await;

        let mut inner = self.inner.lock().unwrap();
        if let Some(error) = &inner.mutation_error {
            return Err(error.clone());
        }

        let before = inner.transactions.len();
        inner.transactions.retain(|transaction| &transaction.id != id);

        if inner.transactions.len() == before {
            return Err(not_found());
        }

        Ok(())
    }
}
