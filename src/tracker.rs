//! The transaction tracker store.
//!
//! [Tracker] owns the state behind the page: the last fetched list of
//! transactions, the draft form, whether an existing transaction is being
//! edited, the status message and whether a submit is in flight. Views render
//! a [TrackerState] snapshot and never mutate it.
//!
//! Every mutation is followed by a full refetch of the list, so the list is
//! always exactly what the API last returned.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    Error,
    api::{ApiError, TransactionsApi},
    transaction::{Draft, DraftField, Transaction, TransactionId},
};

/// Whether submitting the form creates a new transaction or updates one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// Submitting creates a new transaction.
    #[default]
    Creating,
    /// Submitting updates the transaction with this ID.
    Editing(TransactionId),
}

/// How a status message should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// The action worked.
    Success,
    /// The action failed.
    Error,
}

/// A message telling the user how their last action went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    /// How to style the message.
    pub kind: MessageKind,
    /// The text shown to the user.
    pub text: String,
}

impl StatusMessage {
    /// A success message.
    pub fn success(text: &str) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.to_owned(),
        }
    }

    /// An error message. `text` should start with "Error".
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    /// Build the message shown to the user for a failed API call.
    pub fn from_api_error(error: &ApiError) -> Self {
        let text = match error {
            ApiError::Server { status, message } => format!(
                "Error: {status} - {}",
                message.as_deref().unwrap_or("Server error")
            ),
            ApiError::NoResponse(_) => {
                "Error: No response from server. Check that the API server is running.".to_owned()
            }
            ApiError::Setup(detail) => format!("Error: Could not send request - {detail}"),
            ApiError::InvalidResponse(_) => {
                "Error: The server sent a response that could not be read.".to_owned()
            }
        };

        Self::error(text)
    }

    /// Whether this is an error message.
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

pub(crate) const ADDED_MESSAGE: &str = "Transaction added successfully!";
pub(crate) const UPDATED_MESSAGE: &str = "Transaction updated successfully!";
pub(crate) const DELETED_MESSAGE: &str = "Transaction deleted successfully!";
pub(crate) const DELETE_FAILED_MESSAGE: &str = "Error: Could not delete transaction.";

/// Everything the tracker page displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackerState {
    /// The transactions from the last successful fetch, in server order.
    pub transactions: Vec<Transaction>,
    /// The form being composed.
    pub draft: Draft,
    /// Whether the form creates or updates.
    pub mode: Mode,
    /// The outcome of the last action, if any.
    pub message: Option<StatusMessage>,
    /// Whether a submit is in flight.
    pub is_loading: bool,
}

/// What happened when the form was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A new transaction was created.
    Created,
    /// An existing transaction was updated.
    Updated,
    /// The API call failed, the message describes why.
    Failed,
    /// Another submit was already in flight, nothing was sent.
    Ignored,
}

/// The tracker store, shared between request handlers.
///
/// The state lock is only held for short, synchronous updates, never across
/// a call to the API.
pub struct Tracker<A> {
    api: Arc<A>,
    state: Arc<Mutex<TrackerState>>,
}

impl<A> Clone for Tracker<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
        }
    }
}

impl<A> std::fmt::Debug for Tracker<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<A: TransactionsApi> Tracker<A> {
    /// Create a tracker with an empty list that talks to `api`.
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            state: Arc::new(Mutex::new(TrackerState::default())),
        }
    }

    /// A copy of the current state for rendering.
    ///
    /// # Errors
    /// Returns [Error::StateLockError] if the state lock is poisoned.
    pub fn snapshot(&self) -> Result<TrackerState, Error> {
        Ok(self.lock()?.clone())
    }

    /// Replace the list with a fresh copy from the API.
    ///
    /// On failure the current list is kept and an error message is set.
    pub async fn load_all(&self) -> Result<(), Error> {
        let result = self.api.list().await;
        let mut state = self.lock()?;

        match result {
            Ok(transactions) => {
                tracing::debug!("fetched {} transactions", transactions.len());
                state.transactions = transactions;

                if state.message.as_ref().is_some_and(StatusMessage::is_error) {
                    state.message = None;
                }
            }
            Err(error) => {
                tracing::error!("Error fetching transactions: {error}");
                state.message = Some(StatusMessage::from_api_error(&error));
            }
        }

        Ok(())
    }

    /// Set one field of the draft.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType] for an unknown transaction type.
    pub fn update_draft_field(&self, field: DraftField, value: &str) -> Result<(), Error> {
        self.lock()?.draft.set(field, value)
    }

    /// Send the draft to the API, creating or updating depending on [Mode],
    /// then refetch the list.
    ///
    /// Only one submit runs at a time. A submit that arrives while another is
    /// in flight returns [SubmitOutcome::Ignored] without calling the API.
    pub async fn submit(&self) -> Result<SubmitOutcome, Error> {
        self.submit_with(&[]).await
    }

    /// [Tracker::submit] after setting the draft fields in `changes`.
    ///
    /// The changes are applied under the same lock that starts the submit, so
    /// they are dropped, not merged, when another submit is already in flight.
    ///
    /// # Errors
    /// Returns [Error::InvalidTransactionType] for an unknown transaction type,
    /// in which case nothing is sent.
    pub async fn submit_with(
        &self,
        changes: &[(DraftField, &str)],
    ) -> Result<SubmitOutcome, Error> {
        let (mode, draft) = {
            let mut state = self.lock()?;

            if state.is_loading {
                tracing::debug!("ignoring submit while another submit is in flight");
                return Ok(SubmitOutcome::Ignored);
            }

            for (field, value) in changes {
                state.draft.set(*field, value)?;
            }

            state.is_loading = true;
            (state.mode.clone(), state.draft.clone())
        };

        let _loading = LoadingGuard {
            state: self.state.clone(),
        };

        let (result, success) = match &mode {
            Mode::Editing(id) => (
                self.api.update(id, &draft).await,
                (SubmitOutcome::Updated, UPDATED_MESSAGE),
            ),
            Mode::Creating => (
                self.api.create(&draft).await,
                (SubmitOutcome::Created, ADDED_MESSAGE),
            ),
        };

        match result {
            Ok(()) => {
                {
                    let mut state = self.lock()?;
                    state.message = Some(StatusMessage::success(success.1));
                    state.mode = Mode::Creating;
                    state.draft = Draft::default();
                }

                self.load_all().await?;

                Ok(success.0)
            }
            Err(error) => {
                tracing::error!("Error saving transaction: {error}");
                self.lock()?.message = Some(StatusMessage::from_api_error(&error));

                Ok(SubmitOutcome::Failed)
            }
        }
    }

    /// Fill the draft from `transaction` and address the next submit to it.
    ///
    /// Nothing is sent to the API.
    pub fn begin_edit(&self, transaction: &Transaction) -> Result<(), Error> {
        let mut state = self.lock()?;
        state.draft = Draft::from_transaction(transaction);
        state.mode = Mode::Editing(transaction.id.clone());

        Ok(())
    }

    /// [Tracker::begin_edit] for the listed transaction whose ID reads `id`.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no listed transaction has the ID `id`.
    pub fn begin_edit_by_id(&self, id: &str) -> Result<(), Error> {
        let transaction = self.find(id)?.ok_or(Error::NotFound)?;

        self.begin_edit(&transaction)
    }

    /// Leave editing mode and clear the draft.
    pub fn cancel_edit(&self) -> Result<(), Error> {
        let mut state = self.lock()?;
        state.mode = Mode::Creating;
        state.draft = Draft::default();

        Ok(())
    }

    /// Delete the transaction `id`, then refetch the list.
    ///
    /// Returns whether the delete succeeded.
    pub async fn remove_one(&self, id: &TransactionId) -> Result<bool, Error> {
        match self.api.delete(id).await {
            Ok(()) => {
                self.lock()?.message = Some(StatusMessage::success(DELETED_MESSAGE));
                self.load_all().await?;

                Ok(true)
            }
            Err(error) => {
                tracing::error!("Error deleting transaction {id}: {error}");
                self.lock()?.message = Some(StatusMessage::error(DELETE_FAILED_MESSAGE));

                Ok(false)
            }
        }
    }

    /// [Tracker::remove_one] for the listed transaction whose ID reads `id`.
    ///
    /// The delete is addressed with the listed transaction's own ID, so a text
    /// ID like "007" is sent as-is.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no listed transaction has the ID `id`.
    pub async fn remove_by_id(&self, id: &str) -> Result<bool, Error> {
        let transaction = self.find(id)?.ok_or(Error::NotFound)?;

        self.remove_one(&transaction.id).await
    }

    /// Look up the transaction in the current list whose ID reads `id`, e.g.
    /// an ID taken from a URL path.
    pub fn find(&self, id: &str) -> Result<Option<Transaction>, Error> {
        Ok(self
            .lock()?
            .transactions
            .iter()
            .find(|transaction| transaction.id.to_string() == id)
            .cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, TrackerState>, Error> {
        self.state
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire tracker state lock: {error}"))
            .map_err(|_| Error::StateLockError)
    }
}

/// Clears [TrackerState::is_loading] when dropped, including when a submit
/// future is dropped before it finishes.
struct LoadingGuard {
    state: Arc<Mutex<TrackerState>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        match self.state.lock() {
            Ok(mut state) => state.is_loading = false,
            Err(poisoned) => poisoned.into_inner().is_loading = false,
        }
    }
}
