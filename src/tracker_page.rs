//! Route handlers that turn browser events into tracker operations.
//!
//! Each handler runs one operation on the shared [Tracker] and answers with
//! the re-rendered `#tracker` fragment for htmx to swap in. Plain form posts
//! (no htmx) are redirected back to the page instead.

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRequest;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    api::TransactionsApi,
    endpoints,
    tracker::Tracker,
    transaction::DraftField,
    view::{tracker_page, tracker_view},
};

/// The transaction form fields.
///
/// Fields are optional because the per-field change requests only need to
/// carry the inputs that are enabled.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DraftForm {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

impl DraftForm {
    fn changes(&self) -> Vec<(DraftField, &str)> {
        [
            (DraftField::Description, &self.description),
            (DraftField::Amount, &self.amount),
            (DraftField::Date, &self.date),
            (DraftField::Type, &self.type_),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

/// Render the tracker page, fetching the latest transactions first.
pub async fn get_tracker_page<A: TransactionsApi>(
    State(state): State<AppState<A>>,
) -> Result<Response, Error> {
    state.tracker.load_all().await?;
    let snapshot = state.tracker.snapshot()?;

    Ok(tracker_page(&snapshot).into_response())
}

/// Store changes to form fields as the user makes them.
pub async fn update_draft_endpoint<A: TransactionsApi>(
    State(state): State<AppState<A>>,
    Form(form): Form<DraftForm>,
) -> Result<StatusCode, Error> {
    for (field, value) in form.changes() {
        state.tracker.update_draft_field(field, value)?;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Submit the form, creating or updating a transaction.
pub async fn submit_endpoint<A: TransactionsApi>(
    State(state): State<AppState<A>>,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<DraftForm>,
) -> Result<Response, Error> {
    let outcome = state.tracker.submit_with(&form.changes()).await?;
    tracing::info!("submit finished: {outcome:?}");

    render_tracker(&state.tracker, is_htmx)
}

/// Switch the form to editing the transaction `transaction_id`.
pub async fn edit_transaction_endpoint<A: TransactionsApi>(
    State(state): State<AppState<A>>,
    HxRequest(is_htmx): HxRequest,
    Path(transaction_id): Path<String>,
) -> Result<Response, Error> {
    state
        .tracker
        .begin_edit_by_id(&transaction_id)
        .inspect_err(|error| {
            tracing::warn!("could not edit transaction {transaction_id}: {error}")
        })?;

    render_tracker(&state.tracker, is_htmx)
}

/// Leave editing mode.
pub async fn cancel_edit_endpoint<A: TransactionsApi>(
    State(state): State<AppState<A>>,
    HxRequest(is_htmx): HxRequest,
) -> Result<Response, Error> {
    state.tracker.cancel_edit()?;

    render_tracker(&state.tracker, is_htmx)
}

/// Delete the transaction `transaction_id`.
pub async fn delete_transaction_endpoint<A: TransactionsApi>(
    State(state): State<AppState<A>>,
    HxRequest(is_htmx): HxRequest,
    Path(transaction_id): Path<String>,
) -> Result<Response, Error> {
    state
        .tracker
        .remove_by_id(&transaction_id)
        .await
        .inspect_err(|error| {
            tracing::warn!("could not delete transaction {transaction_id}: {error}")
        })?;

    render_tracker(&state.tracker, is_htmx)
}

fn render_tracker<A: TransactionsApi>(
    tracker: &Tracker<A>,
    is_htmx: bool,
) -> Result<Response, Error> {
    if !is_htmx {
        return Ok(Redirect::to(endpoints::ROOT).into_response());
    }

    let snapshot = tracker.snapshot()?;

    Ok(tracker_view(&snapshot).into_response())
}
