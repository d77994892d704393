//! Application router configuration.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use crate::{
    AppState, endpoints,
    api::TransactionsApi,
    html::error_view,
    logging::logging_middleware,
    tracker_page::{
        cancel_edit_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        get_tracker_page, submit_endpoint, update_draft_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router<A: TransactionsApi>(state: AppState<A>) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_tracker_page::<A>))
        .route(endpoints::DRAFT, post(update_draft_endpoint::<A>))
        .route(endpoints::SUBMIT, post(submit_endpoint::<A>))
        .route(endpoints::CANCEL_EDIT, post(cancel_edit_endpoint::<A>))
        .route(
            endpoints::EDIT_TRANSACTION,
            post(edit_transaction_endpoint::<A>),
        )
        .route(
            endpoints::DELETE_TRANSACTION,
            delete(delete_transaction_endpoint::<A>),
        )
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        error_view(
            "Not Found",
            "404",
            "Page not found",
            "Sorry, we can't find that page. You'll find lots to explore on the home page.",
        ),
    )
        .into_response()
}
