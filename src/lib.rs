//! A personal finance tracker.
//!
//! The tracker is a single page with a form for adding or editing a
//! transaction and a list of the existing transactions. Transactions are
//! stored by a separate Transactions API, which this crate talks to over
//! HTTP/JSON. The page is rendered on the server and driven by htmx.
//!
//! The crate also ships [dev_api], an in-memory Transactions API for local
//! development and tests.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

pub mod api;
mod app_state;
pub mod dev_api;
mod endpoints;
mod html;
mod logging;
mod routing;
pub mod tracker;
mod tracker_page;
pub mod transaction;
mod view;

#[cfg(test)]
mod test_utils;

pub use api::{ApiError, DEFAULT_API_URL, HttpTransactionsApi, TransactionsApi};
pub use app_state::AppState;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use tracker::{Tracker, TrackerState};

use crate::html::error_view;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
///
/// Failed calls to the Transactions API are not errors here: they are shown
/// to the user as a status message, see [ApiError].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested transaction is not in the current list.
    ///
    /// The client should reload the page to get the latest transactions.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A transaction type other than "income" or "expense" was submitted.
    #[error("\"{0}\" is not a valid transaction type")]
    InvalidTransactionType(String),

    /// Could not acquire the tracker state lock.
    #[error("could not acquire the tracker state lock")]
    StateLockError,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                error_view(
                    "Not Found",
                    "404",
                    "Transaction not found",
                    "It may have been deleted. Reload the page to see the latest transactions.",
                ),
            )
                .into_response(),
            Error::InvalidTransactionType(_) => {
                tracing::warn!("rejected bad request: {self}");
                (
                    StatusCode::BAD_REQUEST,
                    error_view("Bad Request", "400", "Invalid request", &self.to_string()),
                )
                    .into_response()
            }
            Error::StateLockError => {
                tracing::error!("An unexpected error occurred: {self}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_view(
                        "Internal Server Error",
                        "500",
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
                    .into_response()
            }
        }
    }
}
