//! The endpoint URIs served by the tracker.
//!
//! For endpoints that take a parameter, e.g., '/tracker/transactions/{transaction_id}',
//! use [format_endpoint].

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::transaction::TransactionId;

/// Characters that are left as-is in a path segment, the RFC 3986 unreserved set.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// The tracker page.
pub const ROOT: &str = "/";
/// The route that stores edits to individual form fields.
pub const DRAFT: &str = "/tracker/draft";
/// The route that submits the form.
pub const SUBMIT: &str = "/tracker/submit";
/// The route that leaves editing mode.
pub const CANCEL_EDIT: &str = "/tracker/cancel";
/// The route that starts editing a transaction.
pub const EDIT_TRANSACTION: &str = "/tracker/transactions/{transaction_id}/edit";
/// The route that deletes a transaction.
pub const DELETE_TRANSACTION: &str = "/tracker/transactions/{transaction_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/tracker/transactions/{transaction_id}',
/// '{transaction_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter. `id` is percent-encoded so that text IDs stay
/// within one path segment.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: &TransactionId) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        utf8_percent_encode(&id.to_string(), PATH_SEGMENT),
        &endpoint_path[param_end..]
    )
}
