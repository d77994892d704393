//! The client side of the Transactions API.
//!
//! [TransactionsApi] is the seam between the tracker and the network so that
//! tests can swap in a fake. [HttpTransactionsApi] is the real implementation
//! that talks JSON over HTTP.

use std::future::Future;

use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;

use crate::transaction::{Draft, Transaction, TransactionId};

/// The default location of the Transactions API.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/transactions";

/// The ways a call to the Transactions API can fail.
///
/// The variants are closed so that callers building a message for the user
/// must handle each one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    ///
    /// `message` is the `message` field of the JSON error body, if there was one.
    #[error("server responded with {status}: {message:?}")]
    Server {
        /// The HTTP status code.
        status: u16,
        /// The error message provided by the server.
        message: Option<String>,
    },

    /// The request was sent but no response came back, e.g. the server is
    /// down or the connection was refused.
    #[error("no response from server: {0}")]
    NoResponse(String),

    /// The request could not be built or sent, e.g. the URL is malformed.
    #[error("could not set up request: {0}")]
    Setup(String),

    /// The server answered with a success status but the body was not the
    /// expected JSON.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),
}

/// The body the Transactions API sends with an error status.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// CRUD operations on the remote transaction collection.
pub trait TransactionsApi: Send + Sync + 'static {
    /// Fetch every transaction, in the order the server returns them.
    fn list(&self) -> impl Future<Output = Result<Vec<Transaction>, ApiError>> + Send;

    /// Create a transaction from `draft`.
    fn create(&self, draft: &Draft) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Replace the editable fields of the transaction `id` with `draft`.
    fn update(
        &self,
        id: &TransactionId,
        draft: &Draft,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete the transaction `id`.
    fn delete(&self, id: &TransactionId) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// A [TransactionsApi] that makes JSON requests with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransactionsApi {
    client: Client,
    base_url: Url,
}

impl HttpTransactionsApi {
    /// Create a client for the collection at `base_url`, e.g.
    /// [DEFAULT_API_URL].
    ///
    /// # Errors
    /// Returns [ApiError::Setup] if `base_url` is not a valid URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|error| ApiError::Setup(format!("invalid API URL \"{base_url}\": {error}")))?;

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// The URL of the transaction collection.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn item_url(&self, id: &TransactionId) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Setup(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(&id.to_string());

        Ok(url)
    }
}

impl TransactionsApi for HttpTransactionsApi {
    async fn list(&self) -> Result<Vec<Transaction>, ApiError> {
        tracing::debug!("GET {}", self.base_url);
        let response = self
            .client
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(classify_request_error)?;
        let response = check_status(response).await?;

        response.json().await.map_err(|error| {
            tracing::error!("could not decode transaction list: {error}");
            ApiError::InvalidResponse(error.to_string())
        })
    }

    async fn create(&self, draft: &Draft) -> Result<(), ApiError> {
        tracing::debug!("POST {} {draft:?}", self.base_url);
        let response = self
            .client
            .post(self.base_url.clone())
            .json(draft)
            .send()
            .await
            .map_err(classify_request_error)?;
        check_status(response).await?;

        Ok(())
    }

    async fn update(&self, id: &TransactionId, draft: &Draft) -> Result<(), ApiError> {
        let url = self.item_url(id)?;
        tracing::debug!("PUT {url} {draft:?}");
        let response = self
            .client
            .put(url)
            .json(draft)
            .send()
            .await
            .map_err(classify_request_error)?;
        check_status(response).await?;

        Ok(())
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), ApiError> {
        let url = self.item_url(id)?;
        tracing::debug!("DELETE {url}");
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(classify_request_error)?;
        check_status(response).await?;

        Ok(())
    }
}

/// Sort a `reqwest` error from sending a request into [ApiError::NoResponse]
/// or [ApiError::Setup].
fn classify_request_error(error: reqwest::Error) -> ApiError {
    if error.is_builder() {
        ApiError::Setup(error.to_string())
    } else if let Some(status) = error.status() {
        ApiError::Server {
            status: status.as_u16(),
            message: None,
        }
    } else {
        ApiError::NoResponse(error.to_string())
    }
}

/// Turn a non-success response into [ApiError::Server], reading the optional
/// `message` field from the JSON body.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = match response.text().await {
        Ok(body) => parse_error_message(&body),
        Err(error) => {
            tracing::warn!("could not read error body for {status}: {error}");
            None
        }
    };

    Err(server_error(status, message))
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message)
        .filter(|message| !message.is_empty())
}

fn server_error(status: StatusCode, message: Option<String>) -> ApiError {
    ApiError::Server {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use crate::transaction::TransactionId;

    use super::{ApiError, HttpTransactionsApi, parse_error_message};

    #[test]
    fn parses_message_from_error_body() {
        assert_eq!(
            Some("Invalid amount".to_owned()),
            parse_error_message(r#"{"message":"Invalid amount"}"#)
        );
    }

    #[test]
    fn error_body_without_message_gives_none() {
        assert_eq!(None, parse_error_message(r#"{"error":"nope"}"#));
        assert_eq!(None, parse_error_message("<h1>Bad Gateway</h1>"));
        assert_eq!(None, parse_error_message(r#"{"message":""}"#));
    }

    #[test]
    fn item_url_appends_id() {
        let api = HttpTransactionsApi::new("http://localhost:8080/api/transactions").unwrap();

        let got = api.item_url(&TransactionId::Number(12)).unwrap();

        assert_eq!("http://localhost:8080/api/transactions/12", got.as_str());
    }

    #[test]
    fn item_url_handles_trailing_slash_and_escapes_text_ids() {
        let api = HttpTransactionsApi::new("http://localhost:8080/api/transactions/").unwrap();

        let got = api
            .item_url(&TransactionId::Text("a b".to_owned()))
            .unwrap();

        assert_eq!("http://localhost:8080/api/transactions/a%20b", got.as_str());
    }

    #[test]
    fn new_rejects_invalid_url() {
        let got = HttpTransactionsApi::new("not a url");

        assert!(
            matches!(got, Err(ApiError::Setup(_))),
            "want setup error, got {got:?}"
        );
    }
}
