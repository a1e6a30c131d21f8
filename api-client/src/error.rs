//! Error types for API Clients
use std::fmt;

use http::StatusCode;
use thiserror::Error;

use crate::response::Response;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failure while talking to a remote API.
///
/// Covers every stage of a request: building it, sending it, the status of
/// the response, reading the body and decoding it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be assembled
    #[error("building request: {0}")]
    Http(#[from] http::Error),

    /// An error occured while sending the request
    #[error("sending request: {0}")]
    Request(#[from] hyperdriver::client::Error),

    /// The server answered with a non-success status
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// An error occured while recieving the response body
    #[error("reading response body: {0}")]
    Body(#[source] BoxError),

    /// The response body was not the expected JSON document
    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A URI handed out by the server (or by the caller) is not valid
    #[error("invalid URI: {0}")]
    Uri(#[from] http::uri::InvalidUri),
}

/// A server returned an error response
#[derive(Debug, Clone)]
pub struct HttpResponseError {
    /// The HTTP status code of the response
    pub status: StatusCode,

    /// The path of the request which failed. Query parameters are left out
    /// since they may carry credentials.
    pub path: String,

    /// The message body of the response
    pub message: String,
}

impl HttpResponseError {
    /// Create a new HTTP response error from a response
    pub async fn from_response(response: Response) -> Self {
        let status = response.status();
        let path = response.uri().path().to_owned();
        let message = response
            .text()
            .await
            .unwrap_or_else(|err| format!("Failed to read response body: {}", err));

        Self {
            status,
            path,
            message,
        }
    }
}

impl fmt::Display for HttpResponseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "HTTP {} response from {}: {}",
            self.status, self.path, self.message
        )
    }
}

impl std::error::Error for HttpResponseError {}
