//! In-process transport for exercising API clients in tests.
//!
//! Responses are registered by path and query. The `access_token` query
//! parameter is ignored when matching, so registrations do not need to know
//! the token. Requests for unregistered resources get a `404 Not Found`.
//!
//! Enabled by the `mock` feature.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::response;

use crate::authentication::ACCESS_TOKEN_PARAMETER;

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: http::StatusCode,
    headers: http::HeaderMap,
    body: Vec<u8>,
}

impl MockResponse {
    /// Create a canned response.
    pub fn new(status: http::StatusCode, headers: http::HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

/// A tower service answering requests from a table of canned responses.
///
/// Clones share the log of received requests.
#[derive(Debug, Default, Clone)]
pub struct MockService {
    responses: HashMap<String, MockResponse>,
    requests: Arc<Mutex<Vec<http::Uri>>>,
}

impl MockService {
    /// Create a mock without any registered responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response for a path, optionally followed by a query string.
    pub fn add(
        &mut self,
        path: &str,
        status: http::StatusCode,
        headers: http::HeaderMap,
        body: Vec<u8>,
    ) {
        let response = MockResponse::new(status, headers, body);
        self.responses.insert(path.to_owned(), response);
    }

    /// Register a `200 OK` JSON response.
    pub fn add_json(&mut self, path: &str, body: &serde_json::Value) {
        self.add(
            path,
            http::StatusCode::OK,
            http::HeaderMap::new(),
            body.to_string().into_bytes(),
        );
    }

    /// Every URI requested so far, in order, as the transport saw them.
    pub fn requests(&self) -> Vec<http::Uri> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    fn lookup_key(uri: &http::Uri) -> String {
        let query = url::form_urlencoded::parse(uri.query().unwrap_or_default().as_bytes())
            .filter(|(key, _)| key != ACCESS_TOKEN_PARAMETER)
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>();

        if query.is_empty() {
            uri.path().to_owned()
        } else {
            format!("{}?{}", uri.path(), query.join("&"))
        }
    }
}

impl tower::Service<http::Request<hyperdriver::Body>> for MockService {
    type Response = http::Response<hyperdriver::Body>;
    type Error = hyperdriver::client::Error;
    type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<hyperdriver::Body>) -> Self::Future {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(req.uri().clone());
        }

        let key = Self::lookup_key(req.uri());
        let response = self.responses.get(&key).cloned().unwrap_or_else(|| {
            MockResponse::new(
                http::StatusCode::NOT_FOUND,
                http::HeaderMap::new(),
                format!("No response configured for {key}").into_bytes(),
            )
        });

        let mut builder = response::Builder::new()
            .status(response.status)
            .version(http::Version::HTTP_11);

        for (key, value) in response.headers.iter() {
            builder = builder.header(key, value);
        }

        let response = builder
            .body(hyperdriver::Body::from(Bytes::from(response.body)))
            .expect("canned response is valid");

        std::future::ready(Ok(response))
    }
}
