//! A small client for JSON APIs over HTTP / HTTPS.
//!
//! [ApiClient] wraps a `hyperdriver` client with an [Authentication] layer.
//! On top of it sit two ways to read resources: [ApiClient::fetch] for a
//! single JSON object, and [Pages] for list endpoints which paginate with
//! `Link` headers.

use std::marker::PhantomData;
use std::sync::Arc;

use http::Method;
use http::Uri;
use hyperdriver::service::SharedService;
use serde::de::DeserializeOwned;
use tower::ServiceExt;

mod authentication;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod paginate;
pub mod request;
pub mod response;
mod secret;
pub mod uri;

pub use self::authentication::{
    AccessToken, Authentication, AuthenticationLayer, AuthenticationService,
    ACCESS_TOKEN_PARAMETER,
};
pub use self::error::{FetchError, HttpResponseError};
pub use self::paginate::{next_link, Pages};
pub use self::request::RequestBuilder;
use self::request::request_parts;
use self::response::Response;
pub use self::secret::Secret;
use self::uri::UriExtension as _;

/// A client for accessing APIs over HTTP / HTTPS
///
/// Useful inner object to wrap for individual API clients.
#[derive(Debug, Clone)]
pub struct ApiClient<A> {
    base: Uri,
    inner: hyperdriver::client::SharedClientService<hyperdriver::Body, hyperdriver::Body>,
    authentication: PhantomData<A>,
}

impl<A> ApiClient<A>
where
    A: Authentication + Send + Sync + 'static,
{
    /// Create a new API Client from a base URL and an authentication method
    pub fn new(base: Uri, authentication: A) -> Self {
        let authentication = Arc::new(authentication);
        let inner = hyperdriver::Client::build_tcp_http()
            .with_default_tls()
            .layer(AuthenticationLayer::new(authentication))
            .build_service();

        ApiClient {
            base,
            inner,
            authentication: PhantomData,
        }
    }

    /// Create a new API Client which sends requests through `inner`.
    ///
    /// Used to add extra layers (default headers, timeouts) or to swap the
    /// transport for a mock service in tests.
    pub fn new_with_inner_service<S>(base: Uri, authentication: A, inner: S) -> Self
    where
        S: tower::Service<
                http::Request<hyperdriver::Body>,
                Response = http::Response<hyperdriver::Body>,
                Error = hyperdriver::client::Error,
            > + Clone
            + Send
            + Sync
            + 'static,
        S::Future: Send + 'static,
    {
        let authentication = Arc::new(authentication);

        let service = tower::ServiceBuilder::new()
            .layer(SharedService::layer())
            .layer(AuthenticationLayer::new(authentication))
            .service(inner);

        ApiClient {
            base,
            inner: service,
            authentication: PhantomData,
        }
    }
}

impl<A> ApiClient<A>
where
    A: Authentication,
{
    /// Resolve an endpoint path against the base URL.
    pub fn endpoint(&self, endpoint: &str) -> Uri {
        self.base.clone().join(endpoint)
    }

    /// Resolve an endpoint path built from untrusted input against the base URL.
    pub fn try_endpoint(&self, endpoint: &str) -> Result<Uri, FetchError> {
        Ok(self.base.clone().try_join(endpoint)?)
    }

    /// Build a GET request against an endpoint relative to the base URL.
    pub fn get(&self, endpoint: &str) -> RequestBuilder<A> {
        self.get_uri(self.endpoint(endpoint))
    }

    /// Build a GET request against an absolute URI.
    pub fn get_uri(&self, uri: Uri) -> RequestBuilder<A> {
        RequestBuilder::new(self.clone(), uri, Method::GET)
    }

    /// Send a request through the authenticated transport.
    pub async fn execute(&self, req: http::Request<hyperdriver::Body>) -> Result<Response, FetchError> {
        let parts = request_parts(&req);

        let response = self.inner.clone().oneshot(req).await?;
        Ok(Response::new(parts, response))
    }
}

impl<A> ApiClient<A>
where
    A: Authentication + Send + Sync + 'static,
{
    /// Fetch a single JSON resource.
    ///
    /// Any transport failure, non-success status or undecodable body is
    /// reported as a [FetchError].
    pub async fn fetch<T>(&self, uri: Uri) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        tracing::trace!(path = uri.path(), "Fetching object");
        let response = self.get_uri(uri).send().await?;
        let response = response.error_for_status().await?;
        response.json().await
    }

    /// Walk a paginated list endpoint, starting at `start`.
    pub fn pages<T>(&self, start: Uri) -> Pages<A, T> {
        Pages::new(self.clone(), start)
    }
}
