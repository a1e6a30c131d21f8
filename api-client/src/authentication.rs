//! Authentication for API clients.
//!
//! The `Authentication` trait is used to authenticate with an API queried via the `ApiClient`.
//!
//! Two implementations are provided:
//! - `AccessToken` for a token passed as the `access_token` query parameter
//! - `()` for no authentication

use std::sync::Arc;

use tower::layer::Layer;

use crate::secret::Secret;
use crate::uri::UriExtension as _;

/// Query parameter which carries the access token.
pub const ACCESS_TOKEN_PARAMETER: &str = "access_token";

/// Trait to represent authenticating with an API queried via the `ApiClient`.
pub trait Authentication: Clone {
    /// Called by the `ApiClient` to implement authorization.
    fn authenticate<B>(&self, req: http::Request<B>) -> http::Request<B>;
}

/// Authentication with a read-only token attached to every request URI as
/// the `access_token` query parameter.
///
/// This covers URIs the client never built itself, such as the next page
/// links and detail URLs handed out by the server.
///
/// # Example
/// ```rust
/// use api_client::{AccessToken, Authentication};
///
/// let auth = AccessToken::new("my-secret");
/// let req = http::Request::get("https://api.github.com/users/alice")
///     .body(())
///     .unwrap();
/// let req = auth.authenticate(req);
///
/// assert_eq!(req.uri().query(), Some("access_token=my-secret"));
/// ```
#[derive(Debug, Clone)]
pub struct AccessToken(Secret);

impl AccessToken {
    /// Create a new access token authentication.
    pub fn new<K: Into<Secret>>(token: K) -> Self {
        AccessToken(token.into())
    }
}

impl Authentication for AccessToken {
    fn authenticate<B>(&self, mut req: http::Request<B>) -> http::Request<B> {
        if self.0.is_empty() {
            tracing::trace!("No access token configured, sending anonymous request");
            return req;
        }

        match req
            .uri()
            .clone()
            .replace_query(ACCESS_TOKEN_PARAMETER, self.0.revealed())
        {
            Ok(uri) => *req.uri_mut() = uri,
            Err(error) => {
                tracing::warn!(path = req.uri().path(), "Unable to attach access token: {error}");
            }
        }
        req
    }
}

impl Authentication for () {
    fn authenticate<B>(&self, req: http::Request<B>) -> http::Request<B> {
        req
    }
}

/// A layer which authenticates every request passing through it.
#[derive(Debug)]
pub struct AuthenticationLayer<A> {
    auth: Arc<A>,
}

impl<A> Clone for AuthenticationLayer<A> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
        }
    }
}

impl<A> AuthenticationLayer<A> {
    pub(crate) fn new(auth: Arc<A>) -> Self {
        Self { auth }
    }
}

impl<A, S> Layer<S> for AuthenticationLayer<A> {
    type Service = AuthenticationService<A, S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthenticationService::new(inner, self.auth.clone())
    }
}

/// A service which authenticates every request before handing it on.
#[derive(Debug)]
pub struct AuthenticationService<A, S> {
    inner: S,
    auth: Arc<A>,
}

impl<A, S: Clone> Clone for AuthenticationService<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            auth: self.auth.clone(),
        }
    }
}

impl<A, S> AuthenticationService<A, S> {
    pub(crate) fn new(inner: S, auth: Arc<A>) -> Self {
        Self { inner, auth }
    }
}

impl<A, S, BIn, BOut> tower::Service<http::Request<BIn>> for AuthenticationService<A, S>
where
    A: Authentication,
    S: tower::Service<http::Request<BIn>, Response = http::Response<BOut>>,
    S::Future: Send + 'static,
{
    type Response = http::Response<BOut>;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<BIn>) -> Self::Future {
        let req = self.auth.authenticate(req);
        self.inner.call(req)
    }
}
