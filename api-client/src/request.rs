//! Request building and sending.

use http::{header::HeaderValue, HeaderName, Uri};

use crate::error::FetchError;
use crate::{response::Response, ApiClient, Authentication};

/// Copy the method, URI and headers of a request, leaving the body behind.
pub(crate) fn request_parts<B>(req: &http::Request<B>) -> http::request::Parts {
    let mut builder = http::Request::builder()
        .uri(req.uri().clone())
        .method(req.method().clone());

    if let Some(headers) = builder.headers_mut() {
        *headers = req.headers().clone();
    }

    let (parts, _) = builder
        .body(())
        .expect("parts copied from a valid request")
        .into_parts();
    parts
}

/// Builder for a single request against an [ApiClient].
#[derive(Debug)]
pub struct RequestBuilder<A> {
    req: http::request::Builder,
    client: ApiClient<A>,
}

impl<A> RequestBuilder<A> {
    /// Start a request for `uri` with the given method.
    pub fn new(client: ApiClient<A>, uri: Uri, method: http::Method) -> Self {
        Self {
            req: http::Request::builder().method(method).uri(uri),
            client,
        }
    }

    /// Add a header to the request.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.req = self.req.header(key, value);
        self
    }

    /// Send the request and wait for the response head.
    pub async fn send(self) -> Result<Response, FetchError>
    where
        A: Authentication,
    {
        let req = self.req.body(hyperdriver::Body::empty())?;
        self.client.execute(req).await
    }
}
