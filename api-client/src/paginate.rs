//! Page-by-page traversal of list endpoints.
//!
//! List endpoints return one page of items per response and point at the
//! following page with a `Link` header entry carrying `rel="next"`, e.g.
//!
//! ```text
//! Link: <https://api.github.com/repositories/1/contributors?page=2>; rel="next",
//!       <https://api.github.com/repositories/1/contributors?page=5>; rel="last"
//! ```
//!
//! When a response carries no such entry the traversal is over.

use std::fmt;
use std::marker::PhantomData;

use futures::Stream;
use http::Uri;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::{ApiClient, Authentication};

/// Find the URL of the next page in the `Link` headers of a response.
pub fn next_link(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get_all(http::header::LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|entry| {
            let mut parts = entry.split(';');
            let target = parts.next()?.trim();
            let target = target.strip_prefix('<')?.strip_suffix('>')?;

            parts
                .filter_map(|param| param.trim().strip_prefix("rel="))
                .map(|rel| rel.trim_matches('"'))
                .any(|rel| rel.split_whitespace().any(|r| r == "next"))
                .then(|| target.to_owned())
        })
}

/// Sequential reader for a paginated list endpoint.
///
/// Each call to [Pages::next_page] requests one page and remembers where the
/// following page lives. A page is only requested once the previous one has
/// been decoded. After the last page, or after any failure, the fetcher is
/// exhausted and [Pages::has_next_page] stays `false`.
pub struct Pages<A, T> {
    client: ApiClient<A>,
    next: Option<Uri>,
    page: usize,
    item: PhantomData<fn() -> T>,
}

impl<A: fmt::Debug, T> fmt::Debug for Pages<A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pages")
            .field("client", &self.client)
            .field("next", &self.next.as_ref().map(Uri::path))
            .field("page", &self.page)
            .finish()
    }
}

impl<A, T> Pages<A, T> {
    /// Start a traversal at the first page of a list endpoint.
    pub fn new(client: ApiClient<A>, start: Uri) -> Self {
        Self {
            client,
            next: Some(start),
            page: 0,
            item: PhantomData,
        }
    }

    /// Whether another page can be requested.
    pub fn has_next_page(&self) -> bool {
        self.next.is_some()
    }

    /// Number of pages requested so far, including a failed request.
    pub fn page(&self) -> usize {
        self.page
    }
}

impl<A, T> Pages<A, T>
where
    A: Authentication + Send + Sync + 'static,
    T: DeserializeOwned,
{
    /// Request the next page and decode it as a JSON array of items.
    ///
    /// Returns an empty page if the traversal is already over.
    pub async fn next_page(&mut self) -> Result<Vec<T>, FetchError> {
        let Some(uri) = self.next.take() else {
            tracing::trace!("No more pages to request");
            return Ok(Vec::new());
        };

        self.page += 1;
        tracing::trace!(page = self.page, path = uri.path(), "Requesting page");

        let response = self.client.get_uri(uri).send().await?;
        let response = response.error_for_status().await?;

        let next = next_link(response.headers())
            .map(|link| link.parse::<Uri>())
            .transpose()?;
        let items: Vec<T> = response.json().await?;

        tracing::trace!(
            page = self.page,
            items = items.len(),
            last = next.is_none(),
            "Received page"
        );
        self.next = next;
        Ok(items)
    }

    /// Turn the traversal into a stream of pages.
    ///
    /// The stream ends after the last page, or after yielding the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<T>, FetchError>> {
        futures::stream::try_unfold(self, |mut pages| async move {
            if !pages.has_next_page() {
                return Ok(None);
            }
            let page = pages.next_page().await?;
            Ok(Some((page, pages)))
        })
    }
}
