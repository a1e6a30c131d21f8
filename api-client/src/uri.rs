//! URI utilities.

use camino::Utf8Path;
use http::Uri;
use thiserror::Error;
use url::Url;

/// Errors that can occur when rewriting a URI.
#[derive(Debug, Error)]
pub enum ParseUriError {
    /// The URI could not be understood as a URL (relative URIs land here).
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// The rewritten URL is not a valid URI.
    #[error("invalid URI: {0}")]
    Invalid(#[from] http::uri::InvalidUri),
}

/// Extension trait for URIs.
pub trait UriExtension {
    /// Join a path to a URI.
    ///
    /// Panics if the joined path is not a valid URI path; use
    /// [UriExtension::try_join] for paths from untrusted input.
    fn join<P: AsRef<str>>(self, path: P) -> Uri;

    /// Join a path to a URI, failing if the result is not a valid URI.
    fn try_join<P: AsRef<str>>(self, path: P) -> Result<Uri, http::uri::InvalidUri>;

    /// Set a query parameter in a URI, replacing any values already present
    /// for the same key. Other parameters keep their order.
    fn replace_query(self, key: &str, value: &str) -> Result<Uri, ParseUriError>;
}

impl UriExtension for Uri {
    fn join<P: AsRef<str>>(self, path: P) -> Uri {
        self.try_join(path).expect("joined path is a valid URI path")
    }

    fn try_join<P: AsRef<str>>(self, path: P) -> Result<Uri, http::uri::InvalidUri> {
        let mut parts = self.into_parts();

        parts.path_and_query = match parts.path_and_query.as_ref() {
            Some(pq) => {
                let joined = Utf8Path::new(pq.path()).join(path.as_ref());
                Some(http::uri::PathAndQuery::from_maybe_shared(joined.to_string())?)
            }
            None => None,
        };
        Ok(Uri::from_parts(parts).expect("URI parts come from a valid URI"))
    }

    fn replace_query(self, key: &str, value: &str) -> Result<Uri, ParseUriError> {
        let mut url = Url::parse(&self.to_string())?;

        let current = url
            .query_pairs()
            .filter(|(k, _)| k != key)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect::<Vec<_>>();

        {
            let mut query = url.query_pairs_mut();
            query.clear().extend_pairs(current).append_pair(key, value);
        }

        Ok(url.as_str().parse()?)
    }
}
