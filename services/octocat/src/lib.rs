//! Github API client for collecting the contributors of a project.
//!
//! The client authenticates with a read-only token passed as the
//! `access_token` query parameter. [GithubClient::fetch_all_contributors]
//! walks the paginated contributors list, resolving each entry's profile,
//! and [fetch_to_file] caches the result for later builds.

use std::io;

use api_client::{AccessToken, ApiClient, FetchError, Secret};
use camino::Utf8PathBuf;
use http::header;
use http::{HeaderName, HeaderValue, Uri};
use hyperdriver::client::conn::transport::tcp::TcpTransportConfig;
use hyperdriver::Client;
use thiserror::Error;

mod contributors;
pub mod models;
mod store;

pub use crate::contributors::ContributorsFetch;
pub use crate::store::{fetch_to_file, read_contributors, write_contributors, FileFetch, Skipped};

const CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);
const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const GITHUB_API_VERSION_HEADER: &str = "x-github-api-version";
const GITHUB_BASE: &str = "https://api.github.com/";
const USER_AGENT: &str = "release-notes-octocat/0.9.0";

/// Errors that can occur when using the Github client.
#[derive(Debug, Error)]
pub enum Error {
    /// A request to the Github API failed.
    #[error("Github API: {0}")]
    Fetch(#[from] FetchError),

    /// The contributors file could not be read or written.
    #[error("Contributors file {path}: {source}")]
    Io {
        /// Path of the contributors file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The contributors file is not valid JSON.
    #[error("Contributors file {path}: {source}")]
    Serde {
        /// Path of the contributors file.
        path: Utf8PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
}

/// A client for the Github REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: ApiClient<AccessToken>,
}

impl GithubClient {
    /// Create a client for api.github.com authenticating with `token`.
    pub fn new<T: Into<Secret>>(token: T) -> Self {
        let mut tcp = TcpTransportConfig::default();
        tcp.connect_timeout = Some(CONNECT_TIMEOUT);

        let client = Client::builder()
            .layer(
                tower_http::set_header::SetRequestHeaderLayer::if_not_present(
                    header::ACCEPT,
                    HeaderValue::from_static(GITHUB_ACCEPT),
                ),
            )
            .layer(
                tower_http::set_header::SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static(GITHUB_API_VERSION_HEADER),
                    HeaderValue::from_static(GITHUB_API_VERSION),
                ),
            )
            .with_tcp(tcp)
            .with_auto_http()
            .with_user_agent(USER_AGENT.to_owned())
            .with_timeout(TIMEOUT)
            .build_service();

        Self::with_service(Uri::from_static(GITHUB_BASE), token, client)
    }

    /// Create a client against another API base, sending requests through
    /// `service`. Used for Github Enterprise and for tests.
    pub fn with_service<T, S>(base: Uri, token: T, service: S) -> Self
    where
        T: Into<Secret>,
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
        Self {
            client: ApiClient::new_with_inner_service(base, AccessToken::new(token), service),
        }
    }

    /// The underlying API client.
    pub fn api(&self) -> &ApiClient<AccessToken> {
        &self.client
    }
}
