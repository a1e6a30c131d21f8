//! Contributors cache file.
//!
//! Collecting all contributors of a large project costs one request per
//! contributor, so the result is written to a JSON file and reused by later
//! builds for as long as the file exists.

use camino::Utf8Path;
use notes::ContributorSet;

use crate::{ContributorsFetch, Error, GithubClient};

/// Why [fetch_to_file] did not query the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skipped {
    /// Fetching is switched off in the configuration.
    Disabled,
    /// The contributors file is already there.
    Exists,
}

/// Outcome of [fetch_to_file].
#[derive(Debug)]
pub enum FileFetch {
    /// The API was not queried and the file was left alone.
    Skipped(Skipped),
    /// Contributors were collected and written, possibly only partially.
    Written(ContributorsFetch),
}

/// Read a contributors file.
pub async fn read_contributors(path: &Utf8Path) -> Result<ContributorSet, Error> {
    let content = tokio::fs::read(path).await.map_err(|source| Error::Io {
        path: path.to_owned(),
        source,
    })?;

    serde_json::from_slice(&content).map_err(|source| Error::Serde {
        path: path.to_owned(),
        source,
    })
}

/// Write a contributors file, creating missing parent directories.
pub async fn write_contributors(path: &Utf8Path, contributors: &ContributorSet) -> Result<(), Error> {
    let io_error = |source| Error::Io {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let content = serde_json::to_vec_pretty(contributors).map_err(|source| Error::Serde {
        path: path.to_owned(),
        source,
    })?;

    tokio::fs::write(path, content).await.map_err(io_error)?;
    tracing::debug!(%path, contributors = contributors.len(), "Wrote contributors file");
    Ok(())
}

/// Collect every contributor of `repository` into the file at `path`.
///
/// Nothing is fetched when `skip` is set or when the file already exists.
/// A partial collection is still written; the returned fetch carries the
/// error that cut it short.
pub async fn fetch_to_file(
    client: &GithubClient,
    repository: &str,
    path: &Utf8Path,
    skip: bool,
) -> Result<FileFetch, Error> {
    if skip {
        tracing::info!("Fetching all contributors for project SKIPPED (disabled in configuration)");
        return Ok(FileFetch::Skipped(Skipped::Disabled));
    }

    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
    if exists {
        tracing::info!(%path, "Fetching all contributors for project SKIPPED (output file exists)");
        return Ok(FileFetch::Skipped(Skipped::Exists));
    }

    tracing::info!(%path, "Fetching all contributors for project");
    let fetch = client.fetch_all_contributors(repository).await;
    write_contributors(path, &fetch.contributors).await?;
    Ok(FileFetch::Written(fetch))
}

#[cfg(test)]
mod tests {
    use api_client::mock::MockService;
    use api_client::FetchError;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use camino::Utf8PathBuf;
    use notes::Contributor;
    use serde_json::json;

    use super::*;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
    }

    #[tokio::test]
    async fn contributors_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "nested/contributors.json");

        let contributors: ContributorSet = vec![
            Contributor::new("Alice A", "https://github.com/alice").with_login("alice"),
            Contributor::new("bob", "https://github.com/bob"),
        ]
        .into();

        write_contributors(&path, &contributors).await.unwrap();
        let back = read_contributors(&path).await.unwrap();

        assert_eq!(back.len(), 2);
        assert_eq!(
            back.find_by_author_name("Alice A").unwrap().login(),
            Some("alice")
        );
    }

    #[tokio::test]
    async fn unreadable_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "contributors.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let error = read_contributors(&path).await.unwrap_err();
        assert!(matches!(error, Error::Serde { .. }));
        assert!(error.to_string().contains("contributors.json"));
    }

    #[tokio::test]
    async fn skipped_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "contributors.json");
        let mock = MockService::new();
        let client = GithubClient::with_service("http://github.test/".parse().unwrap(), "tok", mock.clone());

        let outcome = fetch_to_file(&client, "mockito/mockito", &path, true)
            .await
            .unwrap();

        assert!(matches!(outcome, FileFetch::Skipped(Skipped::Disabled)));
        assert!(mock.requests().is_empty());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn skipped_when_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "contributors.json");
        tokio::fs::write(&path, b"[]").await.unwrap();
        let mock = MockService::new();
        let client = GithubClient::with_service("http://github.test/".parse().unwrap(), "tok", mock.clone());

        let outcome = fetch_to_file(&client, "mockito/mockito", &path, false)
            .await
            .unwrap();

        assert!(matches!(outcome, FileFetch::Skipped(Skipped::Exists)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn writes_fetched_contributors() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "build/contributors.json");

        let mut mock = MockService::new();
        mock.add_json(
            "/repos/mockito/mockito/contributors",
            &json!([{
                "login": "alice",
                "url": "http://github.test/users/alice",
                "contributions": 5
            }]),
        );
        mock.add_json(
            "/users/alice",
            &json!({"login": "alice", "name": "Alice A", "html_url": "https://github.com/alice"}),
        );
        let client = GithubClient::with_service("http://github.test/".parse().unwrap(), "tok", mock);

        let outcome = fetch_to_file(&client, "mockito/mockito", &path, false)
            .await
            .unwrap();

        match outcome {
            FileFetch::Written(fetch) => assert!(fetch.is_complete()),
            other => panic!("unexpected outcome: {other:?}"),
        }

        let written = read_contributors(&path).await.unwrap();
        assert_eq!(
            written.find_by_author_name("Alice A").unwrap().contributions(),
            5
        );
    }

    #[tokio::test]
    async fn writes_partial_contributors() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "contributors.json");

        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::LINK,
            HeaderValue::from_static("<http://github.test/repositories/1/contributors?page=2>; rel=\"next\""),
        );
        let mut mock = MockService::new();
        mock.add(
            "/repos/mockito/mockito/contributors",
            StatusCode::OK,
            headers,
            serde_json::to_vec(&json!([{
                "login": "alice",
                "url": "http://github.test/users/alice",
                "contributions": 5
            }]))
            .unwrap(),
        );
        mock.add(
            "/repositories/1/contributors?page=2",
            StatusCode::INTERNAL_SERVER_ERROR,
            HeaderMap::new(),
            b"boom".to_vec(),
        );
        mock.add_json(
            "/users/alice",
            &json!({"login": "alice", "name": "Alice A", "html_url": "https://github.com/alice"}),
        );
        let client = GithubClient::with_service("http://github.test/".parse().unwrap(), "tok", mock);

        let outcome = fetch_to_file(&client, "mockito/mockito", &path, false)
            .await
            .unwrap();

        match outcome {
            FileFetch::Written(fetch) => {
                assert!(matches!(fetch.error, Some(FetchError::Response(_))));
                assert_eq!(fetch.contributors.len(), 1);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let written = read_contributors(&path).await.unwrap();
        assert_eq!(written.len(), 1);
        assert!(written.find_by_author_name("Alice A").is_some());
    }
}
