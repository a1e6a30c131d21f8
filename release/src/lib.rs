//! Release tooling: contributor collection, release notes and version bumps,
//! driven by a [ReleaseConfiguration].

use camino::{Utf8Path, Utf8PathBuf};
use notes::{ContributorSet, ReleaseNotesData};
use thiserror::Error;
use versioning::{VersionError, VersionInfo};

pub mod config;

pub use crate::config::{ConfigError, ReleaseConfiguration, TOKEN_ENV};

/// Errors from release tasks.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A release data file could not be read.
    #[error("Reading release data {path}")]
    Read {
        /// Path of the release data file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A release data file is not valid JSON.
    #[error("Decoding release data {path}")]
    Decode {
        /// Path of the release data file.
        path: Utf8PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// The contributors cache could not be used.
    #[error(transparent)]
    Contributors(#[from] octocat::Error),

    /// The version file could not be read or updated.
    #[error(transparent)]
    Version(#[from] VersionError),
}

/// Read release records from a JSON array, newest first.
pub async fn read_releases(path: &Utf8Path) -> Result<Vec<ReleaseNotesData>, ReleaseError> {
    let content = tokio::fs::read(path).await.map_err(|source| ReleaseError::Read {
        path: path.to_owned(),
        source,
    })?;

    serde_json::from_slice(&content).map_err(|source| ReleaseError::Decode {
        path: path.to_owned(),
        source,
    })
}

/// Contributors from the cache file, or none when it was never written.
pub async fn cached_contributors(path: &Utf8Path) -> Result<ContributorSet, ReleaseError> {
    let exists = tokio::fs::try_exists(path)
        .await
        .map_err(|source| ReleaseError::Read {
            path: path.to_owned(),
            source,
        })?;

    if !exists {
        tracing::debug!(%path, "No contributors file, profiles come from release data only");
        return Ok(ContributorSet::new());
    }

    Ok(octocat::read_contributors(path).await?)
}

/// Render the release notes document for the releases in `releases_path`.
///
/// Contributors cached by an earlier collection fill in profiles the
/// release records do not carry.
pub async fn render_notes(
    config: &ReleaseConfiguration,
    releases_path: &Utf8Path,
) -> Result<String, ReleaseError> {
    let releases = read_releases(releases_path).await?;
    let contributors = cached_contributors(&config.github.contributors_file).await?;
    tracing::info!(
        releases = releases.len(),
        contributors = contributors.len(),
        "Rendering release notes"
    );

    let releases: Vec<_> = releases
        .into_iter()
        .map(|release| release.with_contributors(contributors.clone()))
        .collect();

    Ok(config
        .formatter()
        .format_notes(&config.notes.title, &releases))
}

/// Result of a version bump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bump {
    /// Version before the bump.
    pub previous: String,
    /// Version after the bump.
    pub next: String,
    /// Whether the previous version was recorded as notable.
    pub notable: bool,
    /// Whether the version file was changed.
    pub written: bool,
}

/// Bump the version in the configured version file.
///
/// `notable` defaults to whether the current version is a notable release.
/// In dry-run mode the new version is computed but the file is left alone.
pub fn bump_version(
    config: &ReleaseConfiguration,
    notable: Option<bool>,
) -> Result<Bump, ReleaseError> {
    let info = VersionInfo::load(&config.version.file)?;
    let notable = notable.unwrap_or_else(|| info.is_notable_release());

    if config.dry_run {
        let next = versioning::increment_version(info.version())?;
        tracing::info!(
            previous = info.version(),
            %next,
            notable,
            "Dry run, not writing {}",
            info.path()
        );
        return Ok(Bump {
            previous: info.version().to_owned(),
            next,
            notable,
            written: false,
        });
    }

    let bumped = info.bump(notable)?;
    Ok(Bump {
        previous: info.version().to_owned(),
        next: bumped.version().to_owned(),
        notable,
        written: true,
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    fn config(dir: &tempfile::TempDir) -> ReleaseConfiguration {
        let root = Utf8PathBuf::from_path_buf(dir.path().to_owned()).unwrap();
        let document = format!(
            indoc! {r#"
                [github]
                repository = "mockito/mockito"
                contributors-file = "{root}/contributors.json"

                [notes]
                publication-repository = "https://repo.test/mockito"
                title = "Notes"

                [notes.labels]
                bugfix = "Bugfixes"

                [version]
                file = "{root}/version.properties"
            "#},
            root = root
        );
        ReleaseConfiguration::from_toml(&document).unwrap()
    }

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    const RELEASES: &str = indoc! {r#"
        [{
            "version": "2.0.1",
            "date": "2017-01-05T10:30:00Z",
            "contributions": [{"author": "Alice A", "commits": ["a1", "a2"]}],
            "improvements": [
                {"id": 7, "title": "Fix NPE", "url": "https://x/7", "labels": ["bugfix"]}
            ]
        }]
    "#};

    #[tokio::test]
    async fn render_notes_uses_cached_contributors() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let releases = write(&dir, "releases.json", RELEASES);
        write(
            &dir,
            "contributors.json",
            r#"[{"name": "Alice A", "profile_url": "https://github.com/alice"}]"#,
        );

        let notes = render_notes(&config, &releases).await.unwrap();

        assert!(notes.starts_with("# Notes\n\n### 2.0.1 (2017-01-05 10:30 UTC)\n\n"));
        assert!(notes.contains("published to: https://repo.test/mockito"));
        assert!(notes.contains("[Alice A](https://github.com/alice)"));
        assert!(notes.contains("Fix NPE [(#7)](https://x/7)"));
    }

    #[tokio::test]
    async fn render_notes_without_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        let releases = write(&dir, "releases.json", RELEASES);

        let notes = render_notes(&config, &releases).await.unwrap();
        assert!(notes.contains("  * 2: Alice A"));
    }

    #[tokio::test]
    async fn invalid_release_data_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let releases = write(&dir, "releases.json", "{");

        let error = read_releases(&releases).await.unwrap_err();
        assert!(matches!(error, ReleaseError::Decode { .. }));
        assert!(error.to_string().contains("releases.json"));
    }

    #[test]
    fn bump_writes_version_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir);
        write(&dir, "version.properties", "version=2.0.0\n");

        let bump = bump_version(&config, None).unwrap();
        assert_eq!(
            bump,
            Bump {
                previous: "2.0.0".into(),
                next: "2.0.1".into(),
                notable: true,
                written: true,
            }
        );

        let info = VersionInfo::load(&config.version.file).unwrap();
        assert_eq!(info.version(), "2.0.1");
        assert_eq!(info.notable_versions(), ["2.0.0"]);
    }

    #[test]
    fn dry_run_leaves_version_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir).with_dry_run(Some(true));
        write(&dir, "version.properties", "version=2.0.1\n");

        let bump = bump_version(&config, Some(true)).unwrap();
        assert_eq!(bump.next, "2.0.2");
        assert!(bump.notable);
        assert!(!bump.written);

        let content = std::fs::read_to_string(&config.version.file).unwrap();
        assert_eq!(content, "version=2.0.1\n");
    }
}
