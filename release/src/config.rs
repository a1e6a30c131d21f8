//! Release configuration, read from a TOML file.
//!
//! ```toml
//! dry-run = true
//!
//! [github]
//! repository = "mockito/mockito"
//! contributors-file = "build/release-tools/contributors.json"
//!
//! [notes]
//! publication-repository = "https://bintray.com/mockito/maven/mockito"
//!
//! [notes.labels]
//! noteworthy = "Noteworthy"
//! bugfix = "Bugfixes"
//!
//! [version]
//! file = "version.properties"
//! ```
//!
//! The Github token is never part of the file; it is read from the
//! `GITHUB_READ_TOKEN` environment variable.

use std::io;

use api_client::Secret;
use camino::{Utf8Path, Utf8PathBuf};
use notes::{DefaultFormatter, LabelCaptions};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the read-only Github token.
pub const TOKEN_ENV: &str = "GITHUB_READ_TOKEN";

/// Errors loading the release configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Reading release configuration {path}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid.
    #[error("Parsing release configuration {path}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml_edit::de::Error,
    },
}

/// Settings for talking to Github.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GithubSettings {
    /// Repository as `owner/name`.
    pub repository: String,

    /// Where collected contributors are cached.
    #[serde(default = "default_contributors_file")]
    pub contributors_file: Utf8PathBuf,

    /// Do not query Github for contributors at all.
    #[serde(default)]
    pub skip_contributors: bool,
}

/// Settings for rendering release notes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NotesSettings {
    /// Where release binaries are published, shown in every section.
    #[serde(default)]
    pub publication_repository: String,

    /// Label to caption mapping, in priority order.
    #[serde(default)]
    pub labels: LabelCaptions,

    /// Title of the release notes document.
    #[serde(default = "default_title")]
    pub title: String,
}

/// Settings for the version file.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionSettings {
    /// Path of the version properties file.
    #[serde(default = "default_version_file")]
    pub file: Utf8PathBuf,
}

impl Default for VersionSettings {
    fn default() -> Self {
        Self {
            file: default_version_file(),
        }
    }
}

/// Everything a release run needs to know.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReleaseConfiguration {
    /// Report what would change without writing anything.
    #[serde(default)]
    pub dry_run: bool,

    /// Github settings.
    pub github: GithubSettings,

    /// Release notes settings.
    #[serde(default)]
    pub notes: NotesSettings,

    /// Version file settings.
    #[serde(default)]
    pub version: VersionSettings,
}

fn default_contributors_file() -> Utf8PathBuf {
    "build/release-tools/contributors.json".into()
}

fn default_version_file() -> Utf8PathBuf {
    "version.properties".into()
}

fn default_title() -> String {
    "Release notes".into()
}

impl ReleaseConfiguration {
    /// Parse a configuration document.
    pub fn from_toml(document: &str) -> Result<Self, toml_edit::de::Error> {
        toml_edit::de::from_str(document)
    }

    /// Read the configuration file at `path`.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let document = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        let config = Self::from_toml(&document).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        tracing::debug!(%path, repository = %config.github.repository, "Loaded release configuration");
        Ok(config)
    }

    /// Override the dry-run setting, e.g. from the command line.
    pub fn with_dry_run(mut self, dry_run: Option<bool>) -> Self {
        if let Some(dry_run) = dry_run {
            self.dry_run = dry_run;
        }
        self
    }

    /// The read-only Github token from the environment.
    pub fn token() -> Result<Secret, std::env::VarError> {
        Secret::from_env(TOKEN_ENV)
    }

    /// A release notes formatter for these settings.
    pub fn formatter(&self) -> DefaultFormatter {
        DefaultFormatter::new(
            self.notes.labels.clone(),
            self.notes.publication_repository.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn parse_full_configuration() {
        let config = ReleaseConfiguration::from_toml(indoc! {r#"
            dry-run = true

            [github]
            repository = "mockito/mockito"
            contributors-file = "out/contributors.json"
            skip-contributors = true

            [notes]
            publication-repository = "https://bintray.com/mockito/maven/mockito"
            title = "Mockito release notes"

            [notes.labels]
            noteworthy = "Noteworthy"
            bugfix = "Bugfixes"
            enhancement = "Enhancements"

            [version]
            file = "gradle/version.properties"
        "#})
        .unwrap();

        assert!(config.dry_run);
        assert_eq!(config.github.repository, "mockito/mockito");
        assert_eq!(config.github.contributors_file, "out/contributors.json");
        assert!(config.github.skip_contributors);
        assert_eq!(config.notes.title, "Mockito release notes");
        assert_eq!(config.version.file, "gradle/version.properties");

        let labels: Vec<_> = config
            .notes
            .labels
            .iter()
            .map(|entry| entry.label.as_str())
            .collect();
        assert_eq!(labels, vec!["noteworthy", "bugfix", "enhancement"]);
    }

    #[test]
    fn defaults() {
        let config = ReleaseConfiguration::from_toml(indoc! {r#"
            [github]
            repository = "mockito/mockito"
        "#})
        .unwrap();

        assert!(!config.dry_run);
        assert!(!config.github.skip_contributors);
        assert_eq!(
            config.github.contributors_file,
            "build/release-tools/contributors.json"
        );
        assert_eq!(config.version.file, "version.properties");
        assert!(config.notes.labels.is_empty());
        assert_eq!(config.notes.title, "Release notes");
    }

    #[test]
    fn repository_is_required() {
        assert!(ReleaseConfiguration::from_toml("[github]\n").is_err());
    }

    #[test]
    fn command_line_overrides_dry_run() {
        let config = ReleaseConfiguration::from_toml("dry-run = true\n[github]\nrepository = \"a/b\"\n")
            .unwrap();

        assert!(config.clone().with_dry_run(None).dry_run);
        assert!(!config.with_dry_run(Some(false)).dry_run);
    }

    #[test]
    fn load_names_missing_file() {
        let error = ReleaseConfiguration::load(Utf8Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(error, ConfigError::Read { .. }));
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
