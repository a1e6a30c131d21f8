//! Version bookkeeping for releases.
//!
//! The current version lives in a properties file next to the project:
//!
//! ```text
//! version=1.2.3
//!
//! notableVersions=1.2.0, 1.0.0
//! ```
//!
//! [VersionInfo::load] reads it, [VersionInfo::bump] moves it to the next
//! version once a release is done, optionally recording the released version
//! as notable.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

mod document;

use crate::document::{Key, PropertiesFile};

/// Errors reading or updating the version file.
#[derive(Debug, Error)]
pub enum VersionError {
    /// The version file could not be read.
    #[error("Problems reading version file: {path}")]
    Read {
        /// Path of the version file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The version file has no `version=` entry.
    #[error("Missing 'version=' property in file: {path}")]
    MissingVersion {
        /// Path of the version file.
        path: Utf8PathBuf,
    },

    /// The version is not made of dot separated numbers.
    #[error("Unsupported version: '{version}'. Only dot separated numbers like '1.10.3' are supported")]
    InvalidVersion {
        /// The offending version.
        version: String,
    },

    /// The updated version file could not be written.
    #[error("Problems writing version file: {path}")]
    Write {
        /// Path of the version file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Compute the version following `version` by incrementing its last
/// component: `1.2.3` becomes `1.2.4`, `5.3.9` becomes `5.3.10`.
pub fn increment_version(version: &str) -> Result<String, VersionError> {
    let invalid = || VersionError::InvalidVersion {
        version: version.to_owned(),
    };

    let components: Vec<&str> = version.split('.').collect();
    if components
        .iter()
        .any(|c| c.is_empty() || !c.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(invalid());
    }

    let (last, leading) = components.split_last().ok_or_else(invalid)?;
    let last = last
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(invalid)?;

    let mut next: Vec<String> = leading.iter().map(|c| c.to_string()).collect();
    next.push(last.to_string());
    Ok(next.join("."))
}

/// Whether `version` starts a new minor or major line, i.e. ends in `.0`
/// (which includes `.0.0`).
pub fn is_notable(version: &str) -> bool {
    version.ends_with(".0")
}

fn read(path: &Utf8Path) -> Result<String, VersionError> {
    std::fs::read_to_string(path).map_err(|source| VersionError::Read {
        path: path.to_owned(),
        source,
    })
}

/// The version file and the state read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    path: Utf8PathBuf,
    version: String,
    notable_versions: Vec<String>,
}

impl VersionInfo {
    /// Read the version file at `path`.
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self, VersionError> {
        let path = path.as_ref();
        let file = PropertiesFile::parse(&read(path)?);

        let version = file
            .value(Key::Version)
            .ok_or_else(|| VersionError::MissingVersion {
                path: path.to_owned(),
            })?
            .to_owned();

        let notable_versions = file
            .value(Key::NotableVersions)
            .map(|value| value.split(',').map(|v| v.trim().to_owned()).collect())
            .unwrap_or_default();

        tracing::debug!(%path, %version, "Loaded version file");

        Ok(VersionInfo {
            path: path.to_owned(),
            version,
            notable_versions,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The current version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Notable versions, most recent first.
    pub fn notable_versions(&self) -> &[String] {
        &self.notable_versions
    }

    /// Whether the current version is a notable release.
    pub fn is_notable_release(&self) -> bool {
        is_notable(&self.version)
    }

    /// Move the version file to the next version.
    ///
    /// With `mark_notable` the current version is recorded first in the
    /// `notableVersions` entry, which is created at the end of the file if
    /// missing. Lines other than these two entries are written back
    /// unchanged. The file always ends with a newline afterwards.
    ///
    /// A failure leaves the file as it was, unless writing itself failed
    /// part way.
    pub fn bump(&self, mark_notable: bool) -> Result<VersionInfo, VersionError> {
        let mut file = PropertiesFile::parse(&read(&self.path)?);
        let next = increment_version(&self.version)?;

        let mut notable_versions = self.notable_versions.clone();
        if mark_notable {
            notable_versions.insert(0, self.version.clone());
            let value = notable_versions.join(", ");
            if !file.replace(Key::NotableVersions, &value) {
                file.append(Key::NotableVersions, &value);
            }
        }

        if !file.replace(Key::Version, &next) {
            return Err(VersionError::MissingVersion {
                path: self.path.clone(),
            });
        }

        std::fs::write(&self.path, file.render()).map_err(|source| VersionError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::info!(
            path = %self.path,
            from = %self.version,
            to = %next,
            notable = mark_notable,
            "Bumped version"
        );

        Ok(VersionInfo {
            path: self.path.clone(),
            version: next,
            notable_versions,
        })
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    struct VersionFile {
        _dir: tempfile::TempDir,
        path: Utf8PathBuf,
    }

    impl VersionFile {
        fn new(content: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = Utf8PathBuf::from_path_buf(dir.path().join("version.properties")).unwrap();
            std::fs::write(&path, content).unwrap();
            VersionFile { _dir: dir, path }
        }

        fn content(&self) -> String {
            std::fs::read_to_string(&self.path).unwrap()
        }
    }

    #[test]
    fn increments_last_component() {
        assert_eq!(increment_version("1.2.3").unwrap(), "1.2.4");
        assert_eq!(increment_version("5.3.9").unwrap(), "5.3.10");
        assert_eq!(increment_version("2.0").unwrap(), "2.1");
        assert_eq!(increment_version("7").unwrap(), "8");
        assert_eq!(increment_version("1.02.3").unwrap(), "1.02.4");
    }

    #[test]
    fn rejects_non_numeric_versions() {
        for version in ["", "1.2.x", "1..2", "1.2.3-beta"] {
            assert!(
                matches!(
                    increment_version(version),
                    Err(VersionError::InvalidVersion { .. })
                ),
                "{version:?} should be rejected"
            );
        }
    }

    #[test]
    fn notable_versions() {
        assert!(is_notable("2.0"));
        assert!(is_notable("2.0.0"));
        assert!(is_notable("2.10.0"));
        assert!(!is_notable("2.1.3"));
        assert!(!is_notable("2.0.1"));
        assert!(!is_notable("2.10"));
    }

    #[test]
    fn load_reads_version_and_notable_versions() {
        let file = VersionFile::new("version=1.5.0\nnotableVersions=1.4.0 ,1.0.0, 0.9.0\n");
        let info = VersionInfo::load(&file.path).unwrap();

        assert_eq!(info.version(), "1.5.0");
        assert_eq!(info.notable_versions(), ["1.4.0", "1.0.0", "0.9.0"]);
        assert!(info.is_notable_release());
    }

    #[test]
    fn load_requires_version() {
        let file = VersionFile::new("notableVersions=1.0.0\n");
        let error = VersionInfo::load(&file.path).unwrap_err();

        assert!(matches!(error, VersionError::MissingVersion { .. }));
        assert!(error.to_string().contains(file.path.as_str()));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nope.properties")).unwrap();

        let error = VersionInfo::load(&path).unwrap_err();
        assert!(matches!(error, VersionError::Read { .. }));
        assert!(error.to_string().contains("nope.properties"));
    }

    #[test]
    fn bump_keeps_other_lines() {
        let original = indoc! {"
            # Version of the project
            version=0.0.1
            description = release tools

            notableVersions=0.0.0
            trailing:value"};
        let file = VersionFile::new(original);

        let info = VersionInfo::load(&file.path).unwrap();
        let bumped = info.bump(false).unwrap();
        assert_eq!(bumped.version(), "0.0.2");
        assert_eq!(bumped.notable_versions(), ["0.0.0"]);

        let reloaded = VersionInfo::load(&file.path).unwrap();
        assert_eq!(reloaded, bumped);

        let expected = format!("{}\n", original.replace("version=0.0.1", "version=0.0.2"));
        assert_eq!(file.content(), expected);
    }

    #[test]
    fn bump_notable_appends_entry() {
        let file = VersionFile::new("version=5.3.9\n");
        let info = VersionInfo::load(&file.path).unwrap();

        let bumped = info.bump(true).unwrap();
        assert_eq!(bumped.version(), "5.3.10");
        assert_eq!(bumped.notable_versions(), ["5.3.9"]);
        assert_eq!(file.content(), "version=5.3.10\n\nnotableVersions=5.3.9\n");
    }

    #[test]
    fn bump_notable_updates_existing_entry() {
        let file = VersionFile::new(indoc! {"
            version=1.1.0
            notableVersions=1.0.0, 0.9.0
            foo=bar
        "});
        let info = VersionInfo::load(&file.path).unwrap();

        let bumped = info.bump(true).unwrap();
        assert_eq!(bumped.notable_versions(), ["1.1.0", "1.0.0", "0.9.0"]);
        assert_eq!(
            file.content(),
            indoc! {"
                version=1.1.1
                notableVersions=1.1.0, 1.0.0, 0.9.0
                foo=bar
            "}
        );
    }

    #[test]
    fn repeated_bumps() {
        let file = VersionFile::new("version=1.0.0");
        let info = VersionInfo::load(&file.path).unwrap();

        let info = info.bump(true).unwrap();
        let info = info.bump(false).unwrap();
        let info = info.bump(true).unwrap();

        assert_eq!(info.version(), "1.0.3");
        assert_eq!(
            file.content(),
            "version=1.0.3\n\nnotableVersions=1.0.2, 1.0.0\n"
        );
    }

    #[test]
    fn bump_invalid_version_leaves_file() {
        let file = VersionFile::new("version=1.0.beta\n");
        let info = VersionInfo::load(&file.path).unwrap();

        assert!(matches!(
            info.bump(true),
            Err(VersionError::InvalidVersion { .. })
        ));
        assert_eq!(file.content(), "version=1.0.beta\n");
    }
}
