//! Markdown rendering of release notes.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::model::{Contribution, ContributionSet, Contributor, ContributorSet, Improvement};

/// Shown instead of the improvement list when a release has none.
pub const NO_IMPROVEMENTS: &str = "* No notable improvements. See the commits for detailed changes.";

/// Format of the release date in the section header.
const DATE_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// A label and the heading its improvements are listed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCaption {
    /// Label as used by the issue tracker.
    pub label: String,
    /// Heading shown in the notes.
    pub caption: String,
}

/// Ordered mapping from label to caption.
///
/// The order decides both which group claims an improvement carrying
/// several labels and the order in which groups are printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCaptions {
    entries: Vec<LabelCaption>,
}

impl LabelCaptions {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label at the end. A label which is already present keeps its
    /// position and gets the new caption.
    pub fn insert(&mut self, label: impl Into<String>, caption: impl Into<String>) {
        let label = label.into();
        let caption = caption.into();
        match self.entries.iter_mut().find(|entry| entry.label == label) {
            Some(entry) => entry.caption = caption,
            None => self.entries.push(LabelCaption { label, caption }),
        }
    }

    /// Iterate in priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, LabelCaption> {
        self.entries.iter()
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no label is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<L, C> FromIterator<(L, C)> for LabelCaptions
where
    L: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (L, C)>>(iter: I) -> Self {
        let mut captions = LabelCaptions::new();
        for (label, caption) in iter {
            captions.insert(label, caption);
        }
        captions
    }
}

// Deserialized from a map, keeping the order of the document.
impl<'de> Deserialize<'de> for LabelCaptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LabelCaptionsVisitor;

        impl<'de> Visitor<'de> for LabelCaptionsVisitor {
            type Value = LabelCaptions;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of label to caption")
            }

            fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut captions = LabelCaptions::new();
                while let Some((label, caption)) = access.next_entry::<String, String>()? {
                    captions.insert(label, caption);
                }
                Ok(captions)
            }
        }

        deserializer.deserialize_map(LabelCaptionsVisitor)
    }
}

/// Improvements claimed by one label.
#[derive(Debug)]
struct LabelGroup<'a> {
    caption: &'a str,
    improvements: Vec<&'a Improvement>,
}

/// Split improvements into label groups plus the unclaimed remainder.
///
/// Labels are visited in caption order; each claims every still unclaimed
/// improvement carrying it, so an improvement lands in at most one group.
/// Empty groups are dropped. Both groups and remainder keep the input order
/// of improvements.
fn group_by_label<'a>(
    labels: &'a LabelCaptions,
    improvements: &'a [Improvement],
) -> (Vec<LabelGroup<'a>>, Vec<&'a Improvement>) {
    let mut unclaimed: BTreeSet<usize> = (0..improvements.len()).collect();
    let mut groups = Vec::new();

    for entry in labels.iter() {
        let claimed: Vec<usize> = unclaimed
            .iter()
            .copied()
            .filter(|&idx| improvements[idx].has_label(&entry.label))
            .collect();

        if claimed.is_empty() {
            continue;
        }

        for idx in &claimed {
            unclaimed.remove(idx);
        }

        groups.push(LabelGroup {
            caption: &entry.caption,
            improvements: claimed.into_iter().map(|idx| &improvements[idx]).collect(),
        });
    }

    let remaining = unclaimed.into_iter().map(|idx| &improvements[idx]).collect();
    (groups, remaining)
}

/// Render the improvement summary of a release.
pub fn format_improvements(labels: &LabelCaptions, improvements: &[Improvement]) -> String {
    if improvements.is_empty() {
        return NO_IMPROVEMENTS.to_owned();
    }

    let mut out = format!("* Improvements: {}", improvements.len());
    let (groups, remaining) = group_by_label(labels, improvements);

    for group in &groups {
        out.push_str(&format!(
            "\n  * {}: {}",
            group.caption,
            group.improvements.len()
        ));
        for improvement in &group.improvements {
            out.push_str(&format!("\n    * {improvement}"));
        }
    }

    if !remaining.is_empty() {
        // Without any label group the remainder is the whole list, printed flat.
        let indent = if groups.is_empty() {
            ""
        } else {
            out.push_str(&format!("\n  * Remaining changes: {}", remaining.len()));
            "  "
        };

        for improvement in remaining {
            out.push_str(&format!("\n{indent}  * {improvement}"));
        }
    }

    out
}

fn format_contribution(contribution: &Contribution, contributor: Option<&Contributor>) -> String {
    let commits = contribution.commits().len();
    match contributor {
        Some(contributor) => format!(
            "{commits}: [{}]({})",
            contribution.author_name(),
            contributor.profile_url()
        ),
        None => format!("{commits}: {}", contribution.author_name()),
    }
}

/// Human readable release date.
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Release notes formatter with a fixed label mapping.
#[derive(Debug, Clone)]
pub struct DefaultFormatter {
    labels: LabelCaptions,
    publication_repository: String,
}

impl DefaultFormatter {
    /// Create a formatter.
    ///
    /// `publication_repository` is where the release binaries were published;
    /// it is only displayed.
    pub fn new(labels: LabelCaptions, publication_repository: impl Into<String>) -> Self {
        Self {
            labels,
            publication_repository: publication_repository.into(),
        }
    }

    fn format_contributions(
        &self,
        contributions: &ContributionSet,
        contributors: &ContributorSet,
    ) -> String {
        let mut out = format!(
            "* Authors: {}, commits: {}, published to: {}",
            contributions.contributions().len(),
            contributions.all_commits().len(),
            self.publication_repository
        );

        for contribution in contributions.contributions() {
            let contributor = contributors.find_by_author_name(contribution.author_name());
            out.push_str("\n  * ");
            out.push_str(&format_contribution(contribution, contributor));
        }

        out
    }

    /// Render the notes section for one release, followed by a blank line.
    pub fn format_version(&self, data: &crate::ReleaseNotesData) -> String {
        tracing::trace!(version = data.version(), "Formatting release notes");
        format!(
            "### {} ({})\n\n{}\n{}\n\n",
            data.version(),
            format_date(data.date()),
            self.format_contributions(data.contributions(), data.contributors()),
            format_improvements(&self.labels, data.improvements())
        )
    }

    /// Render a whole document: a title followed by one section per release,
    /// in the order given.
    pub fn format_notes<'a, I>(&self, title: &str, releases: I) -> String
    where
        I: IntoIterator<Item = &'a crate::ReleaseNotesData>,
    {
        let mut out = format!("# {title}\n\n");
        for release in releases {
            out.push_str(&self.format_version(release));
        }
        out
    }
}
