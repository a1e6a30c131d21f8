//! The record of a release, as handed to the formatter.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person's public identity on the code hosting service.
///
/// The display name is the identity: two contributors with the same name are
/// the same person as far as release notes are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    login: Option<String>,
    profile_url: String,
    #[serde(default)]
    contributions: u64,
}

impl Contributor {
    /// Create a contributor from a display name and a profile URL.
    pub fn new(name: impl Into<String>, profile_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            login: None,
            profile_url: profile_url.into(),
            contributions: 0,
        }
    }

    /// Attach the account login.
    pub fn with_login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Attach the number of contributions reported by the hosting service.
    pub fn with_contributions(mut self, contributions: u64) -> Self {
        self.contributions = contributions;
        self
    }

    /// Display name, the identity of this contributor.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Account login, when known.
    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    /// Public profile page.
    pub fn profile_url(&self) -> &str {
        &self.profile_url
    }

    /// Contributions reported by the hosting service.
    pub fn contributions(&self) -> u64 {
        self.contributions
    }
}

/// Contributors, deduplicated by display name.
///
/// Iteration follows insertion order. When a name is inserted twice the
/// first contributor stays.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Contributor>", into = "Vec<Contributor>")]
pub struct ContributorSet {
    members: Vec<Contributor>,
    index: HashMap<String, usize>,
}

impl ContributorSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a contributor. Returns `false` if someone with the same name is
    /// already a member, in which case the set is unchanged.
    pub fn insert(&mut self, contributor: Contributor) -> bool {
        if self.index.contains_key(contributor.name()) {
            return false;
        }
        self.index
            .insert(contributor.name().to_owned(), self.members.len());
        self.members.push(contributor);
        true
    }

    /// Look up the contributor for a commit author name.
    pub fn find_by_author_name(&self, author_name: &str) -> Option<&Contributor> {
        self.index.get(author_name).map(|&idx| &self.members[idx])
    }

    /// Union of two sets, keeping the members of `self` on conflicts.
    pub fn union(mut self, other: ContributorSet) -> ContributorSet {
        self.extend(other);
        self
    }

    /// Number of contributors.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True if there are no contributors.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Iterate over contributors in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Contributor> {
        self.members.iter()
    }
}

impl Extend<Contributor> for ContributorSet {
    fn extend<I: IntoIterator<Item = Contributor>>(&mut self, iter: I) {
        for contributor in iter {
            self.insert(contributor);
        }
    }
}

impl FromIterator<Contributor> for ContributorSet {
    fn from_iter<I: IntoIterator<Item = Contributor>>(iter: I) -> Self {
        let mut set = ContributorSet::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for ContributorSet {
    type Item = Contributor;
    type IntoIter = std::vec::IntoIter<Contributor>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.into_iter()
    }
}

impl<'a> IntoIterator for &'a ContributorSet {
    type Item = &'a Contributor;
    type IntoIter = std::slice::Iter<'a, Contributor>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl From<Vec<Contributor>> for ContributorSet {
    fn from(contributors: Vec<Contributor>) -> Self {
        contributors.into_iter().collect()
    }
}

impl From<ContributorSet> for Vec<Contributor> {
    fn from(set: ContributorSet) -> Self {
        set.members
    }
}

#[derive(Debug, Deserialize)]
struct ContributionRecord {
    author: String,
    #[serde(default)]
    commits: Vec<String>,
}

/// One author's commits within a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ContributionRecord")]
pub struct Contribution {
    author_name: String,
    commits: Vec<String>,
}

impl Contribution {
    /// A contribution without commits yet.
    pub fn new(author_name: impl Into<String>) -> Self {
        Self {
            author_name: author_name.into(),
            commits: Vec::new(),
        }
    }

    /// Record a commit. Returns `false` if it was already recorded.
    pub fn add_commit(&mut self, commit_id: impl Into<String>) -> bool {
        let commit_id = commit_id.into();
        if self.commits.contains(&commit_id) {
            return false;
        }
        self.commits.push(commit_id);
        true
    }

    /// Commit author name as recorded by version control.
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Commit identifiers, each listed once.
    pub fn commits(&self) -> &[String] {
        &self.commits
    }
}

impl From<ContributionRecord> for Contribution {
    fn from(record: ContributionRecord) -> Self {
        let mut contribution = Contribution::new(record.author);
        for commit in record.commits {
            contribution.add_commit(commit);
        }
        contribution
    }
}

/// All contributions to a release, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<Contribution>")]
pub struct ContributionSet {
    contributions: Vec<Contribution>,
}

impl ContributionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute a commit to an author, starting a new contribution the
    /// first time the author shows up.
    pub fn add_commit(&mut self, commit_id: impl Into<String>, author_name: &str) {
        match self
            .contributions
            .iter_mut()
            .find(|c| c.author_name == author_name)
        {
            Some(contribution) => {
                contribution.add_commit(commit_id);
            }
            None => {
                let mut contribution = Contribution::new(author_name);
                contribution.add_commit(commit_id);
                self.contributions.push(contribution);
            }
        }
    }

    /// Contributions in insertion order.
    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Distinct commits across every contribution.
    pub fn all_commits(&self) -> HashSet<&str> {
        self.contributions
            .iter()
            .flat_map(|c| c.commits.iter().map(String::as_str))
            .collect()
    }
}

impl From<Vec<Contribution>> for ContributionSet {
    fn from(contributions: Vec<Contribution>) -> Self {
        let mut set = ContributionSet::new();
        for contribution in contributions {
            match set
                .contributions
                .iter_mut()
                .find(|c| c.author_name == contribution.author_name)
            {
                Some(existing) => {
                    for commit in contribution.commits {
                        existing.add_commit(commit);
                    }
                }
                None => set.contributions.push(contribution),
            }
        }
        set
    }
}

/// A user facing change, usually an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Improvement {
    id: u64,
    title: String,
    url: String,
    #[serde(default)]
    labels: BTreeSet<String>,
}

impl Improvement {
    /// Create an improvement.
    pub fn new<I, L>(id: u64, title: impl Into<String>, url: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            id,
            title: title.into(),
            url: url.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Issue or pull request number.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Short description.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Link to the issue or pull request.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Labels attached to the change.
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    /// Whether the change carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

impl fmt::Display for Improvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [(#{})]({})", self.title, self.id, self.url)
    }
}

/// Everything known about one release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseNotesData {
    version: String,
    date: DateTime<Utc>,
    #[serde(default)]
    contributions: ContributionSet,
    #[serde(default)]
    contributors: ContributorSet,
    #[serde(default)]
    improvements: Vec<Improvement>,
}

impl ReleaseNotesData {
    /// Assemble a release record.
    pub fn new(
        version: impl Into<String>,
        date: DateTime<Utc>,
        contributions: ContributionSet,
        contributors: ContributorSet,
        improvements: Vec<Improvement>,
    ) -> Self {
        Self {
            version: version.into(),
            date,
            contributions,
            contributors,
            improvements,
        }
    }

    /// Add contributors known from elsewhere, e.g. a cached project-wide
    /// list. Contributors already in the record win.
    pub fn with_contributors(mut self, contributors: ContributorSet) -> Self {
        self.contributors.extend(contributors);
        self
    }

    /// Released version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Release timestamp.
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Commits grouped by author.
    pub fn contributions(&self) -> &ContributionSet {
        &self.contributions
    }

    /// Known contributor profiles.
    pub fn contributors(&self) -> &ContributorSet {
        &self.contributors
    }

    /// Changes in this release.
    pub fn improvements(&self) -> &[Improvement] {
        &self.improvements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contributor_set_keeps_first_identity() {
        let mut set = ContributorSet::new();
        assert!(set.insert(Contributor::new("alice", "https://x/alice")));
        assert!(!set.insert(Contributor::new("alice", "https://y/alice")));
        assert!(set.insert(Contributor::new("bob", "https://x/bob")));

        assert_eq!(set.len(), 2);
        assert_eq!(
            set.find_by_author_name("alice").map(Contributor::profile_url),
            Some("https://x/alice")
        );
        assert!(set.find_by_author_name("carol").is_none());
    }

    #[test]
    fn contributor_set_union() {
        let first: ContributorSet = vec![Contributor::new("alice", "a1")].into();
        let second: ContributorSet = vec![
            Contributor::new("alice", "a2"),
            Contributor::new("bob", "b1"),
        ]
        .into();

        let union = first.union(second);
        let names: Vec<_> = union.iter().map(Contributor::name).collect();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(
            union.find_by_author_name("alice").unwrap().profile_url(),
            "a1"
        );
    }

    #[test]
    fn contributor_set_serde_shape() {
        let set: ContributorSet = vec![Contributor::new("alice", "https://x/alice")
            .with_login("alice-gh")
            .with_contributions(12)]
        .into();

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "name": "alice",
                "login": "alice-gh",
                "profile_url": "https://x/alice",
                "contributions": 12
            }])
        );

        let back: ContributorSet = serde_json::from_value(json).unwrap();
        assert_eq!(back.find_by_author_name("alice").unwrap().login(), Some("alice-gh"));
    }

    #[test]
    fn contribution_commits_are_unique() {
        let mut contribution = Contribution::new("alice");
        assert!(contribution.add_commit("a1"));
        assert!(!contribution.add_commit("a1"));
        assert_eq!(contribution.commits(), ["a1"]);
    }

    #[test]
    fn contribution_set_groups_by_author_in_order_of_appearance() {
        let mut set = ContributionSet::new();
        set.add_commit("c1", "bob");
        set.add_commit("c2", "alice");
        set.add_commit("c3", "bob");
        set.add_commit("c3", "bob");

        let authors: Vec<_> = set
            .contributions()
            .iter()
            .map(|c| (c.author_name(), c.commits().len()))
            .collect();
        assert_eq!(authors, vec![("bob", 2), ("alice", 1)]);
        assert_eq!(set.all_commits().len(), 3);
    }

    #[test]
    fn contribution_set_keeps_authors_without_commits() {
        let set: ContributionSet = serde_json::from_value(serde_json::json!([
            {"author": "alice", "commits": []},
            {"author": "bob", "commits": ["b1"]},
            {"author": "bob", "commits": ["b1", "b2"]}
        ]))
        .unwrap();

        let authors: Vec<_> = set
            .contributions()
            .iter()
            .map(|c| (c.author_name(), c.commits().len()))
            .collect();
        assert_eq!(authors, vec![("alice", 0), ("bob", 2)]);
    }

    #[test]
    fn release_from_json() {
        let data: ReleaseNotesData = serde_json::from_value(serde_json::json!({
            "version": "2.1.0",
            "date": "2017-01-29T14:33:00Z",
            "contributions": [
                {"author": "alice", "commits": ["a1", "a2", "a1"]}
            ],
            "improvements": [
                {"id": 7, "title": "Fix it", "url": "https://x/7", "labels": ["bugfix"]}
            ]
        }))
        .unwrap();

        assert_eq!(data.version(), "2.1.0");
        assert_eq!(data.contributions().contributions()[0].commits().len(), 2);
        assert!(data.contributors().is_empty());
        assert!(data.improvements()[0].has_label("bugfix"));
        assert_eq!(data.improvements()[0].to_string(), "Fix it [(#7)](https://x/7)");
    }
}
