//! Github API object models.

use notes::Contributor;
use serde::Deserialize;

/// Entry of the `repos/{owner}/{repo}/contributors` list.
#[derive(Debug, Clone, Deserialize)]
pub struct ContributorSummary {
    /// Account login.
    pub login: String,

    /// API URL of the user resource with the full profile.
    pub url: String,

    /// Number of commits to the repository.
    #[serde(default)]
    pub contributions: u64,
}

/// A user resource, as returned from `users/{login}`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Account login.
    pub login: String,

    /// Display name, if the user set one.
    #[serde(default)]
    pub name: Option<String>,

    /// Public profile page.
    pub html_url: String,
}

impl ContributorSummary {
    /// Combine the list entry with the user's profile.
    ///
    /// The display name identifies the contributor; users without one are
    /// known by their login.
    pub fn into_contributor(self, user: User) -> Contributor {
        let name = user
            .name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.login.clone());

        Contributor::new(name, user.html_url)
            .with_login(self.login)
            .with_contributions(self.contributions)
    }
}
