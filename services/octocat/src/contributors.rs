use api_client::FetchError;
use http::Uri;
use notes::ContributorSet;

use crate::models::{ContributorSummary, User};
use crate::GithubClient;

/// Outcome of collecting contributors.
///
/// Collection is best effort: the first failed request stops it, and the
/// contributors gathered up to then are kept next to the error.
#[derive(Debug)]
pub struct ContributorsFetch {
    /// Contributors collected from every fully resolved page.
    pub contributors: ContributorSet,

    /// The failure which cut collection short, if any.
    pub error: Option<FetchError>,
}

impl ContributorsFetch {
    /// Whether every page was collected.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// The contributors, whether or not collection completed.
    pub fn into_contributors(self) -> ContributorSet {
        self.contributors
    }
}

impl GithubClient {
    /// Collect every contributor of `repository` (`owner/name`).
    ///
    /// Pages are requested one after the other; each entry of a page is
    /// resolved to the user's profile before the next page is requested. A
    /// page joins the result only once all of its entries are resolved.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_all_contributors(&self, repository: &str) -> ContributorsFetch {
        tracing::info!("Querying Github API for all contributors of {repository}");

        let mut contributors = ContributorSet::new();
        let error = self
            .collect_contributors(repository, &mut contributors)
            .await
            .err();

        match &error {
            Some(error) => tracing::warn!(
                collected = contributors.len(),
                "Stopped collecting contributors, keeping partial results: {error}"
            ),
            None => tracing::debug!(collected = contributors.len(), "Collected all contributors"),
        }

        ContributorsFetch {
            contributors,
            error,
        }
    }

    async fn collect_contributors(
        &self,
        repository: &str,
        contributors: &mut ContributorSet,
    ) -> Result<(), FetchError> {
        let start = self
            .client
            .try_endpoint(&format!("repos/{repository}/contributors"))?;
        let mut pages = self.client.pages::<ContributorSummary>(start);

        while pages.has_next_page() {
            let page = pages.next_page().await?;
            tracing::debug!(page = pages.page(), entries = page.len(), "Fetched contributors page");

            let resolved = self.resolve_page(page).await?;
            contributors.extend(resolved);
        }

        Ok(())
    }

    async fn resolve_page(&self, page: Vec<ContributorSummary>) -> Result<ContributorSet, FetchError> {
        let mut resolved = ContributorSet::new();
        for summary in page {
            let url: Uri = summary.url.parse()?;
            let user: User = self.client.fetch(url).await?;
            tracing::trace!(login = %user.login, "Resolved contributor");
            resolved.insert(summary.into_contributor(user));
        }
        Ok(resolved)
    }
}
