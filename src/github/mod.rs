pub mod types;

pub use types::{PullRequest, Review, ReviewComment, User};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Repository;

/// Default API root; tests point the client at a local mock server instead.
pub const GITHUB_API: &str = "https://api.github.com";

const USER_AGENT: &str = "review-collector";
const PER_PAGE: usize = 100;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("background comment fetch failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Thin REST client scoped to one repository.
///
/// Cheap to clone (reqwest::Client is reference-counted), which is what the
/// concurrent per-review comment fetches rely on.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base: String,
    repo: String,
    token: String,
}

impl GitHubClient {
    pub fn new(repository: &Repository, token: &str) -> Self {
        Self::with_base_url(GITHUB_API, repository, token)
    }

    /// Build a client against a different API root (used by tests).
    pub fn with_base_url(base: &str, repository: &Repository, token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            repo: format!("{}/{}", repository.owner, repository.name),
            token: token.to_string(),
        }
    }

    /// List the repository's pull requests.
    #[instrument(skip(self), fields(repo = %self.repo))]
    pub async fn pulls(&self) -> Result<Vec<PullRequest>, FetchError> {
        self.paginated("pulls").await
    }

    /// Fetch one pull request; this is the endpoint that carries
    /// additions/deletions for the change-size gate.
    #[instrument(skip(self), fields(repo = %self.repo))]
    pub async fn pull(&self, number: u64) -> Result<PullRequest, FetchError> {
        self.get_json(&format!("pulls/{number}"), &[]).await
    }

    /// All reviews on a pull request, in API order, pagination drained.
    #[instrument(skip(self), fields(repo = %self.repo))]
    pub async fn reviews(&self, pull: u64) -> Result<Vec<Review>, FetchError> {
        self.paginated(&format!("pulls/{pull}/reviews")).await
    }

    /// All comments attached to one review, in API order, pagination drained.
    #[instrument(skip(self), fields(repo = %self.repo))]
    pub async fn review_comments(
        &self,
        pull: u64,
        review: u64,
    ) -> Result<Vec<ReviewComment>, FetchError> {
        self.paginated(&format!("pulls/{pull}/reviews/{review}/comments"))
            .await
    }

    /// Post a comment on the pull request's conversation thread.
    #[instrument(skip(self, body), fields(repo = %self.repo))]
    pub async fn create_issue_comment(&self, pull: u64, body: &str) -> Result<(), FetchError> {
        let url = format!("{}/repos/{}/issues/{pull}/comments", self.base, self.repo);
        self.http
            .post(&url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?
            .error_for_status()?;
        debug!("issue comment created");
        Ok(())
    }

    /// Drain a paginated list endpoint into a single Vec. A page shorter
    /// than the requested size signals the end of the collection.
    async fn paginated<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, FetchError> {
        let mut all = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<T> = self
                .get_json(
                    path,
                    &[
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let received = batch.len();
            debug!(path, page, received, "fetched page");
            all.extend(batch);
            if received < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(all)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/repos/{}/{}", self.base, self.repo, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }
}
