pub mod types;

pub use types::{AggregatedComment, AggregatedDataset, AggregatedReview};

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

use crate::github::{FetchError, GitHubClient, Review, ReviewComment};

/// Single contract shared by every pipeline stage: produce a value or fail.
/// Stages compose by constructor wiring, so the whole pipeline is one
/// `produce()` call on the outermost stage.
#[async_trait]
pub trait Produce: Send + Sync {
    type Output;

    async fn produce(&self) -> Result<Self::Output, FetchError>;
}

/// Raw review list for one pull request, pagination already drained,
/// API order preserved.
pub struct RawReviews {
    client: GitHubClient,
    pull: u64,
}

impl RawReviews {
    pub fn new(client: GitHubClient, pull: u64) -> Self {
        Self { client, pull }
    }
}

#[async_trait]
impl Produce for RawReviews {
    type Output = Vec<Review>;

    async fn produce(&self) -> Result<Vec<Review>, FetchError> {
        self.client.reviews(self.pull).await
    }
}

/// Canonical review list: one entry per id, first representation kept.
pub struct UniqueReviews<P> {
    origin: P,
}

impl<P> UniqueReviews<P> {
    pub fn new(origin: P) -> Self {
        Self { origin }
    }
}

#[async_trait]
impl<P> Produce for UniqueReviews<P>
where
    P: Produce<Output = Vec<Review>>,
{
    type Output = Vec<Review>;

    async fn produce(&self) -> Result<Vec<Review>, FetchError> {
        Ok(dedup(self.origin.produce().await?))
    }
}

/// Keep-first de-duplication by review id. The API may hand the same review
/// back more than once across pages; repeats are dropped, order of first
/// appearance is kept. Idempotent.
pub fn dedup(raw: Vec<Review>) -> Vec<Review> {
    let mut seen = HashSet::new();
    raw.into_iter().filter(|review| seen.insert(review.id)).collect()
}

/// Order-preserving filter with a caller-supplied inclusion predicate.
pub fn filter_comments<P>(comments: Vec<ReviewComment>, predicate: P) -> Vec<ReviewComment>
where
    P: Fn(&ReviewComment) -> bool,
{
    comments.into_iter().filter(|c| predicate(c)).collect()
}

/// Default inclusion predicate: the comment has a named author.
pub fn authored(comment: &ReviewComment) -> bool {
    !comment.author().is_empty()
}

pub type CommentPredicate = Arc<dyn Fn(&ReviewComment) -> bool + Send + Sync>;

/// Aggregator: joins each canonical review with its filtered comments.
///
/// Comment fetches for different reviews are independent, so they run
/// concurrently; each task writes into a slot reserved by review index and
/// the final document is assembled strictly in canonical order. The first
/// failed fetch aborts the rest (dropping the JoinSet cancels them).
pub struct WithComments<P> {
    origin: P,
    client: GitHubClient,
    pull: u64,
    include: CommentPredicate,
}

impl<P> WithComments<P> {
    pub fn new(origin: P, client: GitHubClient, pull: u64, include: CommentPredicate) -> Self {
        Self {
            origin,
            client,
            pull,
            include,
        }
    }
}

#[async_trait]
impl<P> Produce for WithComments<P>
where
    P: Produce<Output = Vec<Review>>,
{
    type Output = AggregatedDataset;

    async fn produce(&self) -> Result<AggregatedDataset, FetchError> {
        let canonical = self.origin.produce().await?;
        debug!(reviews = canonical.len(), "fetching comments per review");

        let mut slots: Vec<Option<Vec<ReviewComment>>> = vec![None; canonical.len()];
        let mut tasks = JoinSet::new();
        for (index, review) in canonical.iter().enumerate() {
            let client = self.client.clone();
            let include = Arc::clone(&self.include);
            let pull = self.pull;
            let review_id = review.id;
            tasks.spawn(async move {
                let comments = client.review_comments(pull, review_id).await?;
                Ok::<_, FetchError>((index, filter_comments(comments, |c| include(c))))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, comments) = joined??;
            if let Some(slot) = slots.get_mut(index) {
                *slot = Some(comments);
            }
        }

        let mut dataset = Vec::with_capacity(canonical.len());
        for (review, slot) in canonical.into_iter().zip(slots) {
            let comments = slot.unwrap_or_default();
            dataset.push(AggregatedReview {
                id: review.id,
                body: review.body().to_string(),
                comments: comments
                    .into_iter()
                    .map(|comment| {
                        let author = comment.author().to_string();
                        AggregatedComment {
                            id: comment.id,
                            body: comment.body,
                            author,
                        }
                    })
                    .collect(),
            });
        }
        Ok(dataset)
    }
}
