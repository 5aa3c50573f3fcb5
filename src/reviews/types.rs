use serde::Serialize;

/// The final document handed downstream: every review on the pull request,
/// de-duplicated, in the order first seen, each with its filtered comments.
pub type AggregatedDataset = Vec<AggregatedReview>;

/// One review in the aggregate, reduced to the fields the scoring step needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedReview {
    pub id: u64,
    pub body: String,
    pub comments: Vec<AggregatedComment>,
}

/// Minimal projection of a review comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatedComment {
    pub id: u64,
    pub body: String,
    pub author: String,
}
