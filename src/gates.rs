use async_trait::async_trait;
use std::collections::HashSet;
use tracing::info;

use crate::github::PullRequest;

pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// The work performed once both gates let the event through.
/// Must be Send + Sync so the gate wrapper stays usable from the runtime.
#[async_trait]
pub trait PullHandler: Send + Sync {
    async fn handle(&self, pull: &PullRequest, actor: &str) -> Result<(), HandlerError>;
}

/// Configured set of author logins whose events are never processed.
/// Matching is case-sensitive exact match; an empty set excludes nobody.
#[derive(Debug, Clone, Default)]
pub struct SkipAuthors {
    authors: HashSet<String>,
}

impl SkipAuthors {
    pub fn new<I, S>(authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authors: authors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn excludes(&self, author: &str) -> bool {
        self.authors.contains(author)
    }
}

/// Author gate: runs the wrapped handler unless the triggering actor is on
/// the skip-list, in which case the handler is replaced by a log-only no-op.
pub struct SkipIfExcluded<H> {
    authors: SkipAuthors,
    handler: H,
}

impl<H: PullHandler> SkipIfExcluded<H> {
    pub fn new(authors: SkipAuthors, handler: H) -> Self {
        Self { authors, handler }
    }

    pub async fn exec(&self, pull: &PullRequest, actor: &str) -> Result<(), HandlerError> {
        if self.authors.excludes(actor) {
            info!(
                pull = pull.number,
                author = actor,
                "skipping pull request, author is excluded"
            );
            return Ok(());
        }
        self.handler.handle(pull, actor).await
    }
}

/// Total changed lines for a pull request.
pub fn changed_lines(pull: &PullRequest) -> u64 {
    pull.additions + pull.deletions
}

/// Change-size gate decision. A minimum of zero disables the gate.
pub fn below_minimum(changes: u64, min: u64) -> bool {
    min != 0 && changes < min
}
