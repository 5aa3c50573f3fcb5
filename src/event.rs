use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::github::{FetchError, GitHubClient, PullRequest};

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to read event payload: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse event payload: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Event payload carries no pull request reference")]
    MissingPull,

    #[error("Event payload carries no sender login")]
    MissingSender,

    #[error("Pull request #{0} not found in repository")]
    PullNotFound(u64),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// The triggering event payload. Read once at startup; only the actor login
/// and the referenced pull request number matter here, the rest of the
/// document is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    #[serde(default)]
    sender: Option<Sender>,
    #[serde(default)]
    pull_request: Option<EventPull>,
}

#[derive(Debug, Clone, Deserialize)]
struct Sender {
    login: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EventPull {
    number: u64,
}

impl Event {
    pub fn from_file(path: &Path) -> Result<Event, EventError> {
        let raw = std::fs::read_to_string(path)?;
        Event::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Event, EventError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Login of the actor that triggered the event.
    pub fn actor(&self) -> Result<&str, EventError> {
        self.sender
            .as_ref()
            .map(|s| s.login.as_str())
            .ok_or(EventError::MissingSender)
    }

    /// Number of the pull request the event refers to.
    pub fn pull_number(&self) -> Result<u64, EventError> {
        self.pull_request
            .as_ref()
            .map(|p| p.number)
            .ok_or(EventError::MissingPull)
    }
}

/// Locate the pull request the event refers to by scanning the repository's
/// pull requests. One round trip, no retries.
#[instrument(skip(client))]
pub async fn resolve_pull(client: &GitHubClient, number: u64) -> Result<PullRequest, EventError> {
    let pulls = client.pulls().await?;
    debug!(candidates = pulls.len(), "scanning pull requests");
    pulls
        .into_iter()
        .find(|pull| pull.number == number)
        .ok_or(EventError::PullNotFound(number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Repository;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_review_event() {
        let event = Event::from_json(
            r#"{
                "action": "submitted",
                "sender": { "login": "jeff" },
                "pull_request": { "number": 42, "title": "ignored here" }
            }"#,
        )
        .unwrap();
        assert_eq!(event.actor().unwrap(), "jeff");
        assert_eq!(event.pull_number().unwrap(), 42);
    }

    #[test]
    fn test_missing_pull_reference_is_fatal() {
        let event = Event::from_json(r#"{ "sender": { "login": "jeff" } }"#).unwrap();
        assert!(matches!(event.pull_number(), Err(EventError::MissingPull)));
    }

    #[test]
    fn test_missing_sender_is_fatal() {
        let event = Event::from_json(r#"{ "pull_request": { "number": 1 } }"#).unwrap();
        assert!(matches!(event.actor(), Err(EventError::MissingSender)));
    }

    async fn pulls_endpoint(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/repos/org/repo/pulls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "number": 41, "title": "first", "user": { "login": "alice" } },
                { "number": 42, "title": "second", "user": { "login": "bob" } }
            ])))
            .mount(server)
            .await;
    }

    fn client_for(server: &MockServer) -> GitHubClient {
        let repo = Repository {
            owner: "org".to_string(),
            name: "repo".to_string(),
        };
        GitHubClient::with_base_url(&server.uri(), &repo, "test-token")
    }

    #[tokio::test]
    async fn test_resolve_pull_finds_referenced_number() {
        let server = MockServer::start().await;
        pulls_endpoint(&server).await;

        let pull = resolve_pull(&client_for(&server), 42).await.unwrap();
        assert_eq!(pull.number, 42);
        assert_eq!(pull.title, "second");
    }

    #[tokio::test]
    async fn test_resolve_pull_not_found() {
        let server = MockServer::start().await;
        pulls_endpoint(&server).await;

        let result = resolve_pull(&client_for(&server), 99).await;
        assert!(matches!(result, Err(EventError::PullNotFound(99))));
    }
}
