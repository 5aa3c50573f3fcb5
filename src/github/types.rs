use serde::Deserialize;

/// A GitHub account, reduced to the login we key decisions on.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

/// Pull request metadata as returned by the GitHub REST API.
///
/// `additions`/`deletions` are only populated by the single-pull endpoint;
/// the list endpoint omits them, so they default to zero there.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub user: User,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

/// One submitted review on a pull request.
#[derive(Debug, Clone, Deserialize)]
pub struct Review {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl Review {
    /// Review body, empty when the reviewer submitted without one.
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// A line-level comment attached to a review.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub user: Option<User>,
}

impl ReviewComment {
    /// Author login, empty when the account is gone or was never set.
    pub fn author(&self) -> &str {
        self.user.as_ref().map(|u| u.login.as_str()).unwrap_or_default()
    }
}
