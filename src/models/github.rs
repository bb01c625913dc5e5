use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GithubUser {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    /// API URL; the fetch root for `/comments` and `/reviews`.
    pub url: String,
    pub html_url: String,
    pub user: GithubUser,
    pub title: String,
    #[serde(default)]
    pub requested_reviewers: Vec<GithubUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    /// Any state we don't recognize; never produces notifications.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestReview {
    /// GitHub sends `null` here when a review carries no summary text.
    #[serde(default)]
    pub body: Option<String>,
    pub html_url: String,
    pub state: ReviewState,
    pub user: GithubUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestComment {
    pub html_url: String,
    pub body: String,
    pub user: GithubUser,
}

/// The issue carried by an `issue_comment` payload. Webhooks only include a
/// pull-request stub when the issue is PR-backed; the full pull request has
/// to be fetched from the stub URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub pull_request: Option<IssuePullRequestRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuePullRequestRef {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestPayload {
    pub action: String,
    pub pull_request: PullRequest,
    /// The reviewer added by this specific event. The pull request's own
    /// `requested_reviewers` list may contain reviewers requested earlier.
    #[serde(default)]
    pub requested_reviewer: Option<GithubUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPayload {
    pub action: String,
    pub pull_request: PullRequest,
    pub review: PullRequestReview,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCommentPayload {
    pub action: String,
    pub pull_request: PullRequest,
    pub comment: PullRequestComment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCommentPayload {
    pub action: String,
    pub issue: Issue,
    pub comment: PullRequestComment,
}

/// GitHub webhook event, keyed by the `x-github-event` header.
///
/// Closed set of the events we handle, plus an explicit fallback so that
/// unknown events are a no-op rather than a parse failure.
#[derive(Debug, Clone)]
pub enum GithubEvent {
    PullRequest(PullRequestPayload),
    Review(ReviewPayload),
    ReviewComment(ReviewCommentPayload),
    IssueComment(IssueCommentPayload),
    Unhandled(String),
}

impl GithubEvent {
    pub fn from_parts(event_name: &str, payload: Value) -> serde_json::Result<Self> {
        Ok(match event_name {
            "pull_request" => GithubEvent::PullRequest(serde_json::from_value(payload)?),
            "pull_request_review" => GithubEvent::Review(serde_json::from_value(payload)?),
            "pull_request_review_comment" => {
                GithubEvent::ReviewComment(serde_json::from_value(payload)?)
            }
            "issue_comment" => GithubEvent::IssueComment(serde_json::from_value(payload)?),
            other => GithubEvent::Unhandled(other.to_string()),
        })
    }
}
