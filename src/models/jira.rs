use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Webhooks don't always carry a full issue; only the `self` REST URL and
/// key can be relied on. The full resource is fetched from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialIssue {
    #[serde(rename = "self")]
    pub self_url: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialUser {
    #[serde(rename = "accountId")]
    pub account_id: String,
}

/// Full user profile as returned by `/rest/api/2/user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraUser {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "emailAddress")]
    pub email_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub fields: JiraIssueFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueFields {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueComment {
    pub author: CommentAuthor,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    #[serde(rename = "accountId")]
    pub account_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchersPayload {
    pub watchers: Vec<Watcher>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watcher {
    #[serde(rename = "accountId")]
    pub account_id: String,
    /// Undocumented, but present in practice; tolerate its absence.
    #[serde(rename = "emailAddress", default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Changelog {
    pub items: Vec<ChangelogItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogItem {
    pub field: String,
    /// Target value id; for assignee changes, the new assignee's account id.
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreatedPayload {
    pub issue: PartialIssue,
    pub comment: IssueComment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueUpdatedPayload {
    pub issue: PartialIssue,
    pub user: PartialUser,
    pub changelog: Changelog,
}

/// Jira webhook event, keyed by the `webhookEvent` field of the body.
#[derive(Debug, Clone)]
pub enum JiraEvent {
    CommentCreated(CommentCreatedPayload),
    IssueUpdated(IssueUpdatedPayload),
    Unhandled(String),
}

impl JiraEvent {
    pub fn from_value(payload: Value) -> serde_json::Result<Self> {
        let event_name = payload
            .get("webhookEvent")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        Ok(match event_name.as_str() {
            "comment_created" => JiraEvent::CommentCreated(serde_json::from_value(payload)?),
            "jira:issue_updated" => JiraEvent::IssueUpdated(serde_json::from_value(payload)?),
            _ => JiraEvent::Unhandled(event_name),
        })
    }
}
