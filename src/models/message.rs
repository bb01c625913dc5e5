use serde::{Deserialize, Serialize};

/// Who a notification is addressed to. GitHub-originated messages carry the
/// platform login and are resolved to an email through the directory; Jira
/// already hands us emails. Exactly one variant by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    GithubLogin(String),
    Email(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub recipient: Recipient,
    pub body: String,
}

impl Message {
    pub fn to_login(login: impl Into<String>, body: impl Into<String>) -> Self {
        Message {
            recipient: Recipient::GithubLogin(login.into()),
            body: body.into(),
        }
    }

    pub fn to_email(email: impl Into<String>, body: impl Into<String>) -> Self {
        Message {
            recipient: Recipient::Email(email.into()),
            body: body.into(),
        }
    }
}
