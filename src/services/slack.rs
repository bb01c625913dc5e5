use crate::{
    config::Config,
    error::{AppError, Result},
    models::{Message, Recipient},
    services::Directory,
};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::{header, Client};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Deserialize)]
pub struct SlackUser {
    pub id: String,
}

/// The two Slack Web API calls delivery needs. A trait so delivery can be
/// exercised against deterministic fakes.
#[async_trait]
pub trait SlackApi: Send + Sync {
    /// `None` when no Slack account matches the email.
    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<SlackUser>>;
    async fn post_message(&self, channel: &str, text: &str) -> Result<()>;
}

#[derive(Clone)]
pub struct SlackClient {
    http_client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    ok: bool,
    #[serde(default)]
    user: Option<SlackUser>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.slack_api_url.clone(),
            token: config.slack_token.clone(),
        }
    }
}

#[async_trait]
impl SlackApi for SlackClient {
    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<SlackUser>> {
        let response: LookupResponse = self
            .http_client
            .get(format!("{}/users.lookupByEmail", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .query(&[("email", email)])
            .send()
            .await?
            .json()
            .await?;

        if response.ok {
            return Ok(response.user);
        }
        match response.error.as_deref() {
            Some("users_not_found") => Ok(None),
            other => Err(AppError::ExternalService(format!(
                "Slack users.lookupByEmail failed: {}",
                other.unwrap_or("unknown error")
            ))),
        }
    }

    async fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        let response: PostMessageResponse = self
            .http_client
            .post(format!("{}/chat.postMessage", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&serde_json::json!({ "channel": channel, "text": text }))
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(AppError::ExternalService(format!(
                "Slack chat.postMessage failed: {}",
                response.error.as_deref().unwrap_or("unknown error")
            )));
        }
        Ok(())
    }
}

/// Delivery gateway: resolves each message's recipient to a Slack user and
/// posts them all concurrently.
#[derive(Clone)]
pub struct SlackService {
    api: Arc<dyn SlackApi>,
    directory: Directory,
}

impl SlackService {
    pub fn new(api: Arc<dyn SlackApi>, directory: Directory) -> Self {
        Self { api, directory }
    }

    /// Deliver a batch. Sends run as independent concurrent tasks: a
    /// recipient without a directory entry is skipped silently, and one
    /// failed send never suppresses its siblings. The batch completes when
    /// every task has completed.
    pub async fn send_messages(&self, messages: &[Message]) -> Result<()> {
        let sends = messages.iter().map(|message| self.send_one(message));
        for (message, result) in messages.iter().zip(join_all(sends).await) {
            if let Err(e) = result {
                warn!("failed to deliver to {:?}: {}", message.recipient, e);
            }
        }
        Ok(())
    }

    async fn send_one(&self, message: &Message) -> Result<()> {
        let email = match &message.recipient {
            Recipient::GithubLogin(login) => match self.directory.resolve(login) {
                Some(email) => email.to_string(),
                None => {
                    debug!("no directory entry for {}, skipping", login);
                    return Ok(());
                }
            },
            Recipient::Email(email) => email.clone(),
        };

        let user = match self.api.lookup_user_by_email(&email).await? {
            Some(user) => user,
            None => {
                warn!("no Slack user found for {}, skipping", email);
                return Ok(());
            }
        };

        self.api.post_message(&user.id, &message.body).await
    }
}
