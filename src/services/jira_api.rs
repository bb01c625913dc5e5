use crate::{
    config::Config,
    error::{AppError, Result},
    models::jira::{JiraIssue, JiraUser, PartialIssue, WatchersPayload},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Derive the Jira base URL (e.g. `http://jira.example.com`) from any REST
/// URL such as `http://jira.example.com/rest/api/2/issue/1234`.
///
/// The `self` URL Jira puts on webhook issues is not directly fetchable, so
/// every API URL is rebuilt from the base instead.
pub fn jira_base_url(rest_url: &str) -> Result<&str> {
    rest_url
        .find("/rest/api")
        .map(|idx| &rest_url[..idx])
        .ok_or_else(|| {
            AppError::Configuration(format!(
                "can't identify Jira base URL from REST URL: {}",
                rest_url
            ))
        })
}

/// Read access to the Jira REST API, as required by the Jira classifiers.
#[async_trait]
pub trait JiraApi: Send + Sync {
    async fn issue_watchers(&self, issue: &PartialIssue) -> Result<WatchersPayload>;
    async fn full_issue(&self, issue: &PartialIssue) -> Result<JiraIssue>;
    async fn user(&self, base_url: &str, account_id: &str) -> Result<JiraUser>;
}

#[derive(Clone)]
pub struct JiraClient {
    http_client: Client,
    username: String,
    token: String,
}

impl JiraClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            username: config.jira_username.clone(),
            token: config.jira_token.clone(),
        }
    }

    // the API token takes the place of a password in basic auth
    async fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .basic_auth(&self.username, Some(&self.token))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "Jira API returned {} for {}",
                status, url
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl JiraApi for JiraClient {
    async fn issue_watchers(&self, issue: &PartialIssue) -> Result<WatchersPayload> {
        let base = jira_base_url(&issue.self_url)?;
        self.get(
            &format!("{}/rest/api/2/issue/{}/watchers", base, issue.key),
            &[],
        )
        .await
    }

    async fn full_issue(&self, issue: &PartialIssue) -> Result<JiraIssue> {
        let base = jira_base_url(&issue.self_url)?;
        self.get(&format!("{}/rest/api/2/issue/{}", base, issue.key), &[])
            .await
    }

    async fn user(&self, base_url: &str, account_id: &str) -> Result<JiraUser> {
        self.get(
            &format!("{}/rest/api/2/user", base_url),
            &[("accountId", account_id)],
        )
        .await
    }
}
