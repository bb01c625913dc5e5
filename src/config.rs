use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub server_host: String,
    pub server_port: u16,
    pub environment: String,
    pub log_level: String,

    // GitHub configuration
    pub github_token: String,
    pub github_webhook_secret: String,

    // Jira configuration (the token takes the place of a password)
    pub jira_username: String,
    pub jira_token: String,

    // Slack configuration
    pub slack_token: String,
    pub slack_api_url: String,

    // Notification routing: GitHub login -> email, plus blocked actors
    pub users: HashMap<String, String>,
    pub blocklist: HashSet<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let users_string = env::var("NOTIFY_USERS").unwrap_or_else(|_| "{}".to_string());
        let users = serde_json::from_str(&users_string).map_err(|_| {
            anyhow::anyhow!("NOTIFY_USERS must be a JSON object mapping logins to emails")
        })?;

        let blocklist = env::var("NOTIFY_BLOCKLIST")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|login| !login.is_empty())
            .map(String::from)
            .collect();

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            github_token: env::var("GITHUB_TOKEN").unwrap_or_default(),
            github_webhook_secret: env::var("GITHUB_WEBHOOK_SECRET")
                .map_err(|_| anyhow::anyhow!("GITHUB_WEBHOOK_SECRET must be set"))?,

            jira_username: env::var("JIRA_USERNAME").unwrap_or_default(),
            jira_token: env::var("JIRA_TOKEN").unwrap_or_default(),

            slack_token: env::var("SLACK_TOKEN")
                .map_err(|_| anyhow::anyhow!("SLACK_TOKEN must be set"))?,
            slack_api_url: env::var("SLACK_API_URL")
                .unwrap_or_else(|_| "https://slack.com/api".to_string()),

            users,
            blocklist,
        })
    }
}
