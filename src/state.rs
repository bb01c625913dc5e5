use crate::{
    config::Config,
    services::{GithubService, JiraService},
};

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (webhook secret lives here).
    pub config: Config,

    /// GitHub event handling.
    pub github_service: GithubService,

    /// Jira event handling.
    pub jira_service: JiraService,
}
