pub mod directory;
pub mod github;
pub mod github_api;
pub mod involvement;
pub mod jira;
pub mod jira_api;
pub mod slack;

pub use directory::Directory;
pub use github::GithubService;
pub use github_api::{GithubApi, GithubClient};
pub use jira::JiraService;
pub use jira_api::{JiraApi, JiraClient};
pub use slack::{SlackApi, SlackClient, SlackService};
