pub mod github;
pub mod jira;
