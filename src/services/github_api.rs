use crate::{
    config::Config,
    error::{AppError, Result},
    models::github::{Issue, PullRequest, PullRequestComment, PullRequestReview},
};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;

/// Read access to the GitHub REST API, as required by the involvement
/// aggregator and the issue-comment classifier. A trait so that classifiers
/// can be exercised against deterministic fakes.
#[async_trait]
pub trait GithubApi: Send + Sync {
    async fn list_comments(&self, pr: &PullRequest) -> Result<Vec<PullRequestComment>>;
    async fn list_reviews(&self, pr: &PullRequest) -> Result<Vec<PullRequestReview>>;
    /// The pull request backing an issue, or `None` for plain issues.
    async fn issue_pull_request(&self, issue: &Issue) -> Result<Option<PullRequest>>;
}

#[derive(Clone)]
pub struct GithubClient {
    http_client: Client,
    token: String,
}

impl GithubClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: Client::new(),
            token: config.github_token.clone(),
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .header(header::AUTHORIZATION, format!("token {}", self.token))
            .header(header::USER_AGENT, "review-relay")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "GitHub API returned {} for {}",
                status, url
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    async fn list_comments(&self, pr: &PullRequest) -> Result<Vec<PullRequestComment>> {
        self.get(&format!("{}/comments", pr.url)).await
    }

    async fn list_reviews(&self, pr: &PullRequest) -> Result<Vec<PullRequestReview>> {
        self.get(&format!("{}/reviews", pr.url)).await
    }

    async fn issue_pull_request(&self, issue: &Issue) -> Result<Option<PullRequest>> {
        match &issue.pull_request {
            Some(stub) => Ok(Some(self.get(&stub.url).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::github::GithubUser;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(token: &str) -> GithubClient {
        GithubClient {
            http_client: Client::new(),
            token: token.to_string(),
        }
    }

    fn fake_pr(api_base: &str) -> PullRequest {
        PullRequest {
            id: 1,
            url: format!("{}/repo/pulls/1234", api_base),
            html_url: "http://github.com/repo/pulls/1234".to_string(),
            user: GithubUser {
                login: "foo".to_string(),
            },
            title: "Fake PR".to_string(),
            requested_reviewers: vec![],
        }
    }

    #[tokio::test]
    async fn lists_comments_with_token_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repo/pulls/1234/comments"))
            .and(header("authorization", "token GITHUB_TOKEN"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"html_url": "http://github.com/c/1", "body": "Hmm.", "user": {"login": "bar"}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client("GITHUB_TOKEN");
        let comments = client.list_comments(&fake_pr(&server.uri())).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].user.login, "bar");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repo/pulls/1234/reviews"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = test_client("GITHUB_TOKEN");
        let result = client.list_reviews(&fake_pr(&server.uri())).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }

    #[tokio::test]
    async fn plain_issue_has_no_pull_request() {
        let client = test_client("GITHUB_TOKEN");
        let issue = Issue { pull_request: None };
        assert!(client.issue_pull_request(&issue).await.unwrap().is_none());
    }
}
