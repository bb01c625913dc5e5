use crate::{
    error::{AppError, Result},
    models::github::{
        GithubEvent, IssueCommentPayload, PullRequest, PullRequestComment, PullRequestPayload,
        ReviewCommentPayload, ReviewPayload, ReviewState,
    },
    models::Message,
    services::{github_api::GithubApi, involvement::involved_users, Directory, SlackService},
    utils::slack_link,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns GitHub webhook events into notification messages and forwards the
/// resulting batch to Slack delivery. Holds no mutable state; every event is
/// handled independently against the injected API and directory.
#[derive(Clone)]
pub struct GithubService {
    api: Arc<dyn GithubApi>,
    directory: Directory,
    slack_service: SlackService,
}

impl GithubService {
    pub fn new(api: Arc<dyn GithubApi>, directory: Directory, slack_service: SlackService) -> Self {
        Self {
            api,
            directory,
            slack_service,
        }
    }

    /// Entry point for one GitHub event. Classifies, then delivers the whole
    /// batch in one call; "nothing to do" resolves Ok with zero sends.
    pub async fn handle(&self, event: GithubEvent) -> Result<()> {
        let messages = match event {
            GithubEvent::PullRequest(payload) => self.on_pull_request(payload).await?,
            GithubEvent::Review(payload) => self.on_review(payload).await?,
            GithubEvent::ReviewComment(payload) => self.on_review_comment(payload).await?,
            GithubEvent::IssueComment(payload) => self.on_issue_comment(payload).await?,
            GithubEvent::Unhandled(name) => {
                info!("unhandled GitHub event: {}", name);
                Vec::new()
            }
        };

        if !messages.is_empty() {
            debug!("sending {} notification(s)", messages.len());
            self.slack_service.send_messages(&messages).await?;
        }

        Ok(())
    }

    /// `pull_request` events: only `review_requested` notifies, and only the
    /// reviewer added by this specific event. The payload's full
    /// `requested_reviewers` list may contain reviewers requested earlier
    /// who were already notified.
    async fn on_pull_request(&self, payload: PullRequestPayload) -> Result<Vec<Message>> {
        if payload.action != "review_requested" {
            return Ok(Vec::new());
        }

        let reviewer = payload.requested_reviewer.ok_or_else(|| {
            AppError::Configuration(
                "requested reviewer not found on review request event".to_string(),
            )
        })?;
        let pr = &payload.pull_request;

        Ok(vec![Message::to_login(
            reviewer.login,
            format!(
                "{} requested your review on a PR: {}",
                pr.user.login,
                slack_link(&pr.html_url, &pr.title)
            ),
        )])
    }

    /// `pull_request_review` events with action `submitted`. The recipient
    /// set depends on the review outcome: approvals only concern the owner,
    /// everything else goes to the full involved set.
    async fn on_review(&self, payload: ReviewPayload) -> Result<Vec<Message>> {
        if payload.action != "submitted" {
            return Ok(Vec::new());
        }

        let pr = &payload.pull_request;
        let review = &payload.review;

        if self.directory.is_blocked(&review.user.login) {
            info!(
                "{} is blocklisted -- not sending a notification",
                review.user.login
            );
            return Ok(Vec::new());
        }

        let (verb, recipients) = match review.state {
            ReviewState::Approved => {
                // only the PR owner needs to hear about approvals
                ("approved", vec![pr.user.clone()])
            }
            ReviewState::ChangesRequested => (
                "requested changes to",
                involved_users(self.api.as_ref(), pr).await?,
            ),
            ReviewState::Commented => {
                // GitHub re-fires a bodiless "commented" review alongside
                // inline comment batches; those already notify through the
                // review-comment event, so suppress the duplicate
                if review.body.as_deref().map_or(true, |b| b.trim().is_empty()) {
                    debug!("commented review with no body text, ignoring");
                    return Ok(Vec::new());
                }
                ("commented on", involved_users(self.api.as_ref(), pr).await?)
            }
            ReviewState::Other => return Ok(Vec::new()),
        };

        // never notify the review's own author, and only ever send one
        // message per recipient
        let mut seen = HashSet::new();
        let messages = recipients
            .into_iter()
            .filter(|user| user.login != review.user.login)
            .filter(|user| seen.insert(user.login.clone()))
            .map(|recipient| {
                let a_or_your = if recipient.login == pr.user.login {
                    "your"
                } else {
                    "a"
                };
                Message::to_login(
                    recipient.login,
                    format!(
                        "{} {} {} PR: {}",
                        review.user.login,
                        slack_link(&review.html_url, verb),
                        a_or_your,
                        slack_link(&pr.html_url, &pr.title)
                    ),
                )
            })
            .collect();

        Ok(messages)
    }

    /// Inline diff comments (`pull_request_review_comment`, action `created`).
    async fn on_review_comment(&self, payload: ReviewCommentPayload) -> Result<Vec<Message>> {
        if payload.action != "created" {
            return Ok(Vec::new());
        }

        self.comment_messages(&payload.pull_request, &payload.comment)
            .await
    }

    /// Top-level comments (`issue_comment`, action `created`). Issue comments
    /// target a generic issue that may or may not be PR-backed; plain issues
    /// are silently ignored.
    async fn on_issue_comment(&self, payload: IssueCommentPayload) -> Result<Vec<Message>> {
        if payload.action != "created" {
            return Ok(Vec::new());
        }

        let pr = match self.api.issue_pull_request(&payload.issue).await? {
            Some(pr) => pr,
            None => {
                debug!("comment on an issue with no linked pull request, ignoring");
                return Ok(Vec::new());
            }
        };

        self.comment_messages(&pr, &payload.comment).await
    }

    /// Shared recipient computation for both comment flavors: everyone
    /// involved with the PR, minus the comment's author. Identical wording
    /// for every recipient.
    async fn comment_messages(
        &self,
        pr: &PullRequest,
        comment: &PullRequestComment,
    ) -> Result<Vec<Message>> {
        if self.directory.is_blocked(&comment.user.login) {
            info!(
                "{} is blocklisted -- not sending a notification",
                comment.user.login
            );
            return Ok(Vec::new());
        }

        let recipients = involved_users(self.api.as_ref(), pr).await?;

        Ok(recipients
            .into_iter()
            .filter(|user| user.login != comment.user.login)
            .map(|user| {
                Message::to_login(
                    user.login,
                    format!(
                        "{} {} {}: {}",
                        comment.user.login,
                        slack_link(&comment.html_url, "commented on"),
                        slack_link(&pr.html_url, &pr.title),
                        comment.body
                    ),
                )
            })
            .collect())
    }
}
