use crate::{
    error::Result,
    models::jira::{CommentCreatedPayload, IssueUpdatedPayload, JiraEvent},
    models::Message,
    services::{
        jira_api::{jira_base_url, JiraApi},
        Directory, SlackService,
    },
    utils::slack_link,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Turns Jira webhook events into notification messages. Jira recipients are
/// addressed by email directly (watcher lists already carry emails), so no
/// directory lookup happens on the recipient side; the directory only
/// supplies the actor blocklist.
#[derive(Clone)]
pub struct JiraService {
    api: Arc<dyn JiraApi>,
    directory: Directory,
    slack_service: SlackService,
}

impl JiraService {
    pub fn new(api: Arc<dyn JiraApi>, directory: Directory, slack_service: SlackService) -> Self {
        Self {
            api,
            directory,
            slack_service,
        }
    }

    pub async fn handle(&self, event: JiraEvent) -> Result<()> {
        let messages = match event {
            JiraEvent::CommentCreated(payload) => self.on_comment_created(payload).await?,
            JiraEvent::IssueUpdated(payload) => self.on_issue_updated(payload).await?,
            JiraEvent::Unhandled(name) => {
                info!("unhandled Jira event: {}", name);
                Vec::new()
            }
        };

        if !messages.is_empty() {
            debug!("sending {} notification(s)", messages.len());
            self.slack_service.send_messages(&messages).await?;
        }

        Ok(())
    }

    /// A comment was added to an issue: notify every watcher except the
    /// comment's author.
    async fn on_comment_created(&self, payload: CommentCreatedPayload) -> Result<Vec<Message>> {
        let base = jira_base_url(&payload.issue.self_url)?.to_string();

        let (watchers, issue, author) = tokio::try_join!(
            self.api.issue_watchers(&payload.issue),
            self.api.full_issue(&payload.issue),
            self.api.user(&base, &payload.comment.author.account_id),
        )?;

        if self.directory.is_blocked(&author.name) {
            info!("{} is blocklisted -- not sending a notification", author.name);
            return Ok(Vec::new());
        }

        let view_url = issue_view_url(&base, &payload.issue.key);

        Ok(watchers
            .watchers
            .into_iter()
            .filter_map(|watcher| watcher.email_address)
            .filter(|email| *email != author.email_address)
            .map(|email| {
                Message::to_email(
                    email,
                    format!(
                        "{} commented on Jira issue: {}: {}",
                        author.name,
                        slack_link(&view_url, &issue.fields.summary),
                        payload.comment.body
                    ),
                )
            })
            .collect())
    }

    /// An issue changed: notify newly assigned users, one message per
    /// assignee change in the changelog.
    async fn on_issue_updated(&self, payload: IssueUpdatedPayload) -> Result<Vec<Message>> {
        let base = jira_base_url(&payload.issue.self_url)?.to_string();

        let (issue, updater) = tokio::try_join!(
            self.api.full_issue(&payload.issue),
            self.api.user(&base, &payload.user.account_id),
        )?;

        if self.directory.is_blocked(&updater.name) {
            info!(
                "{} is blocklisted -- not sending a notification",
                updater.name
            );
            return Ok(Vec::new());
        }

        let view_url = issue_view_url(&base, &payload.issue.key);
        let mut messages = Vec::new();

        for change in &payload.changelog.items {
            if change.field != "assignee" {
                continue;
            }
            let account_id = match change.to.as_deref() {
                Some(id) if !id.is_empty() => id,
                _ => continue,
            };

            let assignee = self.api.user(&base, account_id).await?;

            // don't notify users who assign themselves
            if assignee.email_address == updater.email_address {
                continue;
            }

            messages.push(Message::to_email(
                assignee.email_address,
                format!(
                    "{} assigned you to Jira issue: {}",
                    updater.name,
                    slack_link(&view_url, &issue.fields.summary)
                ),
            ));
        }

        Ok(messages)
    }
}

fn issue_view_url(base_url: &str, key: &str) -> String {
    format!("{}/browse/issue/{}", base_url, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::jira::{
        Changelog, ChangelogItem, CommentAuthor, IssueComment, JiraIssue, JiraIssueFields,
        JiraUser, PartialIssue, PartialUser, Watcher, WatchersPayload,
    };
    use crate::models::Recipient;
    use crate::services::slack::testing::RecordingSlackApi;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};

    struct FakeJiraApi {
        watchers: Vec<Watcher>,
        summary: String,
        users: HashMap<String, JiraUser>,
    }

    #[async_trait]
    impl JiraApi for FakeJiraApi {
        async fn issue_watchers(&self, _issue: &PartialIssue) -> Result<WatchersPayload> {
            Ok(WatchersPayload {
                watchers: self.watchers.clone(),
            })
        }

        async fn full_issue(&self, _issue: &PartialIssue) -> Result<JiraIssue> {
            Ok(JiraIssue {
                fields: JiraIssueFields {
                    summary: self.summary.clone(),
                },
            })
        }

        async fn user(&self, _base_url: &str, account_id: &str) -> Result<JiraUser> {
            self.users
                .get(account_id)
                .cloned()
                .ok_or_else(|| AppError::ExternalService("no such user".to_string()))
        }
    }

    fn jira_user(name: &str, email: &str) -> JiraUser {
        JiraUser {
            name: name.to_string(),
            display_name: Some(name.to_string()),
            email_address: email.to_string(),
        }
    }

    fn watcher(account_id: &str, email: Option<&str>) -> Watcher {
        Watcher {
            account_id: account_id.to_string(),
            email_address: email.map(String::from),
        }
    }

    fn partial_issue() -> PartialIssue {
        PartialIssue {
            self_url: "http://jira.example.com/rest/api/2/issue/1234".to_string(),
            key: "REL-1".to_string(),
        }
    }

    fn service_with(api: FakeJiraApi, blocklist: HashSet<String>) -> (JiraService, Arc<RecordingSlackApi>) {
        let slack_api = Arc::new(RecordingSlackApi::default());
        let directory = Directory::new(HashMap::new(), blocklist);
        let slack_service = SlackService::new(slack_api.clone(), directory.clone());
        (
            JiraService::new(Arc::new(api), directory, slack_service),
            slack_api,
        )
    }

    fn emails(messages: &[Message]) -> Vec<&str> {
        messages
            .iter()
            .map(|m| match &m.recipient {
                Recipient::Email(email) => email.as_str(),
                Recipient::GithubLogin(login) => login.as_str(),
            })
            .collect()
    }

    #[tokio::test]
    async fn comment_notifies_watchers_except_the_author() {
        let api = FakeJiraApi {
            watchers: vec![
                watcher("w1", Some("w1@email.com")),
                watcher("author", Some("author@email.com")),
                watcher("w2", Some("w2@email.com")),
            ],
            summary: "Fix the relay".to_string(),
            users: HashMap::from([(
                "author".to_string(),
                jira_user("author", "author@email.com"),
            )]),
        };
        let (service, _) = service_with(api, HashSet::new());

        let messages = service
            .on_comment_created(CommentCreatedPayload {
                issue: partial_issue(),
                comment: IssueComment {
                    author: CommentAuthor {
                        account_id: "author".to_string(),
                        display_name: None,
                    },
                    body: "done".to_string(),
                },
            })
            .await
            .unwrap();

        assert_eq!(emails(&messages), ["w1@email.com", "w2@email.com"]);
        assert!(messages[0].body.contains(
            "author commented on Jira issue: \
             <http://jira.example.com/browse/issue/REL-1|Fix the relay>: done"
        ));
    }

    #[tokio::test]
    async fn watchers_without_emails_are_skipped() {
        let api = FakeJiraApi {
            watchers: vec![watcher("w1", None), watcher("w2", Some("w2@email.com"))],
            summary: "Fix the relay".to_string(),
            users: HashMap::from([(
                "author".to_string(),
                jira_user("author", "author@email.com"),
            )]),
        };
        let (service, _) = service_with(api, HashSet::new());

        let messages = service
            .on_comment_created(CommentCreatedPayload {
                issue: partial_issue(),
                comment: IssueComment {
                    author: CommentAuthor {
                        account_id: "author".to_string(),
                        display_name: None,
                    },
                    body: "done".to_string(),
                },
            })
            .await
            .unwrap();

        assert_eq!(emails(&messages), ["w2@email.com"]);
    }

    #[tokio::test]
    async fn blocklisted_comment_author_produces_no_messages() {
        let api = FakeJiraApi {
            watchers: vec![watcher("w1", Some("w1@email.com"))],
            summary: "Fix the relay".to_string(),
            users: HashMap::from([("quux".to_string(), jira_user("quux", "quux@email.com"))]),
        };
        let (service, _) = service_with(api, HashSet::from(["quux".to_string()]));

        let messages = service
            .on_comment_created(CommentCreatedPayload {
                issue: partial_issue(),
                comment: IssueComment {
                    author: CommentAuthor {
                        account_id: "quux".to_string(),
                        display_name: None,
                    },
                    body: "hmm".to_string(),
                },
            })
            .await
            .unwrap();

        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn assignment_notifies_the_new_assignee() {
        let api = FakeJiraApi {
            watchers: vec![],
            summary: "Fix the relay".to_string(),
            users: HashMap::from([
                ("lead".to_string(), jira_user("lead", "lead@email.com")),
                ("dev".to_string(), jira_user("dev", "dev@email.com")),
            ]),
        };
        let (service, _) = service_with(api, HashSet::new());

        let messages = service
            .on_issue_updated(IssueUpdatedPayload {
                issue: partial_issue(),
                user: PartialUser {
                    account_id: "lead".to_string(),
                },
                changelog: Changelog {
                    items: vec![
                        ChangelogItem {
                            field: "status".to_string(),
                            to: Some("3".to_string()),
                        },
                        ChangelogItem {
                            field: "assignee".to_string(),
                            to: Some("dev".to_string()),
                        },
                    ],
                },
            })
            .await
            .unwrap();

        assert_eq!(emails(&messages), ["dev@email.com"]);
        assert!(messages[0].body.contains(
            "lead assigned you to Jira issue: \
             <http://jira.example.com/browse/issue/REL-1|Fix the relay>"
        ));
    }

    #[tokio::test]
    async fn self_assignment_is_not_notified() {
        let api = FakeJiraApi {
            watchers: vec![],
            summary: "Fix the relay".to_string(),
            users: HashMap::from([("lead".to_string(), jira_user("lead", "lead@email.com"))]),
        };
        let (service, _) = service_with(api, HashSet::new());

        let messages = service
            .on_issue_updated(IssueUpdatedPayload {
                issue: partial_issue(),
                user: PartialUser {
                    account_id: "lead".to_string(),
                },
                changelog: Changelog {
                    items: vec![ChangelogItem {
                        field: "assignee".to_string(),
                        to: Some("lead".to_string()),
                    }],
                },
            })
            .await
            .unwrap();

        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn unassignment_is_ignored() {
        let api = FakeJiraApi {
            watchers: vec![],
            summary: "Fix the relay".to_string(),
            users: HashMap::from([("lead".to_string(), jira_user("lead", "lead@email.com"))]),
        };
        let (service, _) = service_with(api, HashSet::new());

        let messages = service
            .on_issue_updated(IssueUpdatedPayload {
                issue: partial_issue(),
                user: PartialUser {
                    account_id: "lead".to_string(),
                },
                changelog: Changelog {
                    items: vec![ChangelogItem {
                        field: "assignee".to_string(),
                        to: None,
                    }],
                },
            })
            .await
            .unwrap();

        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn unhandled_event_sends_nothing() {
        let api = FakeJiraApi {
            watchers: vec![],
            summary: String::new(),
            users: HashMap::new(),
        };
        let (service, slack) = service_with(api, HashSet::new());

        service
            .handle(JiraEvent::Unhandled("jira:worklog_updated".to_string()))
            .await
            .unwrap();

        assert!(slack.posts().is_empty());
    }
}
