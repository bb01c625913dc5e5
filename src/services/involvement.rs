use crate::{
    error::Result,
    models::github::{GithubUser, PullRequest},
    services::github_api::GithubApi,
};
use std::collections::HashSet;

/// Everyone involved with a pull request: the owner, the requested
/// reviewers, and every distinct comment and review author, deduplicated by
/// login with first occurrence winning (owner always first).
///
/// The two list fetches run concurrently; if either fails the whole
/// aggregation fails, so callers never act on a partial involved set.
pub async fn involved_users(api: &dyn GithubApi, pr: &PullRequest) -> Result<Vec<GithubUser>> {
    let (comments, reviews) = tokio::try_join!(api.list_comments(pr), api.list_reviews(pr))?;

    let candidates = std::iter::once(pr.user.clone())
        .chain(pr.requested_reviewers.iter().cloned())
        .chain(comments.into_iter().map(|comment| comment.user))
        .chain(reviews.into_iter().map(|review| review.user));

    let mut seen = HashSet::new();
    let mut users = Vec::new();
    for user in candidates {
        if seen.insert(user.login.clone()) {
            users.push(user);
        }
    }

    Ok(users)
}
