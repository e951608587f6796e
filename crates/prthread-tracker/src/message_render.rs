//! Slack mrkdwn rendering for root messages and author mentions.

use crate::notification::PullRequestResource;

/// Renders a resolved chat user id as a mention.
pub fn render_user_mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

fn render_pull_request_link(resource: &PullRequestResource) -> String {
    format!(
        "<{}|*{}*> for *{}*",
        resource.web_link(),
        resource.title,
        resource.repository.name
    )
}

/// Root message for a pull request opened ready for review.
pub fn render_created_message(author: &str, resource: &PullRequestResource) -> String {
    format!(
        "{author} has created a new PR - {}",
        render_pull_request_link(resource)
    )
}

/// Root message for a draft that has been marked ready for review.
pub fn render_ready_for_review_message(author: &str, resource: &PullRequestResource) -> String {
    format!(
        "{author} has moved their PR from draft, and is ready to be reviewed - {}",
        render_pull_request_link(resource)
    )
}
