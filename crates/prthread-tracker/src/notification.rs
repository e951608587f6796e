//! Azure DevOps pull request service-hook payloads.

use serde::Deserialize;

use crate::pull_request::{PullRequestId, PullRequestSnapshot, ReviewerVote};

pub const PULL_REQUEST_CREATED_EVENT: &str = "git.pullrequest.created";
pub const PULL_REQUEST_UPDATED_EVENT: &str = "git.pullrequest.updated";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Notification kinds accepted by the webhook routes.
pub enum NotificationKind {
    Created,
    Updated,
}

impl NotificationKind {
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Created => PULL_REQUEST_CREATED_EVENT,
            Self::Updated => PULL_REQUEST_UPDATED_EVENT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "create",
            Self::Updated => "update",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Service-hook envelope for pull request create and update events.
pub struct PullRequestNotification {
    pub event_type: String,
    pub resource: PullRequestResource,
}

impl PullRequestNotification {
    pub fn matches(&self, kind: NotificationKind) -> bool {
        self.event_type == kind.event_type()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestResource {
    #[serde(default)]
    pub repository: RepositoryRef,
    pub pull_request_id: PullRequestId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_by: PullRequestCreator,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub reviewers: Vec<ReviewerVote>,
    #[serde(default)]
    pub url: String,
}

impl PullRequestResource {
    /// Extracts the fields tracked between notifications.
    pub fn snapshot(&self) -> PullRequestSnapshot {
        PullRequestSnapshot {
            status: self.status.clone(),
            is_draft: self.is_draft,
            reviewers: self.reviewers.clone(),
        }
    }

    /// Browser link to the pull request page.
    pub fn web_link(&self) -> String {
        format!(
            "{}/pullrequest/{}",
            self.repository.web_url.trim_end_matches('/'),
            self.pull_request_id
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    #[serde(default)]
    pub project: RepositoryProject,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub web_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryProject {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestCreator {
    #[serde(default)]
    pub display_name: String,
    /// Azure DevOps carries the author's email in `uniqueName`.
    #[serde(default, rename = "uniqueName")]
    pub email: String,
}

/// Decodes a webhook request body.
pub fn parse_notification(body: &[u8]) -> Result<PullRequestNotification, serde_json::Error> {
    serde_json::from_slice(body)
}
