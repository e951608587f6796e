//! Tracked pull request state and reviewer vote model.

use serde::{Deserialize, Serialize};

use crate::thread_sink::MessageHandle;

/// Azure DevOps pull request identifier.
pub type PullRequestId = i64;

/// Status token that ends tracking for a pull request.
pub const TERMINAL_STATUS: &str = "completed";

/// Maps a reviewer vote code to its chat label. Unknown codes render empty.
pub fn vote_label(vote: i32) -> &'static str {
    match vote {
        10 => "approved",
        5 => "approved (with suggestions)",
        0 => "reset",
        -10 => "rejected",
        _ => "",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One reviewer entry as delivered by the webhook source.
pub struct ReviewerVote {
    #[serde(default)]
    pub vote: i32,
    #[serde(default)]
    pub display_name: String,
    /// Stable correlation key for the reviewer.
    #[serde(default)]
    pub unique_name: String,
    #[serde(default)]
    pub is_required: bool,
}

impl ReviewerVote {
    pub fn vote_label(&self) -> &'static str {
        vote_label(self.vote)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Fields compared between two notifications for the same pull request.
pub struct PullRequestSnapshot {
    pub status: String,
    pub is_draft: bool,
    pub reviewers: Vec<ReviewerVote>,
}

impl PullRequestSnapshot {
    pub fn is_terminal(&self) -> bool {
        self.status == TERMINAL_STATUS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Snapshot store entry for a pull request.
///
/// `root_message` stays `None` while the pull request is draft-suppressed;
/// `channel` is assigned at creation and never changes afterwards.
pub struct TrackedPullRequest {
    pub id: PullRequestId,
    pub channel: String,
    pub root_message: Option<MessageHandle>,
    pub snapshot: PullRequestSnapshot,
}

impl TrackedPullRequest {
    pub fn has_posted_root(&self) -> bool {
        self.root_message.is_some()
    }
}
