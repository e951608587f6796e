//! Applies pull request notifications to the snapshot store and chat thread.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::diff_engine::{compare_snapshots, ChangeKind};
use crate::message_render::{
    render_created_message, render_ready_for_review_message, render_user_mention,
};
use crate::notification::{PullRequestCreator, PullRequestResource};
use crate::project_channels::ProjectChannels;
use crate::pull_request::{PullRequestId, PullRequestSnapshot, TrackedPullRequest};
use crate::snapshot_store::SnapshotStore;
use crate::thread_sink::{MessageHandle, ThreadSink, ThreadSinkError};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the router did with an accepted notification.
pub enum RouteOutcome {
    DuplicateCreate,
    UnknownProject,
    TrackedAsDraft,
    RootPosted,
    UnknownPullRequest,
    Unchanged,
    DraftPromoted,
    DraftRefreshed,
    DraftClosed,
    ReplyPosted(ChangeKind),
    ThreadClosed { deleted_replies: usize },
}

impl RouteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DuplicateCreate => "duplicate_create",
            Self::UnknownProject => "unknown_project",
            Self::TrackedAsDraft => "tracked_as_draft",
            Self::RootPosted => "root_posted",
            Self::UnknownPullRequest => "unknown_pull_request",
            Self::Unchanged => "unchanged",
            Self::DraftPromoted => "draft_promoted",
            Self::DraftRefreshed => "draft_refreshed",
            Self::DraftClosed => "draft_closed",
            Self::ReplyPosted(_) => "reply_posted",
            Self::ThreadClosed { .. } => "thread_closed",
        }
    }
}

#[derive(Debug, Error)]
/// Per-notification failures. None of them affect other pull requests.
pub enum RouterError {
    #[error("failed to post message for pull request {pull_request_id} to {channel}: {source}")]
    Send {
        pull_request_id: PullRequestId,
        channel: String,
        #[source]
        source: ThreadSinkError,
    },
    #[error("failed to list thread replies for pull request {pull_request_id}: {source}")]
    ListReplies {
        pull_request_id: PullRequestId,
        #[source]
        source: ThreadSinkError,
    },
    #[error("failed to delete thread reply {message} for pull request {pull_request_id}: {source}")]
    DeleteReply {
        pull_request_id: PullRequestId,
        message: MessageHandle,
        #[source]
        source: ThreadSinkError,
    },
}

impl RouterError {
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send_failed",
            Self::ListReplies { .. } => "cleanup_list_failed",
            Self::DeleteReply { .. } => "cleanup_delete_failed",
        }
    }
}

/// Drives the pull request lifecycle for create and update notifications.
pub struct EventRouter {
    store: Arc<SnapshotStore>,
    sink: Arc<dyn ThreadSink>,
    channels: ProjectChannels,
}

impl EventRouter {
    pub fn new(
        store: Arc<SnapshotStore>,
        sink: Arc<dyn ThreadSink>,
        channels: ProjectChannels,
    ) -> Self {
        Self {
            store,
            sink,
            channels,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Starts tracking a newly created pull request.
    pub async fn handle_created(
        &self,
        resource: &PullRequestResource,
    ) -> Result<RouteOutcome, RouterError> {
        let id = resource.pull_request_id;
        let _guard = self.store.lock(id).await;

        if self.store.contains(id) {
            info!(pull_request_id = id, "create notification for already tracked pull request");
            return Ok(RouteOutcome::DuplicateCreate);
        }

        let project = resource.repository.project.name.as_str();
        let Some(channel) = self.channels.channel_for(project) else {
            info!(
                pull_request_id = id,
                project, "no channel configured for project, not tracking"
            );
            return Ok(RouteOutcome::UnknownProject);
        };

        let mut tracked = TrackedPullRequest {
            id,
            channel: channel.to_string(),
            root_message: None,
            snapshot: resource.snapshot(),
        };

        if resource.is_draft {
            info!(
                pull_request_id = id,
                channel, "pull request is a draft, holding root message"
            );
            self.store.put(tracked);
            return Ok(RouteOutcome::TrackedAsDraft);
        }

        let author = self.resolve_author(&resource.created_by).await;
        let text = render_created_message(&author, resource);
        let root = self.send(&tracked, &text, None).await?;
        info!(pull_request_id = id, channel, root = %root, "posted root message");
        tracked.root_message = Some(root);
        self.store.put(tracked);
        Ok(RouteOutcome::RootPosted)
    }

    /// Diffs an update against the tracked snapshot and mirrors the change.
    pub async fn handle_updated(
        &self,
        resource: &PullRequestResource,
    ) -> Result<RouteOutcome, RouterError> {
        let id = resource.pull_request_id;
        let _guard = self.store.lock(id).await;

        let Some(tracked) = self.store.get(id) else {
            info!(pull_request_id = id, "update for untracked pull request dropped");
            return Ok(RouteOutcome::UnknownPullRequest);
        };

        let incoming = resource.snapshot();
        let change = compare_snapshots(&tracked.snapshot, &incoming);
        if !change.has_change() {
            debug!(pull_request_id = id, "update carries no visible change");
            return Ok(RouteOutcome::Unchanged);
        }

        let Some(root) = tracked.root_message.clone() else {
            if change.kind == ChangeKind::DraftChanged {
                let author = self.resolve_author(&resource.created_by).await;
                let text = render_ready_for_review_message(&author, resource);
                let root = self.send(&tracked, &text, None).await?;
                info!(
                    pull_request_id = id,
                    channel = tracked.channel.as_str(),
                    root = %root,
                    "draft ready for review, posted root message"
                );
                self.store.put(TrackedPullRequest {
                    root_message: Some(root),
                    snapshot: incoming,
                    ..tracked
                });
                return Ok(RouteOutcome::DraftPromoted);
            }

            if incoming.is_terminal() {
                info!(pull_request_id = id, "draft closed before any message was posted");
                self.store.remove(id);
                return Ok(RouteOutcome::DraftClosed);
            }

            debug!(
                pull_request_id = id,
                change = change.kind.as_str(),
                "draft still suppressed, refreshing snapshot"
            );
            // The draft flag stays as stored so an outranked promotion surfaces next time.
            let snapshot = PullRequestSnapshot {
                is_draft: tracked.snapshot.is_draft,
                ..incoming
            };
            self.store.put(TrackedPullRequest { snapshot, ..tracked });
            return Ok(RouteOutcome::DraftRefreshed);
        };

        self.send(&tracked, &change.message, Some(&root)).await?;
        debug!(
            pull_request_id = id,
            change = change.kind.as_str(),
            "posted thread reply"
        );

        if incoming.is_terminal() {
            let deleted_replies = self.clean_up_thread(&tracked, &root).await?;
            self.store.remove(id);
            info!(
                pull_request_id = id,
                deleted_replies, "pull request completed, stopped tracking"
            );
            return Ok(RouteOutcome::ThreadClosed { deleted_replies });
        }

        self.store.put(TrackedPullRequest {
            snapshot: incoming,
            ..tracked
        });
        Ok(RouteOutcome::ReplyPosted(change.kind))
    }

    async fn resolve_author(&self, creator: &PullRequestCreator) -> String {
        if creator.email.trim().is_empty() {
            return creator.display_name.clone();
        }
        match self.sink.lookup_user_by_email(&creator.email).await {
            Ok(Some(user_id)) => render_user_mention(&user_id),
            Ok(None) => {
                debug!(email = creator.email.as_str(), "no chat user for author email");
                creator.display_name.clone()
            }
            Err(error) => {
                warn!(
                    email = creator.email.as_str(),
                    %error,
                    "chat user lookup failed, using display name"
                );
                creator.display_name.clone()
            }
        }
    }

    async fn send(
        &self,
        tracked: &TrackedPullRequest,
        text: &str,
        thread_root: Option<&MessageHandle>,
    ) -> Result<MessageHandle, RouterError> {
        self.sink
            .send_message(&tracked.channel, text, thread_root)
            .await
            .map_err(|source| RouterError::Send {
                pull_request_id: tracked.id,
                channel: tracked.channel.clone(),
                source,
            })
    }

    async fn clean_up_thread(
        &self,
        tracked: &TrackedPullRequest,
        root: &MessageHandle,
    ) -> Result<usize, RouterError> {
        let replies = self
            .sink
            .list_thread_replies(&tracked.channel, root)
            .await
            .map_err(|source| RouterError::ListReplies {
                pull_request_id: tracked.id,
                source,
            })?;

        for reply in &replies {
            self.sink
                .delete_message(&tracked.channel, reply)
                .await
                .map_err(|source| RouterError::DeleteReply {
                    pull_request_id: tracked.id,
                    message: reply.clone(),
                    source,
                })?;
        }
        Ok(replies.len())
    }
}
