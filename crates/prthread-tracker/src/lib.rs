//! Pull request lifecycle tracking for chat thread mirroring.
//!
//! Holds the in-memory snapshot store, the snapshot diff engine and the event
//! router that turns Azure DevOps pull request notifications into root
//! messages, threaded replies and thread cleanup on a [`ThreadSink`].

pub mod diff_engine;
pub mod event_router;
pub mod message_render;
pub mod notification;
pub mod project_channels;
pub mod pull_request;
pub mod snapshot_store;
pub mod thread_sink;

pub use diff_engine::{compare_snapshots, ChangeKind, PullRequestChange};
pub use event_router::{EventRouter, RouteOutcome, RouterError};
pub use notification::{
    parse_notification, NotificationKind, PullRequestCreator, PullRequestNotification,
    PullRequestResource, RepositoryProject, RepositoryRef,
};
pub use project_channels::ProjectChannels;
pub use pull_request::{
    vote_label, PullRequestId, PullRequestSnapshot, ReviewerVote, TrackedPullRequest,
    TERMINAL_STATUS,
};
pub use snapshot_store::{PullRequestGuard, SnapshotStore};
pub use thread_sink::{MessageHandle, ThreadSink, ThreadSinkError};
