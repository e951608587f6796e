//! HTTP webhook gateway for Azure DevOps pull request notifications.
//!
//! Exposes the create and update service-hook routes and hands accepted
//! payloads to the [`prthread_tracker::EventRouter`].

mod webhook_server;

pub use webhook_server::{
    build_webhook_router, run_webhook_server, WebhookServerConfig, WebhookServerState,
    PULL_REQUEST_CREATED_ENDPOINT, PULL_REQUEST_UPDATED_ENDPOINT,
};
