//! Slack Web API thread sink.
//!
//! Posts root messages and threaded replies, resolves authors by email and
//! cleans up reply threads through `chat.postMessage`, `users.lookupByEmail`,
//! `conversations.replies` and `chat.delete`.

mod slack_api_client;
mod slack_retry;

pub use slack_api_client::{
    SlackApiClient, SlackApiClientConfig, SlackPostedMessage, SLACK_DEFAULT_API_BASE,
};
