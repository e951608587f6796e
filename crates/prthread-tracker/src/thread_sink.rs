//! Chat thread capability consumed by the event router.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Opaque handle of a posted chat message (a Slack `ts`).
pub struct MessageHandle(String);

impl MessageHandle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MessageHandle {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageHandle {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Error)]
/// Enumerates supported `ThreadSinkError` values.
pub enum ThreadSinkError {
    #[error("{method} request failed: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{method} returned non-success status {status}: {body}")]
    HttpStatus {
        method: &'static str,
        status: u16,
        body: String,
    },
    #[error("{method} failed: {error}")]
    Api { method: &'static str, error: String },
    #[error("{method} returned an invalid response: {message}")]
    InvalidResponse {
        method: &'static str,
        message: String,
    },
}

#[async_trait]
/// Trait contract for posting, listing and deleting thread messages.
pub trait ThreadSink: Send + Sync {
    /// Posts `text` to `channel`, as a threaded reply when `thread_root` is set.
    async fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_root: Option<&MessageHandle>,
    ) -> Result<MessageHandle, ThreadSinkError>;

    /// Returns the chat user id registered for `email`, if any.
    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<String>, ThreadSinkError>;

    /// Lists the replies under `root`, excluding the root message itself.
    async fn list_thread_replies(
        &self,
        channel: &str,
        root: &MessageHandle,
    ) -> Result<Vec<MessageHandle>, ThreadSinkError>;

    async fn delete_message(
        &self,
        channel: &str,
        message: &MessageHandle,
    ) -> Result<(), ThreadSinkError>;
}
