//! Slack Web API client backing the pull request thread sink.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use prthread_tracker::{MessageHandle, ThreadSink, ThreadSinkError};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::slack_retry::{truncate_for_error, SlackRetryPolicy};


pub const SLACK_DEFAULT_API_BASE: &str = "https://slack.com/api";
const SLACK_REPLIES_PAGE_LIMIT: &str = "200";
const SLACK_USER_NOT_FOUND_ERROR: &str = "users_not_found";

#[derive(Debug, Clone, Deserialize)]
struct SlackChatMessageResponse {
    ok: bool,
    ts: Option<String>,
    channel: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackUserLookupResponse {
    ok: bool,
    user: Option<SlackUser>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackUser {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackRepliesResponse {
    ok: bool,
    #[serde(default)]
    messages: Vec<SlackReplyMessage>,
    response_metadata: Option<SlackResponseMetadata>,
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackReplyMessage {
    ts: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SlackAckResponse {
    ok: bool,
    error: Option<String>,
}

#[derive(Debug, Clone)]
/// Channel and `ts` of a message accepted by `chat.postMessage`.
pub struct SlackPostedMessage {
    pub channel: String,
    pub ts: String,
}

#[derive(Debug, Clone)]
/// Connection settings for [`SlackApiClient`].
pub struct SlackApiClientConfig {
    pub api_base: String,
    pub bot_token: String,
    pub request_timeout_ms: u64,
    pub retry_max_attempts: usize,
    pub retry_base_delay_ms: u64,
}

#[derive(Clone)]
pub struct SlackApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    retry_policy: SlackRetryPolicy,
}

fn slack_api_error(method: &'static str, error: Option<String>) -> ThreadSinkError {
    ThreadSinkError::Api {
        method,
        error: error.unwrap_or_else(|| "unknown error".to_string()),
    }
}

impl SlackApiClient {
    pub fn new(config: SlackApiClientConfig) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("prthread-slack"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.request_timeout_ms.max(1)))
            .build()
            .context("failed to create slack api client")?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.trim().to_string(),
            retry_policy: SlackRetryPolicy::new(
                config.retry_max_attempts,
                config.retry_base_delay_ms,
            ),
        })
    }

    pub async fn post_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<SlackPostedMessage, ThreadSinkError> {
        let mut payload = json!({
            "channel": channel,
            "text": text,
            "unfurl_links": false,
            "unfurl_media": false,
        });
        if let Some(thread_ts) = thread_ts.map(str::trim).filter(|value| !value.is_empty()) {
            payload["thread_ts"] = Value::String(thread_ts.to_string());
        }

        let response: SlackChatMessageResponse = self
            .request_json("chat.postMessage", || {
                self.http
                    .post(format!("{}/chat.postMessage", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .json(&payload)
            })
            .await?;

        if !response.ok {
            return Err(slack_api_error("chat.postMessage", response.error));
        }

        Ok(SlackPostedMessage {
            channel: response.channel.unwrap_or_else(|| channel.to_string()),
            ts: response
                .ts
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ThreadSinkError::InvalidResponse {
                    method: "chat.postMessage",
                    message: "response missing ts".to_string(),
                })?,
        })
    }

    /// Resolves a workspace user id by email; unknown emails yield `None`.
    pub async fn lookup_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<String>, ThreadSinkError> {
        let form = [("email", email)];
        let response: SlackUserLookupResponse = self
            .request_json("users.lookupByEmail", || {
                self.http
                    .post(format!("{}/users.lookupByEmail", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .form(&form)
            })
            .await?;

        if !response.ok {
            if response.error.as_deref() == Some(SLACK_USER_NOT_FOUND_ERROR) {
                return Ok(None);
            }
            return Err(slack_api_error("users.lookupByEmail", response.error));
        }
        Ok(response
            .user
            .map(|user| user.id)
            .filter(|id| !id.trim().is_empty()))
    }

    /// Returns the `ts` of every message in the thread, parent included.
    pub async fn conversation_replies(
        &self,
        channel: &str,
        thread_ts: &str,
    ) -> Result<Vec<String>, ThreadSinkError> {
        let mut timestamps = Vec::new();
        let mut cursor = String::new();
        loop {
            let form = [
                ("cursor", cursor.as_str()),
                ("channel", channel),
                ("ts", thread_ts),
                ("limit", SLACK_REPLIES_PAGE_LIMIT),
            ];
            let response: SlackRepliesResponse = self
                .request_json("conversations.replies", || {
                    self.http
                        .post(format!("{}/conversations.replies", self.api_base))
                        .bearer_auth(&self.bot_token)
                        .form(&form)
                })
                .await?;
            if !response.ok {
                return Err(slack_api_error("conversations.replies", response.error));
            }

            timestamps.extend(response.messages.into_iter().map(|message| message.ts));
            let next_cursor = response
                .response_metadata
                .map(|metadata| metadata.next_cursor)
                .unwrap_or_default();
            if next_cursor.trim().is_empty() {
                return Ok(timestamps);
            }
            cursor = next_cursor;
        }
    }

    pub async fn delete_message(&self, channel: &str, ts: &str) -> Result<(), ThreadSinkError> {
        let payload = json!({
            "channel": channel,
            "ts": ts,
        });
        let response: SlackAckResponse = self
            .request_json("chat.delete", || {
                self.http
                    .post(format!("{}/chat.delete", self.api_base))
                    .bearer_auth(&self.bot_token)
                    .json(&payload)
            })
            .await?;
        if !response.ok {
            return Err(slack_api_error("chat.delete", response.error));
        }
        Ok(())
    }

    async fn request_json<T, F>(
        &self,
        method: &'static str,
        mut builder: F,
    ) -> Result<T, ThreadSinkError>
    where
        T: DeserializeOwned,
        F: FnMut() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let response = builder()
                .header(
                    "x-prthread-retry-attempt",
                    attempt.saturating_sub(1).to_string(),
                )
                .send()
                .await;
            match response {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().await.map_err(|error| {
                            ThreadSinkError::InvalidResponse {
                                method,
                                message: error.to_string(),
                            }
                        });
                    }

                    if self.retry_policy.should_retry(attempt, status) {
                        let delay = self
                            .retry_policy
                            .delay_before_retry(attempt, response.headers());
                        debug!(
                            method,
                            status = status.as_u16(),
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "retrying slack call"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    return Err(ThreadSinkError::HttpStatus {
                        method,
                        status: status.as_u16(),
                        body: truncate_for_error(&body, 800),
                    });
                }
                Err(error) => {
                    return Err(ThreadSinkError::Transport {
                        method,
                        source: Box::new(error),
                    });
                }
            }
        }
    }
}

#[async_trait]
impl ThreadSink for SlackApiClient {
    async fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_root: Option<&MessageHandle>,
    ) -> Result<MessageHandle, ThreadSinkError> {
        let posted = self
            .post_message(channel, text, thread_root.map(MessageHandle::as_str))
            .await?;
        debug!(
            channel = posted.channel.as_str(),
            ts = posted.ts.as_str(),
            threaded = thread_root.is_some(),
            "slack message posted"
        );
        Ok(MessageHandle::new(posted.ts))
    }

    async fn lookup_user_by_email(&self, email: &str) -> Result<Option<String>, ThreadSinkError> {
        SlackApiClient::lookup_user_by_email(self, email).await
    }

    async fn list_thread_replies(
        &self,
        channel: &str,
        root: &MessageHandle,
    ) -> Result<Vec<MessageHandle>, ThreadSinkError> {
        let timestamps = self.conversation_replies(channel, root.as_str()).await?;
        Ok(timestamps
            .into_iter()
            .filter(|ts| ts != root.as_str())
            .map(MessageHandle::new)
            .collect())
    }

    async fn delete_message(
        &self,
        channel: &str,
        message: &MessageHandle,
    ) -> Result<(), ThreadSinkError> {
        SlackApiClient::delete_message(self, channel, message.as_str()).await
    }
}
