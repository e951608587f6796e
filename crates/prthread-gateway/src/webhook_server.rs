//! Webhook server bootstrap, router wiring and notification handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use prthread_tracker::{parse_notification, EventRouter, NotificationKind};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

mod types;

use types::{WebhookAcceptedResponse, WebhookApiError};


pub const PULL_REQUEST_CREATED_ENDPOINT: &str = "/azuredevops/create";
pub const PULL_REQUEST_UPDATED_ENDPOINT: &str = "/azuredevops/updates";
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 64;

#[derive(Debug, Clone)]
/// Listener settings for [`run_webhook_server`].
pub struct WebhookServerConfig {
    pub bind: String,
    pub max_concurrent_requests: usize,
}

impl Default for WebhookServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:80".to_string(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }
}

/// Shared state handed to every webhook handler.
pub struct WebhookServerState {
    router: Arc<EventRouter>,
    request_slots: Arc<Semaphore>,
}

impl WebhookServerState {
    pub fn new(router: Arc<EventRouter>, max_concurrent_requests: usize) -> Self {
        Self {
            router,
            request_slots: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// Stops admitting notifications; queued requests get `503`.
    pub fn close_request_slots(&self) {
        self.request_slots.close();
    }
}

pub async fn run_webhook_server(
    config: WebhookServerConfig,
    router: Arc<EventRouter>,
) -> Result<()> {
    let bind_addr = config
        .bind
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid --bind '{}'", config.bind))?;

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind webhook server on {bind_addr}"))?;
    let local_addr = listener
        .local_addr()
        .context("failed to resolve bound webhook server address")?;

    info!(
        addr = %local_addr,
        create_endpoint = PULL_REQUEST_CREATED_ENDPOINT,
        update_endpoint = PULL_REQUEST_UPDATED_ENDPOINT,
        max_concurrent_requests = config.max_concurrent_requests,
        "webhook server listening"
    );

    let state = Arc::new(WebhookServerState::new(router, config.max_concurrent_requests));
    let app = build_webhook_router(Arc::clone(&state));
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received, draining webhook server");
            state.close_request_slots();
        })
        .await
        .context("webhook server exited unexpectedly")?;

    info!("webhook server stopped");
    Ok(())
}

pub fn build_webhook_router(state: Arc<WebhookServerState>) -> Router {
    Router::new()
        .route(PULL_REQUEST_CREATED_ENDPOINT, post(handle_pull_request_created))
        .route(PULL_REQUEST_UPDATED_ENDPOINT, post(handle_pull_request_updated))
        .with_state(state)
}

async fn handle_pull_request_created(
    State(state): State<Arc<WebhookServerState>>,
    body: Bytes,
) -> Response {
    handle_notification(state, NotificationKind::Created, body).await
}

async fn handle_pull_request_updated(
    State(state): State<Arc<WebhookServerState>>,
    body: Bytes,
) -> Response {
    handle_notification(state, NotificationKind::Updated, body).await
}

async fn handle_notification(
    state: Arc<WebhookServerState>,
    kind: NotificationKind,
    body: Bytes,
) -> Response {
    let Ok(_permit) = Arc::clone(&state.request_slots).acquire_owned().await else {
        return WebhookApiError::unavailable("webhook server is shutting down").into_response();
    };

    let notification = match parse_notification(&body) {
        Ok(notification) => notification,
        Err(error) => {
            warn!(route = kind.as_str(), %error, "rejecting malformed notification body");
            return WebhookApiError::bad_request(
                "malformed_json",
                format!("failed to parse notification body: {error}"),
            )
            .into_response();
        }
    };

    if !notification.matches(kind) {
        warn!(
            route = kind.as_str(),
            event_type = notification.event_type.as_str(),
            expected = kind.event_type(),
            "rejecting notification with mismatched event type"
        );
        return WebhookApiError::bad_request(
            "event_type_mismatch",
            format!(
                "expected event type '{}' but received '{}'",
                kind.event_type(),
                notification.event_type
            ),
        )
        .into_response();
    }

    let resource = &notification.resource;
    let pull_request_id = resource.pull_request_id;
    debug!(route = kind.as_str(), pull_request_id, "notification accepted");

    let result = match kind {
        NotificationKind::Created => state.router.handle_created(resource).await,
        NotificationKind::Updated => state.router.handle_updated(resource).await,
    };

    let outcome = match result {
        Ok(outcome) => {
            info!(
                route = kind.as_str(),
                pull_request_id,
                outcome = outcome.as_str(),
                "notification handled"
            );
            outcome.as_str()
        }
        Err(error) => {
            warn!(
                route = kind.as_str(),
                pull_request_id,
                reason_code = error.reason_code(),
                %error,
                "notification handling failed"
            );
            error.reason_code()
        }
    };

    (
        StatusCode::OK,
        Json(WebhookAcceptedResponse {
            status: "accepted",
            pull_request_id,
            outcome,
        }),
    )
        .into_response()
}
