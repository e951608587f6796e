use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use prthread_gateway::{run_webhook_server, WebhookServerConfig};
use prthread_slack::{SlackApiClient, SlackApiClientConfig};
use prthread_tracker::{EventRouter, ProjectChannels, SnapshotStore};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli_args::Cli;
use crate::config::load_project_channels;

pub(crate) fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Merges `path` into the process environment without overriding variables
/// that are already set. Returns `false` when the file does not exist.
pub(crate) fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(error) if error.not_found() => Ok(false),
        Err(error) => Err(error).with_context(|| format!("failed to load {}", path.display())),
    }
}

pub(crate) fn resolve_bot_token(raw: Option<&str>) -> Result<String> {
    let token = raw.map(str::trim).unwrap_or_default();
    if token.is_empty() {
        bail!("missing Slack bot token: set --slack-bot-token or SLACK_ACCESS_TOKEN");
    }
    Ok(token.to_string())
}

fn log_project_channels(channels: &ProjectChannels) {
    if channels.is_empty() {
        warn!("no project channels configured, every pull request will be ignored");
        return;
    }
    for (project, channel) in channels.iter() {
        info!(project, channel, "project channel mapping loaded");
    }
}

pub(crate) async fn run_cli(cli: Cli) -> Result<()> {
    let bot_token = resolve_bot_token(cli.slack_bot_token.as_deref())?;
    let channels = load_project_channels(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    log_project_channels(&channels);

    let slack = SlackApiClient::new(SlackApiClientConfig {
        api_base: cli.slack_api_base.clone(),
        bot_token,
        request_timeout_ms: cli.request_timeout_ms,
        retry_max_attempts: cli.retry_max_attempts,
        retry_base_delay_ms: cli.retry_base_delay_ms,
    })?;
    let router = Arc::new(EventRouter::new(
        Arc::new(SnapshotStore::new()),
        Arc::new(slack),
        channels,
    ));

    run_webhook_server(
        WebhookServerConfig {
            bind: cli.bind,
            max_concurrent_requests: cli.max_concurrent_requests,
        },
        router,
    )
    .await
}
