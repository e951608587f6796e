use std::path::PathBuf;

use clap::Parser;
use prthread_slack::SLACK_DEFAULT_API_BASE;

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "prthread",
    about = "Mirrors Azure DevOps pull request activity into Slack threads",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        env = "PRTHREAD_CONFIG",
        default_value = "config.json",
        help = "JSON file mapping Azure DevOps projects to Slack channel ids"
    )]
    pub(crate) config: PathBuf,

    #[arg(
        long = "slack-bot-token",
        env = "SLACK_ACCESS_TOKEN",
        hide_env_values = true,
        help = "Slack bot token used for chat.postMessage, users.lookupByEmail, conversations.replies and chat.delete"
    )]
    pub(crate) slack_bot_token: Option<String>,

    #[arg(
        long,
        env = "PRTHREAD_BIND",
        default_value = "0.0.0.0:80",
        help = "Socket address the webhook server listens on"
    )]
    pub(crate) bind: String,

    #[arg(
        long = "slack-api-base",
        env = "PRTHREAD_SLACK_API_BASE",
        default_value = SLACK_DEFAULT_API_BASE,
        help = "Base URL for the Slack Web API"
    )]
    pub(crate) slack_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "PRTHREAD_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout applied to each Slack API call"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "retry-max-attempts",
        env = "PRTHREAD_RETRY_MAX_ATTEMPTS",
        default_value_t = 1,
        value_parser = parse_positive_usize,
        help = "Attempts per Slack API call; values above 1 retry 429 and 5xx responses"
    )]
    pub(crate) retry_max_attempts: usize,

    #[arg(
        long = "retry-base-delay-ms",
        env = "PRTHREAD_RETRY_BASE_DELAY_MS",
        default_value_t = 500,
        value_parser = parse_positive_u64,
        help = "Base exponential backoff delay when Slack omits Retry-After"
    )]
    pub(crate) retry_base_delay_ms: u64,

    #[arg(
        long = "max-concurrent-requests",
        env = "PRTHREAD_MAX_CONCURRENT_REQUESTS",
        default_value_t = 64,
        value_parser = parse_positive_usize,
        help = "Upper bound on webhook notifications processed at once"
    )]
    pub(crate) max_concurrent_requests: usize,
}
