mod bootstrap;
mod cli_args;
mod config;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use crate::bootstrap::{init_tracing, load_env_file, run_cli};
use crate::cli_args::Cli;

const ENV_FILE: &str = ".env";

#[tokio::main]
async fn main() -> Result<()> {
    let env_file_loaded = load_env_file(Path::new(ENV_FILE))?;
    init_tracing();
    if env_file_loaded {
        info!(path = ENV_FILE, "loaded environment file");
    }
    run_cli(Cli::parse()).await
}
