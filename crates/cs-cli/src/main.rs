//! # cstate
//!
//! Operator tool for cached-state tokens.

#![forbid(unsafe_code)]

use clap::Parser;
use cs_cli::{
    cli::{Cli, Command},
    commands::{run_config, run_key, run_state},
    config::CliConfig,
    output::error,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path = match CliConfig::resolve_path(cli.config.as_deref()) {
        Ok(p) => p,
        Err(e) => {
            error(&e.to_string());
            std::process::exit(1);
        }
    };

    // Load configuration
    let mut config = match CliConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    let output = config.effective_output(cli.output);
    let result = match cli.command {
        Command::Key(cmd) => run_key(cmd, &mut config, &config_path, output),
        Command::State(cmd) => {
            run_state(
                cmd,
                &config,
                cli.backend,
                cli.redis_url.as_deref(),
                output,
            )
            .await
        }
        Command::Config(cmd) => run_config(cmd, &mut config, &config_path, output),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
}
