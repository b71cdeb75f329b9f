//! Pipewright CLI
//!
//! Command-line interface for synthesizing pipeline stacks from deployment
//! map entries.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use pipewright_synth::context::DEFAULT_PIPELINE_PREFIX;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pipewright")]
#[command(about = "Pipeline stack synthesizer", long_about = None)]
struct Cli {
    /// Region the pipeline is deployed to
    #[arg(long, env = "AWS_REGION")]
    region: String,

    /// Deployment account id
    #[arg(long, env = "ACCOUNT_ID")]
    account_id: String,

    /// Prefix prepended to every pipeline name
    #[arg(long, env = "ADF_PIPELINE_PREFIX", default_value = DEFAULT_PIPELINE_PREFIX)]
    pipeline_prefix: String,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipewright_synth=info,pipewright_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        region: cli.region,
        account_id: cli.account_id,
        pipeline_prefix: cli.pipeline_prefix,
    };

    handle_command(cli.command, &config)
}
