//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod plan;
mod synth;
mod validate;

pub use synth::OutputFormat;

use anyhow::{Context, Result};
use clap::Subcommand;
use pipewright_core::StackInput;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize a stack input and emit it as JSON
    Synth {
        /// Stack input file (YAML, or JSON by extension)
        file: PathBuf,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output shape
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Template)]
        format: OutputFormat,
    },
    /// Print the ordered stages and actions of a pipeline
    Plan {
        /// Stack input file
        file: PathBuf,
    },
    /// Load and check a stack input without synthesizing it
    Validate {
        /// Stack input file
        file: PathBuf,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Synth {
            file,
            output,
            format,
        } => synth::synth(config, &file, output.as_deref(), format),
        Commands::Plan { file } => plan::plan(config, &file),
        Commands::Validate { file } => validate::validate(&file),
    }
}

/// Read a stack input, attaching the path to any failure
fn load(file: &Path) -> Result<StackInput> {
    pipewright_synth::load_stack_input(file)
        .with_context(|| format!("Failed to load stack input: {}", file.display()))
}
