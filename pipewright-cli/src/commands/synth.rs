//! Synth command handler
//!
//! Emits either the rendered CloudFormation template or the raw stack
//! descriptor.

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::*;
use std::path::Path;
use tracing::info;

use crate::config::Config;

/// Shape of the synthesized output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// CloudFormation template
    Template,
    /// Stack descriptor as assembled
    Stack,
}

pub fn synth(
    config: &Config,
    file: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let input = super::load(file)?;
    let stack = pipewright_synth::synthesize(&config.context(), &input)
        .with_context(|| format!("Failed to synthesize pipeline {}", input.input.name))?;

    let document = match format {
        OutputFormat::Template => pipewright_synth::render_template(&stack),
        OutputFormat::Stack => serde_json::to_value(&stack)?,
    };
    let rendered = serde_json::to_string_pretty(&document)?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!(path = %path.display(), "Stack written");
            eprintln!(
                "{} {} {}",
                "✓".green().bold(),
                stack.pipeline.name.bold(),
                format!("written to {}", path.display()).dimmed()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
