//! Plan command handler

use anyhow::{Context, Result};
use colored::*;
use pipewright_core::ActionDescriptor;
use std::path::Path;

use crate::config::Config;

pub fn plan(config: &Config, file: &Path) -> Result<()> {
    let input = super::load(file)?;
    let stack = pipewright_synth::synthesize(&config.context(), &input)
        .with_context(|| format!("Failed to synthesize pipeline {}", input.input.name))?;

    println!("{} {}", "Pipeline:".bold(), stack.pipeline.name.cyan().bold());
    println!(
        "  {} stage(s), {} action(s), {} build project(s)",
        stack.stages().len(),
        stack.action_count(),
        stack.projects.len()
    );
    if let Some(topic) = &stack.topic {
        println!("  Notifications: {}", topic.endpoint.dimmed());
    }
    println!();

    for (index, stage) in stack.stages().iter().enumerate() {
        println!("{}. {}", index + 1, stage.name.bold());
        if stage.actions.is_empty() {
            println!("   {}", "(no actions)".yellow());
        }
        for action in &stage.actions {
            print_action(action);
        }
    }

    Ok(())
}

fn print_action(action: &ActionDescriptor) {
    let mode = action
        .action_mode
        .as_ref()
        .map(|m| format!(" [{}]", m))
        .unwrap_or_default();
    println!(
        "   {} {} {}{} {}",
        format!("#{}", action.run_order).dimmed(),
        action.name.cyan(),
        format!("{}/{}", action.category, action.provider).green(),
        mode.yellow(),
        action.region.dimmed()
    );
}
