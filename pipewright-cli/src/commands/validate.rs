//! Validate command handler

use anyhow::Result;
use colored::*;
use std::path::Path;

pub fn validate(file: &Path) -> Result<()> {
    let input = super::load(file)?;
    let config = &input.input;

    let targets: usize = config.environments.targets.iter().map(Vec::len).sum();

    println!("{}", "✓ Stack input is valid".green().bold());
    println!("  Name:    {}", config.name.bold());
    println!("  Source:  {}", config.kind.source.name.cyan());
    println!("  Build:   {}", config.kind.build.name.cyan());
    println!(
        "  Targets: {} in {} group(s)",
        targets,
        config.environments.targets.len()
    );

    Ok(())
}
