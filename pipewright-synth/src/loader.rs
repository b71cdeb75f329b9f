//! Stack input loader
//!
//! Parses a stack input document (pipeline configuration plus region-keyed
//! parameters) and checks the structural rules serde alone cannot express.
//! Everything downstream works on the typed result.

use pipewright_core::dto::stack::StackInput;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, SynthError};

/// Parse a stack input from YAML (or JSON, which YAML accepts) source
///
/// # Errors
/// Returns an error if:
/// - The document is not valid YAML
/// - Required fields are missing (`input.name`, `input.type.source.name`,
///   `input.type.build.name`, target names)
/// - A target group is empty
///
/// # Example
/// ```
/// use pipewright_synth::loader::parse_stack_input;
///
/// let source = r#"
/// input:
///   name: sample
///   type:
///     source: { name: codecommit }
///     build: { name: codebuild }
/// "#;
///
/// let stack = parse_stack_input(source)?;
/// assert_eq!(stack.input.name, "sample");
/// # Ok::<(), pipewright_synth::SynthError>(())
/// ```
pub fn parse_stack_input(source: &str) -> Result<StackInput> {
    let stack: StackInput = serde_yaml::from_str(source)?;
    validate_stack_input(&stack)?;
    Ok(stack)
}

/// Load a stack input from a file, choosing the parser by extension
pub fn load_stack_input(path: &Path) -> Result<StackInput> {
    let source = std::fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    debug!(path = %path.display(), json = is_json, "Loading stack input");

    if is_json {
        let stack: StackInput = serde_json::from_str(&source)?;
        validate_stack_input(&stack)?;
        Ok(stack)
    } else {
        parse_stack_input(&source)
    }
}

/// Structural checks on an already-deserialized stack input
pub fn validate_stack_input(stack: &StackInput) -> Result<()> {
    let input = &stack.input;

    if input.name.trim().is_empty() {
        return Err(SynthError::missing("input.name"));
    }

    if input.kind.source.name.trim().is_empty() {
        return Err(SynthError::missing("input.type.source.name"));
    }

    if input.kind.build.name.trim().is_empty() {
        return Err(SynthError::missing("input.type.build.name"));
    }

    for (index, group) in input.environments.targets.iter().enumerate() {
        if group.is_empty() {
            return Err(SynthError::invalid(format!(
                "environments.targets[{}] must contain at least one target",
                index
            )));
        }

        for target in group {
            if target.name.trim().is_empty() {
                return Err(SynthError::missing(format!(
                    "environments.targets[{}].name",
                    index
                )));
            }
        }
    }

    Ok(())
}
