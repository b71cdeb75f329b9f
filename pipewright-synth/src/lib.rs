//! Pipewright Synthesis
//!
//! This crate turns a pipeline deployment map entry into a declarative
//! pipeline stack. It includes:
//! - Loading and validating the stack input document
//! - Provider resolution for source, build and deploy steps
//! - Stage builders for every supported provider
//! - The stack assembler walking target groups in order
//! - Rendering of the assembled stack as a CloudFormation template

pub mod action;
pub mod assembler;
pub mod builders;
pub mod context;
pub mod error;
pub mod loader;
pub mod provider;
pub mod template;

pub use assembler::{PipelineStack, StackAccumulator, synthesize};
pub use context::DeploymentContext;
pub use error::{Result, SynthError};
pub use loader::{load_stack_input, parse_stack_input, validate_stack_input};
pub use template::render_template;

pub use pipewright_core::domain::resource::SynthesizedStack;
