//! Pipewright Core
//!
//! Core types shared by the Pipewright pipeline synthesizer.
//!
//! This crate contains:
//! - Domain types: the typed pipeline configuration and the stage, action
//!   and resource descriptors produced from it
//! - DTOs: the input envelope handed over by the parameter-resolution step

pub mod domain;
pub mod dto;

pub use domain::action::{ActionCategory, ActionDescriptor};
pub use domain::config::{PipelineConfig, Target};
pub use domain::resource::SynthesizedStack;
pub use domain::stage::Stage;
pub use dto::stack::{RegionParams, StackInput};
