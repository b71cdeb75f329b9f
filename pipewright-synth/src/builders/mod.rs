//! Stage and resource builders
//!
//! Every builder returns either a ready-to-append [`Stage`], a list of
//! actions for a stage, or a standalone resource declaration. The assembler
//! never looks past those return shapes.
//!
//! [`Stage`]: pipewright_core::domain::stage::Stage

pub mod cloudformation;
pub mod codebuild;
pub mod codecommit;
pub mod github;
pub mod jenkins;
pub mod notifications;
pub mod pipeline;
pub mod s3;

pub use codebuild::CodeBuild;
