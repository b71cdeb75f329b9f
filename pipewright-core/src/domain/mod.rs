//! Core domain types
//!
//! This module contains the structures shared by the synthesizer and the CLI.
//! `config` is the read-only input side (what the deployment map declares),
//! while `action`, `stage` and `resource` are the output side (what gets
//! handed to the template renderer).

pub mod action;
pub mod config;
pub mod resource;
pub mod stage;
