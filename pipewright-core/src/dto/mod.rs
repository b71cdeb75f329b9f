//! Data Transfer Objects
//!
//! Envelopes exchanged with the steps around the synthesizer. The stack
//! input is produced by the parameter-resolution step and consumed here
//! as-is.

pub mod stack;
