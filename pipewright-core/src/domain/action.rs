//! Action domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category of a pipeline action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionCategory {
    Source,
    Build,
    Approval,
    Deploy,
    Invoke,
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCategory::Source => write!(f, "Source"),
            ActionCategory::Build => write!(f, "Build"),
            ActionCategory::Approval => write!(f, "Approval"),
            ActionCategory::Deploy => write!(f, "Deploy"),
            ActionCategory::Invoke => write!(f, "Invoke"),
        }
    }
}

/// A single declared unit of work inside a stage
///
/// Has no lifecycle of its own: it is built, attached to a stage and
/// rendered with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub category: ActionCategory,
    /// `AWS`, `ThirdParty` or `Custom`
    pub owner: String,
    pub provider: String,
    pub version: String,
    pub run_order: u32,
    pub region: String,
    pub action_mode: Option<String>,
    pub configuration: BTreeMap<String, String>,
    pub input_artifacts: Vec<String>,
    pub output_artifacts: Vec<String>,
    pub role_arn: Option<String>,
}
