//! Stage domain types

use serde::{Deserialize, Serialize};

use super::action::ActionDescriptor;

/// Ordered, named group of actions
///
/// Actions sharing a run order inside a stage execute in parallel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    pub actions: Vec<ActionDescriptor>,
}

impl Stage {
    pub fn new(name: impl Into<String>, actions: Vec<ActionDescriptor>) -> Self {
        Self {
            name: name.into(),
            actions,
        }
    }
}
