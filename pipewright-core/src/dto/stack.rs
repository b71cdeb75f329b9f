//! Stack input DTOs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::config::PipelineConfig;

/// Input for one pipeline stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackInput {
    pub input: PipelineConfig,
    /// Region-keyed parameters resolved from SSM
    #[serde(default)]
    pub ssm_params: BTreeMap<String, RegionParams>,
}

/// Parameters resolved for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionParams {
    /// Shared modules / artifact bucket name
    pub modules: String,
    /// KMS key ARN
    pub kms: String,
}
