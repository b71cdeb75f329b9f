//! Resource domain types
//!
//! Declarations handed to the template renderer. Nothing here talks to the
//! cloud provider; these are plain descriptions of what should exist.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::stage::Stage;

/// CodeBuild project backing a build stage or a CodeBuild deploy action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildProject {
    pub name: String,
    pub description: String,
    pub image: String,
    pub compute_type: String,
    pub privileged: bool,
    pub timeout_minutes: u32,
    pub role_arn: String,
    pub encryption_key: String,
    pub environment_variables: BTreeMap<String, String>,
    /// Buildspec filename inside the source, `None` uses the project default
    pub buildspec: Option<String>,
}

/// Protocol used to deliver pipeline notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationProtocol {
    Email,
    Lambda,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationTopic {
    pub name: String,
    pub arn: String,
    /// Endpoint as configured (address or channel name)
    pub endpoint: String,
    pub protocol: NotificationProtocol,
    /// What the subscription delivers to: the address, or the relay function
    pub subscription_endpoint: String,
}

/// Third-party webhook that triggers the pipeline's source action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub name: String,
    pub target_pipeline: String,
    pub target_action: String,
    pub target_pipeline_version: u32,
    /// JSON path filter on the pushed ref
    pub filter_json_path: String,
    pub filter_match_equals: String,
    pub secret_token: String,
}

/// Per-region artifact bucket and its encryption key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactStore {
    pub region: String,
    pub bucket: String,
    pub kms_key_arn: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDeclaration {
    pub name: String,
    pub role_arn: String,
    pub artifact_stores: Vec<ArtifactStore>,
    pub restart_execution_on_update: bool,
    pub tags: BTreeMap<String, String>,
    pub stages: Vec<Stage>,
}

/// Everything synthesized for one pipeline stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedStack {
    pub name: String,
    pub topic: Option<NotificationTopic>,
    pub projects: Vec<BuildProject>,
    pub pipeline: PipelineDeclaration,
    pub webhook: Option<Webhook>,
}

impl SynthesizedStack {
    pub fn stages(&self) -> &[Stage] {
        &self.pipeline.stages
    }

    pub fn action_count(&self) -> usize {
        self.pipeline.stages.iter().map(|s| s.actions.len()).sum()
    }
}
