//! Configuration module
//!
//! Holds the deployment settings collected from flags and environment.

use pipewright_synth::DeploymentContext;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Region the pipeline is deployed to
    pub region: String,
    /// Deployment account id
    pub account_id: String,
    /// Prefix prepended to every pipeline name
    pub pipeline_prefix: String,
}

impl Config {
    /// Deployment context for the synthesizer
    pub fn context(&self) -> DeploymentContext {
        DeploymentContext::new(&self.region, &self.account_id).with_prefix(&self.pipeline_prefix)
    }
}
