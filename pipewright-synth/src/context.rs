//! Deployment context
//!
//! The deployment region and account every builder resolves defaults
//! against. Built once and passed down explicitly; builders never read the
//! process environment themselves.

use crate::error::{Result, SynthError};

/// Prefix applied to pipeline and stack names when none is configured
pub const DEFAULT_PIPELINE_PREFIX: &str = "adf-pipeline-";

/// Deployment region, account and naming prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentContext {
    /// Region the pipeline itself lives in
    pub region: String,

    /// Account id of the deployment account
    pub account_id: String,

    /// Prefix for pipeline and default stack names
    pub pipeline_prefix: String,
}

impl DeploymentContext {
    /// Creates a context with the default prefix
    pub fn new(region: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: account_id.into(),
            pipeline_prefix: DEFAULT_PIPELINE_PREFIX.to_string(),
        }
    }

    /// Creates a context from environment variables
    ///
    /// Expected environment variables:
    /// - AWS_REGION (required)
    /// - ACCOUNT_ID (required)
    /// - ADF_PIPELINE_PREFIX (optional, default: "adf-pipeline-")
    pub fn from_env() -> Result<Self> {
        let region = std::env::var("AWS_REGION")
            .map_err(|_| SynthError::InvalidContext("AWS_REGION not set".to_string()))?;

        let account_id = std::env::var("ACCOUNT_ID")
            .map_err(|_| SynthError::InvalidContext("ACCOUNT_ID not set".to_string()))?;

        let pipeline_prefix = std::env::var("ADF_PIPELINE_PREFIX")
            .unwrap_or_else(|_| DEFAULT_PIPELINE_PREFIX.to_string());

        Ok(Self {
            region,
            account_id,
            pipeline_prefix,
        })
    }

    /// Overrides the naming prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.pipeline_prefix = prefix.into();
        self
    }

    /// Validates the context
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(SynthError::InvalidContext(
                "region cannot be empty".to_string(),
            ));
        }

        if self.account_id.len() != 12 || !self.account_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(SynthError::InvalidContext(format!(
                "account id '{}' must be 12 digits",
                self.account_id
            )));
        }

        Ok(())
    }

    /// Role ARN for a role name in the deployment account
    pub fn role_arn(&self, role: &str) -> String {
        format!("arn:aws:iam::{}:role/{}", self.account_id, role)
    }

    /// Role assumed by build projects without an explicit role
    pub fn default_build_role_arn(&self) -> String {
        self.role_arn("adf-codebuild-role")
    }

    pub fn pipeline_name(&self, name: &str) -> String {
        format!("{}{}", self.pipeline_prefix, name)
    }
}
