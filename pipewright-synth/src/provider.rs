//! Provider variants
//!
//! Source, build and deploy providers are named by free-form strings in the
//! deployment map and matched by substring, first match wins. Matching
//! yields a closed enum so every recognized provider is handled by an
//! exhaustive `match`; an unrecognized name yields `None`.

use std::fmt;

/// Deploy provider used when neither the target nor the pipeline names one
pub const DEFAULT_DEPLOY_PROVIDER: &str = "cloudformation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceProvider {
    CodeCommit,
    GitHub,
    S3,
}

impl SourceProvider {
    /// Case-insensitive substring match against `codecommit`, `github`, `s3`
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.contains("codecommit") {
            Some(SourceProvider::CodeCommit)
        } else if name.contains("github") {
            Some(SourceProvider::GitHub)
        } else if name.contains("s3") {
            Some(SourceProvider::S3)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceProvider::CodeCommit => write!(f, "CodeCommit"),
            SourceProvider::GitHub => write!(f, "GitHub"),
            SourceProvider::S3 => write!(f, "S3"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildProvider {
    CodeBuild,
    Jenkins,
}

impl BuildProvider {
    /// Case-insensitive substring match against `codebuild`, `jenkins`
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        if name.contains("codebuild") {
            Some(BuildProvider::CodeBuild)
        } else if name.contains("jenkins") {
            Some(BuildProvider::Jenkins)
        } else {
            None
        }
    }
}

impl fmt::Display for BuildProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildProvider::CodeBuild => write!(f, "CodeBuild"),
            BuildProvider::Jenkins => write!(f, "Jenkins"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployProvider {
    CloudFormation,
    CodeDeploy,
    /// Recognized but produces no actions
    S3,
    Lambda,
    CodeBuild,
    ServiceCatalog,
}

impl DeployProvider {
    /// Case-sensitive substring match, in dispatch order
    pub fn from_name(name: &str) -> Option<Self> {
        if name.contains("cloudformation") {
            Some(DeployProvider::CloudFormation)
        } else if name.contains("codedeploy") {
            Some(DeployProvider::CodeDeploy)
        } else if name.contains("s3") {
            Some(DeployProvider::S3)
        } else if name.contains("lambda") {
            Some(DeployProvider::Lambda)
        } else if name.contains("codebuild") {
            Some(DeployProvider::CodeBuild)
        } else if name.contains("service_catalog") {
            Some(DeployProvider::ServiceCatalog)
        } else {
            None
        }
    }
}

impl fmt::Display for DeployProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployProvider::CloudFormation => write!(f, "CloudFormation"),
            DeployProvider::CodeDeploy => write!(f, "CodeDeploy"),
            DeployProvider::S3 => write!(f, "S3"),
            DeployProvider::Lambda => write!(f, "Lambda"),
            DeployProvider::CodeBuild => write!(f, "CodeBuild"),
            DeployProvider::ServiceCatalog => write!(f, "ServiceCatalog"),
        }
    }
}
