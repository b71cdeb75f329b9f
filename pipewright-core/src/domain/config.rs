//! Pipeline configuration types
//!
//! Typed view of a deployment-map entry. Every optional field is named here
//! with its default, so the builders never walk untyped nested maps.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A single pipeline declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PipelineTypes,
    #[serde(default)]
    pub environments: Environments,
    /// Pipeline-level region override, takes precedence over target regions
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub notification_endpoint: Option<String>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub restart_execution_on_update: bool,
}

/// The `type` section: source, build and top-level deploy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineTypes {
    pub source: SourceConfig,
    pub build: BuildConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_account_id")]
    pub account_id: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub owner: Option<String>,
    pub oauth_token_path: Option<String>,
    pub json_field: Option<String>,
    pub bucket_name: Option<String>,
    pub object_key: Option<String>,
    #[serde(default)]
    pub poll_for_changes: bool,
}

impl SourceConfig {
    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or("master")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub name: String,
    /// Name of a managed build image (e.g. `UBUNTU_14_04_PYTHON_3_7_1`)
    pub image: Option<String>,
    pub size: Option<ComputeType>,
    #[serde(default)]
    pub privileged: bool,
    pub role: Option<String>,
    /// Minutes
    pub timeout: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeployConfig {
    pub name: Option<String>,
    /// Top-level CloudFormation action mode (e.g. `REPLACE_ON_FAILURE`)
    pub action: Option<String>,
    /// Deploy buildspec filename used by CodeBuild deploy targets
    pub spec: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Environments {
    /// Ordered target groups; targets inside a group run in parallel
    #[serde(default)]
    pub targets: Vec<Vec<Target>>,
}

/// One deployment destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    /// Account id of the destination
    #[serde(default, deserialize_with = "deserialize_account_id")]
    pub id: Option<String>,
    pub step_name: Option<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: TargetType,
    #[serde(default)]
    pub params: TargetParams,
}

impl Target {
    /// Approval targets produce a single manual action and skip region fan-out
    pub fn is_approval(&self) -> bool {
        self.name == "approval" || self.kind.approval
    }

    /// Whether a group led by this target gets an `approval-stage-N` name
    pub fn leads_approval_stage(&self) -> bool {
        self.name.starts_with("approval") || self.kind.approval
    }

    /// Provider named on the target itself: invoke first, then deploy
    pub fn provider_override(&self) -> Option<&str> {
        self.kind
            .invoke
            .as_ref()
            .and_then(|invoke| invoke.name.as_deref())
            .filter(|name| !name.is_empty())
            .or_else(|| {
                self.kind
                    .deploy
                    .as_ref()
                    .and_then(|deploy| deploy.name.as_deref())
                    .filter(|name| !name.is_empty())
            })
    }

    pub fn uses_change_set(&self) -> bool {
        self.kind.deploy.as_ref().is_some_and(|d| d.change_set)
    }

    pub fn wants_change_set_approval(&self) -> bool {
        self.kind
            .deploy
            .as_ref()
            .is_some_and(|d| d.change_set_approval)
    }

    pub fn deploy_spec(&self) -> Option<&str> {
        self.kind.deploy.as_ref().and_then(|d| d.spec.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetType {
    #[serde(default)]
    pub approval: bool,
    pub deploy: Option<TargetDeploy>,
    pub invoke: Option<TargetInvoke>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetDeploy {
    pub name: Option<String>,
    #[serde(default)]
    pub change_set: bool,
    #[serde(default)]
    pub change_set_approval: bool,
    pub spec: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetInvoke {
    pub name: Option<String>,
}

/// Per-target overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetParams {
    pub role: Option<String>,
    pub timeout: Option<u32>,
    pub compute_type: Option<ComputeType>,
    pub image: Option<String>,
    pub privileged: Option<bool>,
    pub deployment_role: Option<String>,
    pub stack_name: Option<String>,
    pub template_filename: Option<String>,
    pub application_name: Option<String>,
    pub deployment_group_name: Option<String>,
    pub function_name: Option<String>,
    pub input: Option<serde_json::Value>,
    pub product_id: Option<String>,
    pub product_version: Option<String>,
    pub configuration_file_path: Option<String>,
}

/// CodeBuild compute size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ComputeType {
    #[default]
    Small,
    Medium,
    Large,
    X2Large,
}

impl ComputeType {
    /// Identifier used by CodeBuild
    pub fn as_codebuild(&self) -> &'static str {
        match self {
            ComputeType::Small => "BUILD_GENERAL1_SMALL",
            ComputeType::Medium => "BUILD_GENERAL1_MEDIUM",
            ComputeType::Large => "BUILD_GENERAL1_LARGE",
            ComputeType::X2Large => "BUILD_GENERAL1_2XLARGE",
        }
    }
}

impl FromStr for ComputeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let bare = upper.strip_prefix("BUILD_GENERAL1_").unwrap_or(&upper);
        match bare {
            "SMALL" => Ok(ComputeType::Small),
            "MEDIUM" => Ok(ComputeType::Medium),
            "LARGE" => Ok(ComputeType::Large),
            "2XLARGE" | "X2_LARGE" => Ok(ComputeType::X2Large),
            _ => Err(format!("unknown compute type '{}'", s)),
        }
    }
}

impl TryFrom<String> for ComputeType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ComputeType> for String {
    fn from(value: ComputeType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ComputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputeType::Small => write!(f, "SMALL"),
            ComputeType::Medium => write!(f, "MEDIUM"),
            ComputeType::Large => write!(f, "LARGE"),
            ComputeType::X2Large => write!(f, "2XLARGE"),
        }
    }
}

/// Account ids are often written unquoted in YAML, which drops leading zeros
fn deserialize_account_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AccountId {
        Text(String),
        Number(u64),
    }

    Ok(
        Option::<AccountId>::deserialize(deserializer)?.map(|id| match id {
            AccountId::Text(text) => text,
            AccountId::Number(number) => format!("{:012}", number),
        }),
    )
}
