//! CodeBuild stage builder
//!
//! Declares a CodeBuild project and wraps it either in the pipeline's
//! `Build` stage (no target) or in a single deploy action named after the
//! target (target present). Deploy mode lets every environment setting be
//! overridden per target and picks the buildspec dynamically.

use pipewright_core::domain::action::{ActionCategory, ActionDescriptor};
use pipewright_core::domain::config::{ComputeType, PipelineConfig, Target};
use pipewright_core::domain::resource::BuildProject;
use pipewright_core::domain::stage::Stage;
use pipewright_core::dto::stack::RegionParams;
use std::collections::BTreeMap;
use tracing::info;

use crate::action::{ActionBuilder, ActionProvider};
use crate::context::DeploymentContext;
use crate::error::Result;

pub const DEFAULT_BUILD_IMAGE: &str = "UBUNTU_14_04_PYTHON_3_7_1";
pub const DEFAULT_BUILD_TIMEOUT_MINUTES: u32 = 20;
pub const DEFAULT_DEPLOY_SPEC: &str = "deployspec.yml";

const PYTHON_PATH: &str = "./adf-build/python";

/// Managed image names and the CodeBuild image ids they stand for
const MANAGED_IMAGES: &[(&str, &str)] = &[
    ("UBUNTU_14_04_BASE", "aws/codebuild/ubuntu-base:14.04"),
    ("UBUNTU_14_04_PYTHON_3_6_5", "aws/codebuild/python:3.6.5"),
    ("UBUNTU_14_04_PYTHON_3_7_1", "aws/codebuild/python:3.7.1"),
    ("UBUNTU_14_04_NODEJS_10_14_1", "aws/codebuild/nodejs:10.14.1"),
    ("UBUNTU_14_04_DOCKER_18_09_0", "aws/codebuild/docker:18.09.0"),
    ("STANDARD_1_0", "aws/codebuild/standard:1.0"),
    ("STANDARD_2_0", "aws/codebuild/standard:2.0"),
    ("AMAZON_LINUX_2", "aws/codebuild/amazonlinux2-x86_64-standard:1.0"),
];

/// CodeBuild project and stage/action builder
pub struct CodeBuild<'a> {
    ctx: &'a DeploymentContext,
    config: &'a PipelineConfig,
    params: &'a RegionParams,
}

impl<'a> CodeBuild<'a> {
    /// `params` are the resolved parameters of the deployment region
    pub fn new(
        ctx: &'a DeploymentContext,
        config: &'a PipelineConfig,
        params: &'a RegionParams,
    ) -> Self {
        Self {
            ctx,
            config,
            params,
        }
    }

    /// The pipeline's `Build` stage with a single `build` action
    pub fn build_stage(&self) -> Result<(BuildProject, Stage)> {
        let build = &self.config.kind.build;

        let role_arn = build
            .role
            .as_deref()
            .map(|role| self.ctx.role_arn(role))
            .unwrap_or_else(|| self.ctx.default_build_role_arn());

        let project = BuildProject {
            name: format!("adf-build-{}", self.config.name),
            description: format!("ADF CodeBuild Project for {}", self.config.name),
            image: resolve_image(build.image.as_deref().unwrap_or(DEFAULT_BUILD_IMAGE)),
            compute_type: build.size.unwrap_or_default().as_codebuild().to_string(),
            privileged: build.privileged,
            timeout_minutes: resolve_timeout(build.timeout),
            role_arn,
            encryption_key: self.params.kms.clone(),
            environment_variables: self.environment_variables(None),
            buildspec: None,
        };

        let action = ActionBuilder::new(self.ctx, self.config)
            .name("Build")
            .action_name("build")
            .provider(ActionProvider::CodeBuild)
            .category(ActionCategory::Build)
            .run_order(1)
            .build()?;

        info!(project = %project.name, "Declared build project");

        Ok((project, Stage::new("Build", vec![action])))
    }

    /// A deploy action running a per-target CodeBuild project
    pub fn deploy_action(&self, target: &Target) -> Result<(BuildProject, ActionDescriptor)> {
        let build = &self.config.kind.build;
        let params = &target.params;

        let role_arn = params
            .role
            .as_deref()
            .map(|role| self.ctx.role_arn(role))
            .unwrap_or_else(|| self.ctx.default_build_role_arn());

        let image = params
            .image
            .as_deref()
            .or(build.image.as_deref())
            .unwrap_or(DEFAULT_BUILD_IMAGE);

        let compute_type: ComputeType = params.compute_type.or(build.size).unwrap_or_default();

        let project = BuildProject {
            name: format!("adf-deploy-{}", target.name),
            description: format!("ADF CodeBuild Project for {}", target.name),
            image: resolve_image(image),
            compute_type: compute_type.as_codebuild().to_string(),
            privileged: params.privileged.unwrap_or(false) || build.privileged,
            timeout_minutes: resolve_timeout(params.timeout.or(build.timeout)),
            role_arn,
            encryption_key: self.params.kms.clone(),
            environment_variables: self.environment_variables(Some(target)),
            buildspec: Some(resolve_deploy_spec(self.config, target).to_string()),
        };

        let action = ActionBuilder::new(self.ctx, self.config)
            .name(target.name.clone())
            .action_name(target.name.clone())
            .provider(ActionProvider::CodeBuild)
            .category(ActionCategory::Build)
            .run_order(1)
            .target(target)
            .build()?;

        info!(project = %project.name, target_name = %target.name, "Declared deploy project");

        Ok((project, action))
    }

    /// Environment variables shared by both modes
    ///
    /// Targets additionally get their name, account id and, when
    /// configured, the role the deployment should assume.
    pub fn environment_variables(&self, target: Option<&Target>) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("PYTHONPATH".to_string(), PYTHON_PATH.to_string());
        vars.insert("ADF_PROJECT_NAME".to_string(), self.config.name.clone());
        vars.insert("S3_BUCKET_NAME".to_string(), self.params.modules.clone());
        vars.insert("ACCOUNT_ID".to_string(), self.ctx.account_id.clone());

        if let Some(target) = target {
            vars.insert("TARGET_NAME".to_string(), target.name.clone());
            vars.insert(
                "TARGET_ACCOUNT_ID".to_string(),
                target.id.clone().unwrap_or_default(),
            );
            if let Some(role) = &target.params.deployment_role {
                vars.insert("DEPLOYMENT_ROLE".to_string(), role.clone());
            }
        }

        vars
    }
}

/// Timeout in minutes; unset or zero falls back to the default
pub fn resolve_timeout(timeout: Option<u32>) -> u32 {
    timeout
        .filter(|minutes| *minutes > 0)
        .unwrap_or(DEFAULT_BUILD_TIMEOUT_MINUTES)
}

/// Deploy buildspec: target spec, then top-level spec, then the default
pub fn resolve_deploy_spec<'c>(config: &'c PipelineConfig, target: &'c Target) -> &'c str {
    target
        .deploy_spec()
        .or(config.kind.deploy.spec.as_deref())
        .unwrap_or(DEFAULT_DEPLOY_SPEC)
}

/// Managed image names map to CodeBuild ids; anything else is a custom image
pub fn resolve_image(image: &str) -> String {
    let upper = image.to_uppercase();
    MANAGED_IMAGES
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| image.to_string())
}
