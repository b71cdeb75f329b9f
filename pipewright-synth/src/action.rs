//! Action builder
//!
//! Turns one logical pipeline step into a provider-specific
//! [`ActionDescriptor`]. Construction is pure: the only failure mode is a
//! missing required field, either on the builder itself (name, provider,
//! category) or in the configuration a provider needs.

use pipewright_core::domain::action::{ActionCategory, ActionDescriptor};
use pipewright_core::domain::config::{PipelineConfig, Target, TargetParams};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::context::DeploymentContext;
use crate::error::{Result, SynthError};
use crate::provider::BuildProvider;

/// Output artifact of every source action
pub const SOURCE_ARTIFACT: &str = "output-source";

const CHANGE_SET_EXECUTE: &str = "CHANGE_SET_EXECUTE";
const CREATE_UPDATE: &str = "CREATE_UPDATE";
const CLOUDFORMATION_CAPABILITIES: &str = "CAPABILITY_NAMED_IAM,CAPABILITY_AUTO_EXPAND";

/// Provider an action is declared against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionProvider {
    CodeCommit,
    GitHub,
    S3,
    CodeBuild,
    Jenkins,
    Manual,
    CloudFormation,
    CodeDeploy,
    Lambda,
    ServiceCatalog,
}

impl ActionProvider {
    pub fn owner(&self) -> &'static str {
        match self {
            ActionProvider::GitHub => "ThirdParty",
            ActionProvider::Jenkins => "Custom",
            _ => "AWS",
        }
    }

    /// Action mode applied when the caller gives none
    pub fn default_action_mode(&self) -> Option<&'static str> {
        match self {
            ActionProvider::CloudFormation => Some(CREATE_UPDATE),
            _ => None,
        }
    }
}

impl fmt::Display for ActionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionProvider::CodeCommit => "CodeCommit",
            ActionProvider::GitHub => "GitHub",
            ActionProvider::S3 => "S3",
            ActionProvider::CodeBuild => "CodeBuild",
            ActionProvider::Jenkins => "Jenkins",
            ActionProvider::Manual => "Manual",
            ActionProvider::CloudFormation => "CloudFormation",
            ActionProvider::CodeDeploy => "CodeDeploy",
            ActionProvider::Lambda => "Lambda",
            ActionProvider::ServiceCatalog => "ServiceCatalog",
        };
        write!(f, "{}", name)
    }
}

/// Output artifact of the build stage
pub fn build_artifact(config: &PipelineConfig) -> String {
    format!("{}-build", config.name)
}

/// Artifact consumed by deploy and invoke actions
///
/// The build output when the pipeline has a recognized build provider,
/// otherwise the raw source output.
pub fn deploy_input_artifact(config: &PipelineConfig) -> String {
    if BuildProvider::from_name(&config.kind.build.name).is_some() {
        build_artifact(config)
    } else {
        SOURCE_ARTIFACT.to_string()
    }
}

/// Builder for a single [`ActionDescriptor`]
#[derive(Debug, Clone)]
pub struct ActionBuilder<'a> {
    ctx: &'a DeploymentContext,
    config: &'a PipelineConfig,
    name: Option<String>,
    action_name: Option<String>,
    provider: Option<ActionProvider>,
    category: Option<ActionCategory>,
    run_order: u32,
    target: Option<&'a Target>,
    region: Option<String>,
    action_mode: Option<String>,
    notification_arn: Option<String>,
}

impl<'a> ActionBuilder<'a> {
    pub fn new(ctx: &'a DeploymentContext, config: &'a PipelineConfig) -> Self {
        Self {
            ctx,
            config,
            name: None,
            action_name: None,
            provider: None,
            category: None,
            run_order: 1,
            target: None,
            region: None,
            action_mode: None,
            notification_arn: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declared action name, defaults to `name`
    pub fn action_name(mut self, action_name: impl Into<String>) -> Self {
        self.action_name = Some(action_name.into());
        self
    }

    pub fn provider(mut self, provider: ActionProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn category(mut self, category: ActionCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn run_order(mut self, run_order: u32) -> Self {
        self.run_order = run_order;
        self
    }

    pub fn target(mut self, target: &'a Target) -> Self {
        self.target = Some(target);
        self
    }

    /// Region the action runs in, defaults to the deployment region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Action mode; an empty value counts as unset
    pub fn action_mode(mut self, mode: Option<&str>) -> Self {
        self.action_mode = mode
            .filter(|mode| !mode.is_empty())
            .map(|mode| mode.to_uppercase());
        self
    }

    /// Topic approval requests are published to
    pub fn notification_arn(mut self, arn: Option<&str>) -> Self {
        self.notification_arn = arn.map(str::to_string);
        self
    }

    /// Build the descriptor
    ///
    /// # Errors
    /// Returns an error if name, provider or category is unset, or if the
    /// provider needs a field the configuration does not carry.
    pub fn build(self) -> Result<ActionDescriptor> {
        let name = self
            .name
            .clone()
            .ok_or_else(|| SynthError::missing("action name"))?;
        let provider = self
            .provider
            .ok_or_else(|| SynthError::missing(format!("provider for action '{}'", name)))?;
        let category = self
            .category
            .ok_or_else(|| SynthError::missing(format!("category for action '{}'", name)))?;

        let region = self
            .region
            .clone()
            .unwrap_or_else(|| self.ctx.region.clone());
        let action_mode = self
            .action_mode
            .clone()
            .or_else(|| provider.default_action_mode().map(str::to_string));

        let configuration = self.configuration(provider, &region, action_mode.as_deref())?;
        let (input_artifacts, output_artifacts) = self.artifacts(provider, category);
        let role_arn = self.role_arn(provider)?;

        let descriptor = ActionDescriptor {
            name: self.action_name.clone().unwrap_or(name),
            category,
            owner: provider.owner().to_string(),
            provider: provider.to_string(),
            version: "1".to_string(),
            run_order: self.run_order,
            region,
            action_mode,
            configuration,
            input_artifacts,
            output_artifacts,
            role_arn,
        };

        debug!(
            action = %descriptor.name,
            provider = %descriptor.provider,
            region = %descriptor.region,
            run_order = descriptor.run_order,
            "Built action"
        );

        Ok(descriptor)
    }

    fn target_account(&self) -> Result<&'a str> {
        let target = self
            .target
            .ok_or_else(|| SynthError::missing("target for deploy action"))?;
        target
            .id
            .as_deref()
            .ok_or_else(|| SynthError::missing(format!("account id for target '{}'", target.name)))
    }

    fn target_name(&self) -> &str {
        self.target.map(|t| t.name.as_str()).unwrap_or_default()
    }

    fn stack_name(&self) -> String {
        self.target
            .and_then(|t| t.params.stack_name.clone())
            .unwrap_or_else(|| self.ctx.pipeline_name(&self.config.name))
    }

    fn required_param(&self, value: Option<&String>, key: &str) -> Result<String> {
        value.cloned().ok_or_else(|| {
            SynthError::missing(format!("params.{} for target '{}'", key, self.target_name()))
        })
    }

    fn configuration(
        &self,
        provider: ActionProvider,
        region: &str,
        action_mode: Option<&str>,
    ) -> Result<BTreeMap<String, String>> {
        let source = &self.config.kind.source;
        let mut config = BTreeMap::new();

        match provider {
            ActionProvider::CodeCommit => {
                config.insert(
                    "RepositoryName".to_string(),
                    source
                        .repository
                        .clone()
                        .unwrap_or_else(|| self.config.name.clone()),
                );
                config.insert("BranchName".to_string(), source.branch().to_string());
                config.insert(
                    "PollForSourceChanges".to_string(),
                    source.poll_for_changes.to_string(),
                );
            }
            ActionProvider::GitHub => {
                let owner = source
                    .owner
                    .clone()
                    .ok_or_else(|| SynthError::missing("type.source.owner"))?;
                let token_path = source
                    .oauth_token_path
                    .as_deref()
                    .ok_or_else(|| SynthError::missing("type.source.oauth_token_path"))?;
                let json_field = source
                    .json_field
                    .as_deref()
                    .ok_or_else(|| SynthError::missing("type.source.json_field"))?;

                config.insert("Owner".to_string(), owner);
                config.insert(
                    "Repo".to_string(),
                    source
                        .repository
                        .clone()
                        .unwrap_or_else(|| self.config.name.clone()),
                );
                config.insert("Branch".to_string(), source.branch().to_string());
                config.insert(
                    "OAuthToken".to_string(),
                    secrets_manager_reference(token_path, json_field),
                );
                config.insert("PollForSourceChanges".to_string(), "false".to_string());
            }
            ActionProvider::S3 => {
                let bucket = source
                    .bucket_name
                    .clone()
                    .ok_or_else(|| SynthError::missing("type.source.bucket_name"))?;
                let key = source
                    .object_key
                    .clone()
                    .ok_or_else(|| SynthError::missing("type.source.object_key"))?;

                config.insert("S3Bucket".to_string(), bucket);
                config.insert("S3ObjectKey".to_string(), key);
                config.insert(
                    "PollForSourceChanges".to_string(),
                    source.poll_for_changes.to_string(),
                );
            }
            ActionProvider::CodeBuild => {
                let project = match self.target {
                    Some(target) => format!("adf-deploy-{}", target.name),
                    None => format!("adf-build-{}", self.config.name),
                };
                config.insert("ProjectName".to_string(), project);
            }
            ActionProvider::Jenkins => {
                config.insert("ProjectName".to_string(), self.config.name.clone());
            }
            ActionProvider::Manual => {
                config.insert(
                    "CustomData".to_string(),
                    format!("Approval stage for {}", self.config.name),
                );
                if let Some(arn) = &self.notification_arn {
                    config.insert("NotificationArn".to_string(), arn.clone());
                }
            }
            ActionProvider::CloudFormation => {
                let account = self.target_account()?;
                let mode = action_mode.unwrap_or(CREATE_UPDATE);
                let stack_name = self.stack_name();
                let deployment_role = self
                    .target
                    .and_then(|t| t.params.role.as_deref())
                    .unwrap_or("adf-cloudformation-deployment-role");

                config.insert("ActionMode".to_string(), mode.to_string());
                config.insert("StackName".to_string(), stack_name.clone());
                config.insert(
                    "RoleArn".to_string(),
                    format!("arn:aws:iam::{}:role/{}", account, deployment_role),
                );

                if mode.starts_with("CHANGE_SET") {
                    config.insert("ChangeSetName".to_string(), stack_name);
                }

                if mode != CHANGE_SET_EXECUTE {
                    let input = deploy_input_artifact(self.config);
                    let template = self
                        .target
                        .and_then(|t| t.params.template_filename.as_deref())
                        .unwrap_or("template.yml");

                    config.insert(
                        "TemplatePath".to_string(),
                        format!("{}::{}", input, template),
                    );
                    config.insert(
                        "TemplateConfiguration".to_string(),
                        format!("{}::params/{}_{}.json", input, self.target_name(), region),
                    );
                    config.insert(
                        "Capabilities".to_string(),
                        CLOUDFORMATION_CAPABILITIES.to_string(),
                    );
                }
            }
            ActionProvider::CodeDeploy => {
                let params = self.target_params()?;
                config.insert(
                    "ApplicationName".to_string(),
                    self.required_param(params.application_name.as_ref(), "application_name")?,
                );
                config.insert(
                    "DeploymentGroupName".to_string(),
                    self.required_param(
                        params.deployment_group_name.as_ref(),
                        "deployment_group_name",
                    )?,
                );
            }
            ActionProvider::Lambda => {
                let params = self.target_params()?;
                config.insert(
                    "FunctionName".to_string(),
                    self.required_param(params.function_name.as_ref(), "function_name")?,
                );
                if let Some(input) = &params.input {
                    config.insert("UserParameters".to_string(), user_parameters(input)?);
                }
            }
            ActionProvider::ServiceCatalog => {
                let params = self.target_params()?;
                config.insert(
                    "ProductId".to_string(),
                    self.required_param(params.product_id.as_ref(), "product_id")?,
                );
                config.insert(
                    "ConfigurationFilePath".to_string(),
                    params.configuration_file_path.clone().unwrap_or_else(|| {
                        format!("params/{}_{}.json", self.target_name(), region)
                    }),
                );
                config.insert(
                    "ProductVersionName".to_string(),
                    params
                        .product_version
                        .clone()
                        .unwrap_or_else(|| self.config.name.clone()),
                );
            }
        }

        Ok(config)
    }

    fn target_params(&self) -> Result<&'a TargetParams> {
        self.target
            .map(|t| &t.params)
            .ok_or_else(|| SynthError::missing("target for deploy action"))
    }

    fn artifacts(
        &self,
        provider: ActionProvider,
        category: ActionCategory,
    ) -> (Vec<String>, Vec<String>) {
        match (category, provider) {
            (ActionCategory::Source, _) => (Vec::new(), vec![SOURCE_ARTIFACT.to_string()]),
            (ActionCategory::Approval, _) => (Vec::new(), Vec::new()),
            (ActionCategory::Build, ActionProvider::CodeBuild) if self.target.is_some() => {
                (vec![deploy_input_artifact(self.config)], Vec::new())
            }
            (ActionCategory::Build, _) => (
                vec![SOURCE_ARTIFACT.to_string()],
                vec![build_artifact(self.config)],
            ),
            (ActionCategory::Deploy | ActionCategory::Invoke, _) => {
                (vec![deploy_input_artifact(self.config)], Vec::new())
            }
        }
    }

    fn role_arn(&self, provider: ActionProvider) -> Result<Option<String>> {
        let arn = match provider {
            ActionProvider::CodeCommit => {
                let account = self
                    .config
                    .kind
                    .source
                    .account_id
                    .as_deref()
                    .unwrap_or(&self.ctx.account_id);
                Some(format!("arn:aws:iam::{}:role/adf-codecommit-role", account))
            }
            ActionProvider::CloudFormation | ActionProvider::ServiceCatalog => Some(format!(
                "arn:aws:iam::{}:role/adf-cloudformation-role",
                self.target_account()?
            )),
            ActionProvider::CodeDeploy => Some(format!(
                "arn:aws:iam::{}:role/adf-codedeploy-role",
                self.target_account()?
            )),
            _ => None,
        };
        Ok(arn)
    }
}

/// CloudFormation dynamic reference to a Secrets Manager JSON field
pub(crate) fn secrets_manager_reference(path: &str, json_field: &str) -> String {
    format!(
        "{{{{resolve:secretsmanager:{}:SecretString:{}}}}}",
        path, json_field
    )
}

fn user_parameters(input: &serde_json::Value) -> Result<String> {
    match input {
        serde_json::Value::String(text) => Ok(text.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_stack_input;
    use pipewright_core::dto::stack::StackInput;

    fn ctx() -> DeploymentContext {
        DeploymentContext::new("eu-west-1", "111111111111")
    }

    fn stack() -> StackInput {
        parse_stack_input(
            r#"
input:
  name: sample
  type:
    source:
      name: github
      owner: acme
      repository: sample-repo
      oauth_token_path: /adf/github_token
      json_field: token
    build:
      name: codebuild
  environments:
    targets:
      - - name: dev
          id: 222222222222
          params:
            function_name: notify
            input: { stage: dev }
            application_name: app
            deployment_group_name: group
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_required_fields() {
        let ctx = ctx();
        let stack = stack();

        let result = ActionBuilder::new(&ctx, &stack.input)
            .provider(ActionProvider::Manual)
            .category(ActionCategory::Approval)
            .build();
        assert!(result.unwrap_err().to_string().contains("action name"));

        let result = ActionBuilder::new(&ctx, &stack.input)
            .name("x")
            .category(ActionCategory::Approval)
            .build();
        assert!(result.unwrap_err().to_string().contains("provider"));

        let result = ActionBuilder::new(&ctx, &stack.input)
            .name("x")
            .provider(ActionProvider::Manual)
            .build();
        assert!(result.unwrap_err().to_string().contains("category"));
    }

    #[test]
    fn test_region_defaults_to_deployment_region() {
        let ctx = ctx();
        let stack = stack();

        let action = ActionBuilder::new(&ctx, &stack.input)
            .name("approval")
            .provider(ActionProvider::Manual)
            .category(ActionCategory::Approval)
            .build()
            .unwrap();

        assert_eq!(action.region, "eu-west-1");
        assert_eq!(action.action_mode, None);
        assert_eq!(
            action.configuration["CustomData"],
            "Approval stage for sample"
        );
        assert!(!action.configuration.contains_key("NotificationArn"));
    }

    #[test]
    fn test_action_name_overrides_name() {
        let ctx = ctx();
        let stack = stack();

        let action = ActionBuilder::new(&ctx, &stack.input)
            .name("Build")
            .action_name("build")
            .provider(ActionProvider::CodeBuild)
            .category(ActionCategory::Build)
            .build()
            .unwrap();

        assert_eq!(action.name, "build");
        assert_eq!(action.configuration["ProjectName"], "adf-build-sample");
        assert_eq!(action.input_artifacts, vec!["output-source"]);
        assert_eq!(action.output_artifacts, vec!["sample-build"]);
    }

    #[test]
    fn test_cloudformation_defaults() {
        let ctx = ctx();
        let stack = stack();
        let target = &stack.input.environments.targets[0][0];

        let action = ActionBuilder::new(&ctx, &stack.input)
            .name("dev-us-east-1")
            .provider(ActionProvider::CloudFormation)
            .category(ActionCategory::Deploy)
            .target(target)
            .region("us-east-1")
            .build()
            .unwrap();

        assert_eq!(action.action_mode.as_deref(), Some("CREATE_UPDATE"));
        assert_eq!(action.region, "us-east-1");
        assert_eq!(
            action.role_arn.as_deref(),
            Some("arn:aws:iam::222222222222:role/adf-cloudformation-role")
        );
        assert_eq!(
            action.configuration["RoleArn"],
            "arn:aws:iam::222222222222:role/adf-cloudformation-deployment-role"
        );
        assert_eq!(action.configuration["StackName"], "adf-pipeline-sample");
        assert_eq!(
            action.configuration["TemplatePath"],
            "sample-build::template.yml"
        );
        assert!(!action.configuration.contains_key("ChangeSetName"));
        assert_eq!(action.input_artifacts, vec!["sample-build"]);
    }

    #[test]
    fn test_cloudformation_execute_mode_skips_template() {
        let ctx = ctx();
        let stack = stack();
        let target = &stack.input.environments.targets[0][0];

        let action = ActionBuilder::new(&ctx, &stack.input)
            .name("dev-us-east-1")
            .provider(ActionProvider::CloudFormation)
            .category(ActionCategory::Deploy)
            .target(target)
            .action_mode(Some("change_set_execute"))
            .build()
            .unwrap();

        assert_eq!(action.configuration["ChangeSetName"], "adf-pipeline-sample");
        assert!(!action.configuration.contains_key("TemplatePath"));
        assert!(!action.configuration.contains_key("Capabilities"));
    }

    #[test]
    fn test_cloudformation_replace_mode_carries_template() {
        let ctx = ctx();
        let stack = stack();
        let target = &stack.input.environments.targets[0][0];

        let action = ActionBuilder::new(&ctx, &stack.input)
            .name("dev-eu-west-1")
            .provider(ActionProvider::CloudFormation)
            .category(ActionCategory::Deploy)
            .target(target)
            .action_mode(Some("replace_on_failure"))
            .build()
            .unwrap();

        assert_eq!(action.action_mode.as_deref(), Some("REPLACE_ON_FAILURE"));
        assert_eq!(
            action.configuration["TemplatePath"],
            "sample-build::template.yml"
        );
        assert_eq!(
            action.configuration["TemplateConfiguration"],
            "sample-build::params/dev_eu-west-1.json"
        );
        assert!(!action.configuration.contains_key("ChangeSetName"));
    }

    #[test]
    fn test_github_source_configuration() {
        let ctx = ctx();
        let stack = stack();

        let action = ActionBuilder::new(&ctx, &stack.input)
            .name("source")
            .provider(ActionProvider::GitHub)
            .category(ActionCategory::Source)
            .build()
            .unwrap();

        assert_eq!(action.owner, "ThirdParty");
        assert_eq!(action.configuration["Repo"], "sample-repo");
        assert_eq!(
            action.configuration["OAuthToken"],
            "{{resolve:secretsmanager:/adf/github_token:SecretString:token}}"
        );
        assert_eq!(action.output_artifacts, vec!["output-source"]);
    }

    #[test]
    fn test_lambda_and_codedeploy_params() {
        let ctx = ctx();
        let stack = stack();
        let target = &stack.input.environments.targets[0][0];

        let lambda = ActionBuilder::new(&ctx, &stack.input)
            .name("dev-eu-west-1")
            .provider(ActionProvider::Lambda)
            .category(ActionCategory::Invoke)
            .target(target)
            .build()
            .unwrap();
        assert_eq!(lambda.configuration["FunctionName"], "notify");
        assert_eq!(lambda.configuration["UserParameters"], r#"{"stage":"dev"}"#);
        assert_eq!(lambda.role_arn, None);

        let deploy = ActionBuilder::new(&ctx, &stack.input)
            .name("dev-eu-west-1")
            .provider(ActionProvider::CodeDeploy)
            .category(ActionCategory::Deploy)
            .target(target)
            .build()
            .unwrap();
        assert_eq!(deploy.configuration["ApplicationName"], "app");
        assert_eq!(deploy.configuration["DeploymentGroupName"], "group");
    }

    #[test]
    fn test_service_catalog_requires_product() {
        let ctx = ctx();
        let stack = stack();
        let target = &stack.input.environments.targets[0][0];

        let result = ActionBuilder::new(&ctx, &stack.input)
            .name("dev-eu-west-1")
            .provider(ActionProvider::ServiceCatalog)
            .category(ActionCategory::Deploy)
            .target(target)
            .build();

        let err = result.unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("product_id"));
    }
}
