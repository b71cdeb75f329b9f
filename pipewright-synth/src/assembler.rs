//! Pipeline stack assembler
//!
//! Single deterministic pass over the configuration:
//! notifications, source stage, build stage, one stage per target group,
//! the pipeline declaration, and finally the webhook for GitHub sources.
//!
//! Results are threaded through a [`StackAccumulator`] instead of being
//! written back into the input, so assembling the same input twice yields
//! the same stack.

use pipewright_core::domain::action::{ActionCategory, ActionDescriptor};
use pipewright_core::domain::config::{PipelineConfig, Target};
use pipewright_core::domain::resource::{BuildProject, NotificationTopic, SynthesizedStack};
use pipewright_core::domain::stage::Stage;
use pipewright_core::dto::stack::{RegionParams, StackInput};
use tracing::{debug, info, warn};

use crate::action::{ActionBuilder, ActionProvider};
use crate::builders::codebuild::CodeBuild;
use crate::builders::{cloudformation, codecommit, github, jenkins, notifications, pipeline, s3};
use crate::context::DeploymentContext;
use crate::error::{Result, SynthError};
use crate::provider::{BuildProvider, DEFAULT_DEPLOY_PROVIDER, DeployProvider, SourceProvider};

/// Intermediate results gathered while assembling a stack
#[derive(Debug, Default)]
pub struct StackAccumulator {
    pub topic: Option<NotificationTopic>,
    pub projects: Vec<BuildProject>,
    pub stages: Vec<Stage>,
}

impl StackAccumulator {
    pub fn topic_arn(&self) -> Option<&str> {
        self.topic.as_ref().map(|topic| topic.arn.as_str())
    }

    /// Record a build project once; later declarations with the same name
    /// are dropped
    pub fn add_project(&mut self, project: BuildProject) {
        if !self.projects.iter().any(|p| p.name == project.name) {
            self.projects.push(project);
        }
    }

    pub fn push_stage(&mut self, stage: Stage) {
        debug!(stage = %stage.name, actions = stage.actions.len(), "Appended stage");
        self.stages.push(stage);
    }
}

/// Assembles one pipeline stack from its input
pub struct PipelineStack<'a> {
    ctx: &'a DeploymentContext,
    input: &'a StackInput,
}

impl<'a> PipelineStack<'a> {
    pub fn new(ctx: &'a DeploymentContext, input: &'a StackInput) -> Self {
        Self { ctx, input }
    }

    fn config(&self) -> &'a PipelineConfig {
        &self.input.input
    }

    /// Parameters resolved for the deployment region
    fn deployment_params(&self) -> Result<&'a RegionParams> {
        self.input
            .ssm_params
            .get(&self.ctx.region)
            .ok_or_else(|| SynthError::MissingRegionParams(self.ctx.region.clone()))
    }

    /// Run the full assembly
    ///
    /// # Errors
    /// Any configuration error aborts the whole stack; no partial result is
    /// returned.
    pub fn synthesize(&self) -> Result<SynthesizedStack> {
        let config = self.config();
        info!("Pipeline creation/update of {} commenced", config.name);

        let mut acc = StackAccumulator {
            topic: notifications::notification_topic(self.ctx, config),
            ..StackAccumulator::default()
        };

        let source = SourceProvider::from_name(&config.kind.source.name);
        self.add_source_stage(source, &mut acc)?;
        self.add_build_stage(&mut acc)?;

        for (index, group) in config.environments.targets.iter().enumerate() {
            let stage = self.target_group_stage(index, group, &mut acc)?;
            acc.push_stage(stage);
        }

        let StackAccumulator {
            topic,
            projects,
            stages,
        } = acc;

        let pipeline =
            pipeline::declare_pipeline(self.ctx, config, &self.input.ssm_params, stages)?;

        let webhook = match source {
            Some(SourceProvider::GitHub) => Some(github::create_webhook(config, &pipeline)?),
            _ => None,
        };

        info!(
            pipeline = %pipeline.name,
            stages = pipeline.stages.len(),
            projects = projects.len(),
            "Pipeline assembled"
        );

        Ok(SynthesizedStack {
            name: config.name.clone(),
            topic,
            projects,
            pipeline,
            webhook,
        })
    }

    fn add_source_stage(
        &self,
        source: Option<SourceProvider>,
        acc: &mut StackAccumulator,
    ) -> Result<()> {
        let config = self.config();
        if let Some(provider) = source {
            debug!(provider = %provider, "Resolved source provider");
        }
        let stage = match source {
            Some(SourceProvider::CodeCommit) => codecommit::source_stage(self.ctx, config)?,
            Some(SourceProvider::GitHub) => github::source_stage(self.ctx, config)?,
            Some(SourceProvider::S3) => s3::source_stage(self.ctx, config)?,
            None => {
                warn!(
                    source = %config.kind.source.name,
                    "Unrecognized source provider, no source stage declared"
                );
                return Ok(());
            }
        };
        acc.push_stage(stage);
        Ok(())
    }

    fn add_build_stage(&self, acc: &mut StackAccumulator) -> Result<()> {
        let config = self.config();
        let build = BuildProvider::from_name(&config.kind.build.name);
        if let Some(provider) = build {
            debug!(provider = %provider, "Resolved build provider");
        }
        match build {
            Some(BuildProvider::CodeBuild) => {
                let params = self.deployment_params()?;
                let (project, stage) =
                    CodeBuild::new(self.ctx, config, params).build_stage()?;
                acc.add_project(project);
                acc.push_stage(stage);
            }
            Some(BuildProvider::Jenkins) => {
                acc.push_stage(jenkins::build_stage(self.ctx, config)?);
            }
            None => {
                warn!(
                    build = %config.kind.build.name,
                    "Unrecognized build provider, no build stage declared"
                );
            }
        }
        Ok(())
    }

    /// One stage holding every action of a target group
    fn target_group_stage(
        &self,
        index: usize,
        group: &[Target],
        acc: &mut StackAccumulator,
    ) -> Result<Stage> {
        let config = self.config();
        let top_level_action = config.kind.deploy.action.as_deref();
        let mut actions = Vec::new();

        for target in group {
            if target.is_approval() {
                actions.push(
                    ActionBuilder::new(self.ctx, config)
                        .name(target.name.clone())
                        .action_name(target.name.clone())
                        .provider(ActionProvider::Manual)
                        .category(ActionCategory::Approval)
                        .target(target)
                        .notification_arn(acc.topic_arn())
                        .run_order(1)
                        .build()?,
                );
                continue;
            }

            for region in effective_regions(config, target, self.ctx) {
                let provider_name = resolve_deploy_provider(config, target);
                let provider = DeployProvider::from_name(provider_name);
                if let Some(provider) = provider {
                    debug!(
                        target_name = %target.name,
                        region = %region,
                        provider = %provider,
                        "Resolved deploy provider"
                    );
                }
                match provider {
                    Some(DeployProvider::CloudFormation) => {
                        if target.uses_change_set() {
                            actions.extend(cloudformation::generate_actions(
                                self.ctx,
                                config,
                                target,
                                &region,
                                acc.topic_arn(),
                            )?);
                        } else {
                            actions.push(self.regional_action(
                                target,
                                &region,
                                ActionProvider::CloudFormation,
                                ActionCategory::Deploy,
                                top_level_action,
                            )?);
                        }
                    }
                    Some(DeployProvider::CodeDeploy) => {
                        actions.push(self.regional_action(
                            target,
                            &region,
                            ActionProvider::CodeDeploy,
                            ActionCategory::Deploy,
                            top_level_action,
                        )?);
                    }
                    Some(DeployProvider::S3) => {
                        debug!(target_name = %target.name, region = %region, "S3 deploy declares no action");
                    }
                    Some(DeployProvider::Lambda) => {
                        actions.push(self.regional_action(
                            target,
                            &region,
                            ActionProvider::Lambda,
                            ActionCategory::Invoke,
                            top_level_action,
                        )?);
                    }
                    Some(DeployProvider::CodeBuild) => {
                        let params = self.deployment_params()?;
                        let (project, action) =
                            CodeBuild::new(self.ctx, config, params).deploy_action(target)?;
                        acc.add_project(project);
                        actions.push(action);
                    }
                    Some(DeployProvider::ServiceCatalog) => {
                        actions.push(self.regional_action(
                            target,
                            &region,
                            ActionProvider::ServiceCatalog,
                            ActionCategory::Deploy,
                            top_level_action,
                        )?);
                    }
                    None => {
                        warn!(
                            target_name = %target.name,
                            provider = %provider_name,
                            "Unrecognized deploy provider, no action declared"
                        );
                    }
                }
            }
        }

        if actions.is_empty() {
            warn!(group = index + 1, "Target group produced no actions");
        }

        Ok(Stage::new(stage_name(index, group), actions))
    }

    /// `<target>-<region>` action for single-action providers
    fn regional_action(
        &self,
        target: &Target,
        region: &str,
        provider: ActionProvider,
        category: ActionCategory,
        action_mode: Option<&str>,
    ) -> Result<ActionDescriptor> {
        let name = format!("{}-{}", target.name, region);
        ActionBuilder::new(self.ctx, self.config())
            .name(name.clone())
            .action_name(name)
            .provider(provider)
            .category(category)
            .region(region)
            .target(target)
            .action_mode(action_mode)
            .run_order(1)
            .build()
    }
}

/// Validate `ctx`, then assemble `input` against it
pub fn synthesize(ctx: &DeploymentContext, input: &StackInput) -> Result<SynthesizedStack> {
    ctx.validate()?;
    PipelineStack::new(ctx, input).synthesize()
}

/// Regions a target deploys to
///
/// A non-empty pipeline-level list wins over the target's own; when both
/// are empty the deployment region is used.
pub fn effective_regions(
    config: &PipelineConfig,
    target: &Target,
    ctx: &DeploymentContext,
) -> Vec<String> {
    let regions = config
        .regions
        .as_ref()
        .filter(|regions| !regions.is_empty())
        .unwrap_or(&target.regions);

    if regions.is_empty() {
        vec![ctx.region.clone()]
    } else {
        regions.clone()
    }
}

/// Deploy provider name: target invoke, target deploy, top-level deploy,
/// then `cloudformation`
pub fn resolve_deploy_provider<'c>(config: &'c PipelineConfig, target: &'c Target) -> &'c str {
    target
        .provider_override()
        .or(config
            .kind
            .deploy
            .name
            .as_deref()
            .filter(|name| !name.is_empty()))
        .unwrap_or(DEFAULT_DEPLOY_PROVIDER)
}

/// Stage name: the first target's `step_name`, else a numbered label
pub fn stage_name(index: usize, group: &[Target]) -> String {
    let Some(first) = group.first() else {
        return format!("deployment-stage-{}", index + 1);
    };

    if let Some(step_name) = first.step_name.as_deref().filter(|s| !s.is_empty()) {
        return step_name.to_string();
    }

    let label = if first.leads_approval_stage() {
        "approval"
    } else {
        "deployment"
    };
    format!("{}-stage-{}", label, index + 1)
}
