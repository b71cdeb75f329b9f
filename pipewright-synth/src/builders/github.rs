//! GitHub source stage and webhook
//!
//! The webhook points at the pipeline's source action, so it can only be
//! declared once the pipeline declaration exists.

use pipewright_core::domain::action::ActionCategory;
use pipewright_core::domain::config::PipelineConfig;
use pipewright_core::domain::resource::{PipelineDeclaration, Webhook};
use pipewright_core::domain::stage::Stage;

use crate::action::{ActionBuilder, ActionProvider, secrets_manager_reference};
use crate::context::DeploymentContext;
use crate::error::{Result, SynthError};

pub fn source_stage(ctx: &DeploymentContext, config: &PipelineConfig) -> Result<Stage> {
    let action = ActionBuilder::new(ctx, config)
        .name("source")
        .action_name("source")
        .provider(ActionProvider::GitHub)
        .category(ActionCategory::Source)
        .run_order(1)
        .build()?;

    Ok(Stage::new("Source", vec![action]))
}

/// Webhook triggering `pipeline` on pushes to the configured branch
pub fn create_webhook(config: &PipelineConfig, pipeline: &PipelineDeclaration) -> Result<Webhook> {
    let source = &config.kind.source;
    let token_path = source
        .oauth_token_path
        .as_deref()
        .ok_or_else(|| SynthError::missing("type.source.oauth_token_path"))?;
    let json_field = source
        .json_field
        .as_deref()
        .ok_or_else(|| SynthError::missing("type.source.json_field"))?;

    Ok(Webhook {
        name: format!("adf-webhook-{}", config.name),
        target_pipeline: pipeline.name.clone(),
        target_action: "source".to_string(),
        target_pipeline_version: 1,
        filter_json_path: "$.ref".to_string(),
        filter_match_equals: format!("refs/heads/{}", source.branch()),
        secret_token: secrets_manager_reference(token_path, json_field),
    })
}
