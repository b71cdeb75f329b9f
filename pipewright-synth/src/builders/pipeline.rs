//! Pipeline declaration

use pipewright_core::domain::config::PipelineConfig;
use pipewright_core::domain::resource::{ArtifactStore, PipelineDeclaration};
use pipewright_core::domain::stage::Stage;
use pipewright_core::dto::stack::RegionParams;
use std::collections::BTreeMap;

use crate::context::DeploymentContext;
use crate::error::{Result, SynthError};

/// Declare the pipeline resource over the assembled stages
///
/// Every region with resolved parameters gets an artifact store; the
/// deployment region must be one of them.
pub fn declare_pipeline(
    ctx: &DeploymentContext,
    config: &PipelineConfig,
    ssm_params: &BTreeMap<String, RegionParams>,
    stages: Vec<Stage>,
) -> Result<PipelineDeclaration> {
    if !ssm_params.contains_key(&ctx.region) {
        return Err(SynthError::MissingRegionParams(ctx.region.clone()));
    }

    let artifact_stores = ssm_params
        .iter()
        .map(|(region, params)| ArtifactStore {
            region: region.clone(),
            bucket: params.modules.clone(),
            kms_key_arn: params.kms.clone(),
        })
        .collect();

    Ok(PipelineDeclaration {
        name: ctx.pipeline_name(&config.name),
        role_arn: ctx.role_arn("adf-codepipeline-role"),
        artifact_stores,
        restart_execution_on_update: config.restart_execution_on_update,
        tags: config.tags.clone(),
        stages,
    })
}
