//! CodeCommit source stage

use pipewright_core::domain::action::ActionCategory;
use pipewright_core::domain::config::PipelineConfig;
use pipewright_core::domain::stage::Stage;

use crate::action::{ActionBuilder, ActionProvider};
use crate::context::DeploymentContext;
use crate::error::Result;

/// `Source-<account>` stage with one CodeCommit action
///
/// The account is `type.source.account_id`, defaulting to the deployment
/// account.
pub fn source_stage(ctx: &DeploymentContext, config: &PipelineConfig) -> Result<Stage> {
    let account = config
        .kind
        .source
        .account_id
        .as_deref()
        .unwrap_or(&ctx.account_id);

    let action = ActionBuilder::new(ctx, config)
        .name("source")
        .action_name("source")
        .provider(ActionProvider::CodeCommit)
        .category(ActionCategory::Source)
        .run_order(1)
        .build()?;

    Ok(Stage::new(format!("Source-{}", account), vec![action]))
}
