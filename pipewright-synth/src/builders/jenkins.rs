//! Jenkins build stage

use pipewright_core::domain::action::ActionCategory;
use pipewright_core::domain::config::PipelineConfig;
use pipewright_core::domain::stage::Stage;

use crate::action::{ActionBuilder, ActionProvider};
use crate::context::DeploymentContext;
use crate::error::Result;

/// `Build` stage delegating to a Jenkins job of the pipeline's name
pub fn build_stage(ctx: &DeploymentContext, config: &PipelineConfig) -> Result<Stage> {
    let action = ActionBuilder::new(ctx, config)
        .name("Build")
        .action_name("build")
        .provider(ActionProvider::Jenkins)
        .category(ActionCategory::Build)
        .run_order(1)
        .build()?;

    Ok(Stage::new("Build", vec![action]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_stack_input;

    #[test]
    fn test_jenkins_build_stage() {
        let ctx = DeploymentContext::new("eu-west-1", "111111111111");
        let stack = parse_stack_input(
            r#"
input:
  name: sample
  type:
    source: { name: codecommit }
    build: { name: jenkins }
"#,
        )
        .unwrap();

        let stage = build_stage(&ctx, &stack.input).unwrap();
        assert_eq!(stage.name, "Build");
        let action = &stage.actions[0];
        assert_eq!(action.name, "build");
        assert_eq!(action.owner, "Custom");
        assert_eq!(action.provider, "Jenkins");
        assert_eq!(action.configuration["ProjectName"], "sample");
        assert_eq!(action.output_artifacts, vec!["sample-build"]);
    }
}
