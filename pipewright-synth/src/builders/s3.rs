//! S3 source stage

use pipewright_core::domain::action::ActionCategory;
use pipewright_core::domain::config::PipelineConfig;
use pipewright_core::domain::stage::Stage;

use crate::action::{ActionBuilder, ActionProvider};
use crate::context::DeploymentContext;
use crate::error::Result;

pub fn source_stage(ctx: &DeploymentContext, config: &PipelineConfig) -> Result<Stage> {
    let action = ActionBuilder::new(ctx, config)
        .name("source")
        .action_name("source")
        .provider(ActionProvider::S3)
        .category(ActionCategory::Source)
        .run_order(1)
        .build()?;

    Ok(Stage::new("Source", vec![action]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_stack_input;

    #[test]
    fn test_s3_source_stage() {
        let ctx = DeploymentContext::new("eu-west-1", "111111111111");
        let stack = parse_stack_input(
            r#"
input:
  name: sample
  type:
    source: { name: s3, bucket_name: drops, object_key: sample.zip, poll_for_changes: true }
    build: { name: codebuild }
"#,
        )
        .unwrap();

        let stage = source_stage(&ctx, &stack.input).unwrap();
        assert_eq!(stage.name, "Source");
        let action = &stage.actions[0];
        assert_eq!(action.provider, "S3");
        assert_eq!(action.configuration["S3Bucket"], "drops");
        assert_eq!(action.configuration["S3ObjectKey"], "sample.zip");
        assert_eq!(action.configuration["PollForSourceChanges"], "true");
    }

    #[test]
    fn test_s3_source_requires_bucket() {
        let ctx = DeploymentContext::new("eu-west-1", "111111111111");
        let stack = parse_stack_input(
            r#"
input:
  name: sample
  type:
    source: { name: s3 }
    build: { name: codebuild }
"#,
        )
        .unwrap();

        let err = source_stage(&ctx, &stack.input).unwrap_err();
        assert!(err.to_string().contains("bucket_name"));
    }
}
