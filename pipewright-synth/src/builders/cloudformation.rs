//! CloudFormation change-set expansion
//!
//! A change-set deployment is declared as several ordered actions inside the
//! target group's stage: create the change set, optionally wait for a manual
//! approval, then execute it.

use pipewright_core::domain::action::{ActionCategory, ActionDescriptor};
use pipewright_core::domain::config::{PipelineConfig, Target};

use crate::action::{ActionBuilder, ActionProvider};
use crate::context::DeploymentContext;
use crate::error::Result;

/// Actions deploying `target` to `region` through a change set
pub fn generate_actions(
    ctx: &DeploymentContext,
    config: &PipelineConfig,
    target: &Target,
    region: &str,
    notification_arn: Option<&str>,
) -> Result<Vec<ActionDescriptor>> {
    let base = format!("{}-{}", target.name, region);
    let mut actions = Vec::with_capacity(3);
    let mut run_order = 1;

    actions.push(
        ActionBuilder::new(ctx, config)
            .name(format!("{}-create", base))
            .provider(ActionProvider::CloudFormation)
            .category(ActionCategory::Deploy)
            .target(target)
            .region(region)
            .action_mode(Some("CHANGE_SET_REPLACE"))
            .run_order(run_order)
            .build()?,
    );

    if target.wants_change_set_approval() {
        run_order += 1;
        actions.push(
            ActionBuilder::new(ctx, config)
                .name(format!("{}-approval", base))
                .provider(ActionProvider::Manual)
                .category(ActionCategory::Approval)
                .target(target)
                .region(region)
                .notification_arn(notification_arn)
                .run_order(run_order)
                .build()?,
        );
    }

    run_order += 1;
    actions.push(
        ActionBuilder::new(ctx, config)
            .name(format!("{}-execute", base))
            .provider(ActionProvider::CloudFormation)
            .category(ActionCategory::Deploy)
            .target(target)
            .region(region)
            .action_mode(Some("CHANGE_SET_EXECUTE"))
            .run_order(run_order)
            .build()?,
    );

    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_stack_input;

    const SOURCE: &str = r#"
input:
  name: sample
  type:
    source: { name: codecommit }
    build: { name: codebuild }
  environments:
    targets:
      - - name: dev
          id: 222222222222
        - name: prod
          id: 333333333333
          type:
            deploy: { name: cloudformation, change_set: true, change_set_approval: true }
"#;

    #[test]
    fn test_create_then_execute() {
        let ctx = DeploymentContext::new("eu-west-1", "111111111111");
        let stack = parse_stack_input(SOURCE).unwrap();
        let target = &stack.input.environments.targets[0][0];

        let actions = generate_actions(&ctx, &stack.input, target, "eu-west-1", None).unwrap();

        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name, "dev-eu-west-1-create");
        assert_eq!(actions[0].action_mode.as_deref(), Some("CHANGE_SET_REPLACE"));
        assert_eq!(actions[0].run_order, 1);
        assert!(actions[0].configuration.contains_key("TemplatePath"));
        assert_eq!(actions[1].name, "dev-eu-west-1-execute");
        assert_eq!(actions[1].action_mode.as_deref(), Some("CHANGE_SET_EXECUTE"));
        assert_eq!(actions[1].run_order, 2);
        assert_eq!(
            actions[0].configuration["ChangeSetName"],
            actions[1].configuration["ChangeSetName"]
        );
    }

    #[test]
    fn test_change_set_approval_inserted() {
        let ctx = DeploymentContext::new("eu-west-1", "111111111111");
        let stack = parse_stack_input(SOURCE).unwrap();
        let target = &stack.input.environments.targets[0][1];

        let actions = generate_actions(
            &ctx,
            &stack.input,
            target,
            "us-east-1",
            Some("arn:aws:sns:eu-west-1:111111111111:sample"),
        )
        .unwrap();

        let names: Vec<_> = actions.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "prod-us-east-1-create",
                "prod-us-east-1-approval",
                "prod-us-east-1-execute"
            ]
        );
        assert_eq!(actions[1].provider, "Manual");
        assert_eq!(
            actions[1].configuration["NotificationArn"],
            "arn:aws:sns:eu-west-1:111111111111:sample"
        );
        assert_eq!(
            actions.iter().map(|a| a.run_order).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
