//! CloudFormation template rendering
//!
//! Turns a [`SynthesizedStack`] into the JSON document deployed as the
//! pipeline's stack. Logical ids are derived from resource names so the
//! same stack always renders the same template.

use serde_json::{Map, Value, json};
use std::collections::BTreeSet;

use pipewright_core::domain::action::ActionDescriptor;
use pipewright_core::domain::resource::{
    BuildProject, NotificationProtocol, NotificationTopic, PipelineDeclaration, SynthesizedStack,
    Webhook,
};
use pipewright_core::domain::stage::Stage;

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

pub const PIPELINE_LOGICAL_ID: &str = "Pipeline";
pub const TOPIC_LOGICAL_ID: &str = "NotificationTopic";
pub const SUBSCRIPTION_LOGICAL_ID: &str = "NotificationSubscription";
pub const WEBHOOK_LOGICAL_ID: &str = "Webhook";

/// Render the whole stack as a CloudFormation template
pub fn render_template(stack: &SynthesizedStack) -> Value {
    let mut resources = Map::new();

    if let Some(topic) = &stack.topic {
        resources.insert(TOPIC_LOGICAL_ID.to_string(), topic_resource(topic));
        resources.insert(
            SUBSCRIPTION_LOGICAL_ID.to_string(),
            subscription_resource(topic),
        );
    }

    let project_ids = project_logical_ids(&stack.projects);
    for (id, project) in project_ids.iter().zip(&stack.projects) {
        resources.insert(id.clone(), project_resource(project));
    }

    resources.insert(
        PIPELINE_LOGICAL_ID.to_string(),
        pipeline_resource(&stack.pipeline, &project_ids),
    );

    if let Some(webhook) = &stack.webhook {
        resources.insert(WEBHOOK_LOGICAL_ID.to_string(), webhook_resource(webhook));
    }

    json!({
        "AWSTemplateFormatVersion": TEMPLATE_FORMAT_VERSION,
        "Description": format!("Pipeline stack for {}", stack.name),
        "Resources": resources,
        "Outputs": {
            "PipelineName": { "Value": { "Ref": PIPELINE_LOGICAL_ID } }
        }
    })
}

/// Logical id for a build project: alphanumerics only, prefixed with `Project`
pub fn project_logical_id(name: &str) -> String {
    let mut id = String::from("Project");
    let mut upper = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if upper {
                id.push(c.to_ascii_uppercase());
            } else {
                id.push(c);
            }
            upper = false;
        } else {
            upper = true;
        }
    }
    id
}

/// Logical ids for `projects`, in order
///
/// Names that collapse to the same id get a numeric suffix, counting from
/// 2 in declaration order.
pub fn project_logical_ids(projects: &[BuildProject]) -> Vec<String> {
    let mut used = BTreeSet::new();
    projects
        .iter()
        .map(|project| {
            let base = project_logical_id(&project.name);
            let mut id = base.clone();
            let mut suffix = 2;
            while used.contains(&id) {
                id = format!("{}{}", base, suffix);
                suffix += 1;
            }
            used.insert(id.clone());
            id
        })
        .collect()
}

fn topic_resource(topic: &NotificationTopic) -> Value {
    json!({
        "Type": "AWS::SNS::Topic",
        "Properties": { "TopicName": topic.name }
    })
}

fn subscription_resource(topic: &NotificationTopic) -> Value {
    let protocol = match topic.protocol {
        NotificationProtocol::Email => "email",
        NotificationProtocol::Lambda => "lambda",
    };
    json!({
        "Type": "AWS::SNS::Subscription",
        "Properties": {
            "TopicArn": { "Ref": TOPIC_LOGICAL_ID },
            "Protocol": protocol,
            "Endpoint": topic.subscription_endpoint,
        }
    })
}

fn project_resource(project: &BuildProject) -> Value {
    let variables: Vec<Value> = project
        .environment_variables
        .iter()
        .map(|(name, value)| json!({ "Name": name, "Value": value, "Type": "PLAINTEXT" }))
        .collect();

    let mut source = json!({ "Type": "CODEPIPELINE" });
    if let Some(buildspec) = &project.buildspec {
        source["BuildSpec"] = json!(buildspec);
    }

    json!({
        "Type": "AWS::CodeBuild::Project",
        "Properties": {
            "Name": project.name,
            "Description": project.description,
            "ServiceRole": project.role_arn,
            "EncryptionKey": project.encryption_key,
            "TimeoutInMinutes": project.timeout_minutes,
            "Source": source,
            "Artifacts": { "Type": "CODEPIPELINE" },
            "Environment": {
                "Type": "LINUX_CONTAINER",
                "Image": project.image,
                "ComputeType": project.compute_type,
                "PrivilegedMode": project.privileged,
                "EnvironmentVariables": variables,
            }
        }
    })
}

fn pipeline_resource(pipeline: &PipelineDeclaration, project_ids: &[String]) -> Value {
    let stores: Vec<Value> = pipeline
        .artifact_stores
        .iter()
        .map(|store| {
            json!({
                "Region": store.region,
                "ArtifactStore": {
                    "Type": "S3",
                    "Location": store.bucket,
                    "EncryptionKey": { "Id": store.kms_key_arn, "Type": "KMS" },
                }
            })
        })
        .collect();

    let tags: Vec<Value> = pipeline
        .tags
        .iter()
        .map(|(key, value)| json!({ "Key": key, "Value": value }))
        .collect();

    let mut resource = json!({
        "Type": "AWS::CodePipeline::Pipeline",
        "Properties": {
            "Name": pipeline.name,
            "RoleArn": pipeline.role_arn,
            "RestartExecutionOnUpdate": pipeline.restart_execution_on_update,
            "ArtifactStores": stores,
            "Stages": pipeline.stages.iter().map(stage_value).collect::<Vec<_>>(),
            "Tags": tags,
        }
    });
    if !project_ids.is_empty() {
        resource["DependsOn"] = json!(project_ids);
    }
    resource
}

fn stage_value(stage: &Stage) -> Value {
    json!({
        "Name": stage.name,
        "Actions": stage.actions.iter().map(action_value).collect::<Vec<_>>(),
    })
}

fn action_value(action: &ActionDescriptor) -> Value {
    let artifacts = |names: &[String]| -> Vec<Value> {
        names.iter().map(|name| json!({ "Name": name })).collect()
    };

    let mut value = json!({
        "Name": action.name,
        "ActionTypeId": {
            "Category": action.category.to_string(),
            "Owner": action.owner,
            "Provider": action.provider,
            "Version": action.version,
        },
        "Configuration": action.configuration,
        "InputArtifacts": artifacts(&action.input_artifacts),
        "OutputArtifacts": artifacts(&action.output_artifacts),
        "RunOrder": action.run_order,
        "Region": action.region,
    });
    if let Some(role) = &action.role_arn {
        value["RoleArn"] = json!(role);
    }
    value
}

fn webhook_resource(webhook: &Webhook) -> Value {
    json!({
        "Type": "AWS::CodePipeline::Webhook",
        "Properties": {
            "Name": webhook.name,
            "Authentication": "GITHUB_HMAC",
            "AuthenticationConfiguration": { "SecretToken": webhook.secret_token },
            "Filters": [{
                "JsonPath": webhook.filter_json_path,
                "MatchEquals": webhook.filter_match_equals,
            }],
            "TargetAction": webhook.target_action,
            "TargetPipeline": { "Ref": PIPELINE_LOGICAL_ID },
            "TargetPipelineVersion": webhook.target_pipeline_version,
            "RegisterWithThirdParty": true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::synthesize;
    use crate::context::DeploymentContext;
    use crate::loader::parse_stack_input;

    const STACK: &str = r#"
input:
  name: sample
  notification_endpoint: team@example.com
  type:
    source:
      name: github
      owner: acme
      repository: web
      oauth_token_path: /adf/github_token
      json_field: token
    build: { name: codebuild }
  environments:
    targets:
      - - { name: approval }
      - - name: prod
          id: "222222222222"
          regions: [eu-west-1]
ssm_params:
  eu-west-1:
    modules: adf-artifacts-eu
    kms: arn:aws:kms:eu-west-1:111111111111:key/abc
"#;

    fn rendered() -> Value {
        let ctx = DeploymentContext::new("eu-west-1", "111111111111");
        let input = parse_stack_input(STACK).unwrap();
        render_template(&synthesize(&ctx, &input).unwrap())
    }

    #[test]
    fn test_project_logical_id() {
        assert_eq!(project_logical_id("adf-build-sample"), "ProjectAdfBuildSample");
        assert_eq!(project_logical_id("a_b.c"), "ProjectABC");
    }

    #[test]
    fn test_colliding_project_ids_are_suffixed() {
        let ctx = DeploymentContext::new("eu-west-1", "111111111111");
        let input = parse_stack_input(STACK).unwrap();
        let mut stack = synthesize(&ctx, &input).unwrap();

        let mut first = stack.projects[0].clone();
        first.name = "adf-deploy-a-b".to_string();
        let mut second = first.clone();
        second.name = "adf-deploy-a_b".to_string();
        stack.projects = vec![first, second];

        assert_eq!(
            project_logical_ids(&stack.projects),
            vec!["ProjectAdfDeployAB", "ProjectAdfDeployAB2"]
        );

        let template = render_template(&stack);
        let resources = template["Resources"].as_object().unwrap();
        assert_eq!(
            resources["ProjectAdfDeployAB"]["Properties"]["Name"],
            "adf-deploy-a-b"
        );
        assert_eq!(
            resources["ProjectAdfDeployAB2"]["Properties"]["Name"],
            "adf-deploy-a_b"
        );
        assert_eq!(
            resources[PIPELINE_LOGICAL_ID]["DependsOn"],
            json!(["ProjectAdfDeployAB", "ProjectAdfDeployAB2"])
        );
    }

    #[test]
    fn test_template_has_every_resource() {
        let template = rendered();
        let resources = template["Resources"].as_object().unwrap();

        assert_eq!(template["AWSTemplateFormatVersion"], "2010-09-09");
        assert_eq!(resources[PIPELINE_LOGICAL_ID]["Type"], "AWS::CodePipeline::Pipeline");
        assert_eq!(resources[TOPIC_LOGICAL_ID]["Type"], "AWS::SNS::Topic");
        assert_eq!(
            resources[SUBSCRIPTION_LOGICAL_ID]["Properties"]["Protocol"],
            "email"
        );
        assert_eq!(resources[WEBHOOK_LOGICAL_ID]["Type"], "AWS::CodePipeline::Webhook");
        assert!(
            resources
                .values()
                .any(|r| r["Type"] == "AWS::CodeBuild::Project")
        );
    }

    #[test]
    fn test_pipeline_stages_render_in_order() {
        let template = rendered();
        let stages = template["Resources"][PIPELINE_LOGICAL_ID]["Properties"]["Stages"]
            .as_array()
            .unwrap();
        let names: Vec<&str> = stages.iter().map(|s| s["Name"].as_str().unwrap()).collect();

        assert_eq!(names.len(), 4);
        assert_eq!(names[0], "Source");
        assert_eq!(names[1], "Build");
        assert!(names[2].starts_with("approval"));

        let source = &stages[0]["Actions"][0];
        assert_eq!(source["ActionTypeId"]["Owner"], "ThirdParty");
        assert_eq!(source["OutputArtifacts"][0]["Name"], "output-source");
    }

    #[test]
    fn test_webhook_references_pipeline() {
        let template = rendered();
        let webhook = &template["Resources"][WEBHOOK_LOGICAL_ID]["Properties"];
        assert_eq!(webhook["TargetPipeline"]["Ref"], PIPELINE_LOGICAL_ID);
        assert_eq!(webhook["Filters"][0]["MatchEquals"], "refs/heads/master");
    }
}
