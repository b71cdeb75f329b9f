//! Pipeline notification topic

use pipewright_core::domain::config::PipelineConfig;
use pipewright_core::domain::resource::{NotificationProtocol, NotificationTopic};

use crate::context::DeploymentContext;

/// Function relaying topic messages to chat channels
const CHAT_RELAY_FUNCTION: &str = "SendSlackNotification";

/// Topic for the configured notification endpoint, if any
///
/// Endpoints containing `@` are e-mail addresses; anything else is a chat
/// channel reached through the notification Lambda.
pub fn notification_topic(
    ctx: &DeploymentContext,
    config: &PipelineConfig,
) -> Option<NotificationTopic> {
    let endpoint = config
        .notification_endpoint
        .as_deref()
        .filter(|endpoint| !endpoint.trim().is_empty())?;

    let (protocol, subscription_endpoint) = if endpoint.contains('@') {
        (NotificationProtocol::Email, endpoint.to_string())
    } else {
        (
            NotificationProtocol::Lambda,
            format!(
                "arn:aws:lambda:{}:{}:function:{}",
                ctx.region, ctx.account_id, CHAT_RELAY_FUNCTION
            ),
        )
    };

    let name = format!("adf-notifications-{}", config.name);
    let arn = format!("arn:aws:sns:{}:{}:{}", ctx.region, ctx.account_id, name);

    Some(NotificationTopic {
        name,
        arn,
        endpoint: endpoint.to_string(),
        protocol,
        subscription_endpoint,
    })
}
