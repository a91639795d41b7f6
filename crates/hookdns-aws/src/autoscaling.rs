//! Auto Scaling lifecycle controller

use async_trait::async_trait;
use aws_sdk_autoscaling::error::DisplayErrorContext;
use hookdns_core::traits::{CompleteLifecycleAction, LifecycleController};
use hookdns_core::{Error, Result};
use tracing::debug;

/// Lifecycle controller backed by Auto Scaling `CompleteLifecycleAction`
#[derive(Debug, Clone)]
pub struct AutoScalingLifecycleController {
    client: aws_sdk_autoscaling::Client,
}

impl AutoScalingLifecycleController {
    /// Create a controller over an Auto Scaling client
    pub fn new(client: aws_sdk_autoscaling::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LifecycleController for AutoScalingLifecycleController {
    async fn complete_lifecycle_action(&self, action: &CompleteLifecycleAction) -> Result<()> {
        debug!("Completing lifecycle action: {:?}", action);

        self.client
            .complete_lifecycle_action()
            .auto_scaling_group_name(&action.auto_scaling_group_name)
            .instance_id(&action.instance_id)
            .lifecycle_hook_name(&action.lifecycle_hook_name)
            .lifecycle_action_token(&action.lifecycle_action_token)
            .lifecycle_action_result(action.result.as_str())
            .send()
            .await
            .map_err(|e| {
                Error::report(format!(
                    "CompleteLifecycleAction failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    fn controller_name(&self) -> &'static str {
        "autoscaling"
    }
}
