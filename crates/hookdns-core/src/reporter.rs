//! Lifecycle outcome reporting
//!
//! The reporter is the last step of every actionable invocation. A failed
//! completion is logged and swallowed: the scaling group falls back to the
//! hook's default result once the heartbeat timeout expires, so there is
//! nothing useful a caller could do with the error.

use tracing::{error, info};

use crate::notification::LifecycleMessage;
use crate::traits::{CompleteLifecycleAction, LifecycleController, LifecycleResult};

/// Sends CONTINUE or ABANDON for a lifecycle message
pub struct OutcomeReporter<'a> {
    controller: &'a dyn LifecycleController,
}

impl<'a> OutcomeReporter<'a> {
    /// Create a reporter over the given controller
    pub fn new(controller: &'a dyn LifecycleController) -> Self {
        Self { controller }
    }

    /// Complete the lifecycle action described by `message`
    ///
    /// # Returns
    ///
    /// Whether the controller accepted the result.
    pub async fn report(&self, message: &LifecycleMessage, result: LifecycleResult) -> bool {
        let action = CompleteLifecycleAction {
            auto_scaling_group_name: message.auto_scaling_group_name.clone(),
            instance_id: message.instance_id.clone(),
            lifecycle_hook_name: message.lifecycle_hook_name.clone(),
            lifecycle_action_token: message.lifecycle_action_token.clone(),
            result,
        };

        match self.controller.complete_lifecycle_action(&action).await {
            Ok(()) => {
                info!(
                    "Completed lifecycle action {} for instance {} with {}",
                    action.lifecycle_hook_name, action.instance_id, result
                );
                true
            }
            Err(e) => {
                error!(
                    "{}: failed to complete lifecycle action {} for instance {} with {}: {}",
                    self.controller.controller_name(),
                    action.lifecycle_hook_name,
                    action.instance_id,
                    result,
                    e
                );
                false
            }
        }
    }
}
