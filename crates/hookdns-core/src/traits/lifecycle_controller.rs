// # Lifecycle Controller Trait
//
// Defines the interface for releasing a paused lifecycle action.
//
// ## Implementations
//
// - Auto Scaling: `hookdns-aws` crate (`AutoScalingLifecycleController`)

use async_trait::async_trait;
use std::fmt;

/// Terminal result sent to the lifecycle controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleResult {
    /// Let the scaling activity proceed
    Continue,
    /// Abort the scaling activity
    Abandon,
}

impl LifecycleResult {
    /// Wire representation of the result
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleResult::Continue => "CONTINUE",
            LifecycleResult::Abandon => "ABANDON",
        }
    }
}

impl fmt::Display for LifecycleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a lifecycle action completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteLifecycleAction {
    /// Scaling group the action belongs to
    pub auto_scaling_group_name: String,
    /// Instance the action is paused on
    pub instance_id: String,
    /// Hook that paused the action
    pub lifecycle_hook_name: String,
    /// Token identifying this particular action
    pub lifecycle_action_token: String,
    /// Result to report
    pub result: LifecycleResult,
}

/// Trait for lifecycle controller implementations
#[async_trait]
pub trait LifecycleController: Send + Sync {
    /// Complete a lifecycle action with the given result
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The controller accepted the result
    /// - `Err(Error)`: Transport or API failure
    async fn complete_lifecycle_action(
        &self,
        action: &CompleteLifecycleAction,
    ) -> Result<(), crate::Error>;

    /// Get the controller name (for logging/debugging)
    fn controller_name(&self) -> &'static str;
}
