//! Configuration types for hookdns
//!
//! This module defines the engine settings. The Lambda binary fills them from
//! environment variables; library users can deserialize them from any serde
//! format.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Event kind published when a lifecycle hook notification target is first
/// configured. It carries no metadata and must never be acted on.
pub const TEST_NOTIFICATION_EVENT: &str = "autoscaling:TEST_NOTIFICATION";

/// Main engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Propagation polling settings
    #[serde(default)]
    pub propagation: PropagationConfig,

    /// Event kind treated as a test notification
    #[serde(default = "default_test_event")]
    pub test_event: String,
}

impl EngineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            propagation: PropagationConfig::default(),
            test_event: default_test_event(),
        }
    }

    /// Set the propagation settings
    pub fn with_propagation(mut self, propagation: PropagationConfig) -> Self {
        self.propagation = propagation;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.test_event.is_empty() {
            return Err(crate::Error::config("Test notification event cannot be empty"));
        }

        self.propagation.validate()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Propagation polling configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationConfig {
    /// Delay between change status checks (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Maximum number of change status checks before giving up
    ///
    /// With the defaults the driver waits up to two minutes, which keeps the
    /// whole invocation well inside the default lifecycle hook heartbeat.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl PropagationConfig {
    /// Create a propagation configuration
    pub fn new(poll_interval_secs: u64, max_attempts: u32) -> Self {
        Self {
            poll_interval_secs,
            max_attempts,
        }
    }

    /// Delay between change status checks
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Validate the propagation configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if !(1..=60).contains(&self.poll_interval_secs) {
            return Err(crate::Error::config(format!(
                "Poll interval must be between 1 and 60 seconds. Got: {}",
                self.poll_interval_secs
            )));
        }

        if !(1..=720).contains(&self.max_attempts) {
            return Err(crate::Error::config(format!(
                "Max poll attempts must be between 1 and 720. Got: {}",
                self.max_attempts
            )));
        }

        Ok(())
    }
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_test_event() -> String {
    TEST_NOTIFICATION_EVENT.to_string()
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    24
}
