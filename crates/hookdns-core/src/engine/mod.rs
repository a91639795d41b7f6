//! Lifecycle engine
//!
//! The LifecycleEngine is responsible for:
//! - Decoding the lifecycle notification
//! - Resolving instance attributes
//! - Rendering the change batch templates
//! - Submitting the batch and waiting for propagation
//! - Releasing the lifecycle hook
//!
//! ## Architecture
//!
//! ```text
//!            payload
//!               │
//!               ▼
//!      ┌──────────────────┐
//!      │ LifecycleEngine  │
//!      └──────────────────┘
//!               │
//!     ┌─────────┼──────────────────────┬─────────────────────┐
//!     ▼         ▼                      ▼                     ▼
//! ┌────────┐ ┌───────────────────┐ ┌─────────────┐ ┌─────────────────────┐
//! │ decode │ │ InstanceDirectory │ │ RecordStore │ │ LifecycleController │
//! └────────┘ └───────────────────┘ └─────────────┘ └─────────────────────┘
//! ```
//!
//! ## Submission Boundary
//!
//! Everything up to and including template rendering has no external effect,
//! so failures there are returned as `Err` and the transport may redeliver the
//! notification. Once the batch is submitted the engine owns the outcome: a
//! rejected or unpropagated batch is reported as ABANDON and the invocation
//! returns `Ok`.
//!
//! Every actionable notification needs a hosted zone. An empty change list
//! is still submitted; the DNS service rejects it and the hook is abandoned,
//! so an instance never enters service on a hook that wrote no records.

use tracing::{error, info};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::instance::resolve_attributes;
use crate::lookup::ExistingRecordLookup;
use crate::notification::{self, LifecycleMessage, MutationInstruction};
use crate::propagation::PropagationDriver;
use crate::reporter::OutcomeReporter;
use crate::template::{self, ResolutionContext};
use crate::traits::{InstanceDirectory, LifecycleController, LifecycleResult, RecordStore};

/// How an invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Test notification; nothing was called
    Ignored,

    /// The batch propagated and CONTINUE was sent
    Continued,

    /// The batch was submitted but failed; ABANDON was sent
    Abandoned {
        /// Why the batch failed
        reason: String,
    },
}

/// Lifecycle hook engine
///
/// ## Lifecycle
///
/// 1. Create with [`LifecycleEngine::new()`] once per process
/// 2. Call [`LifecycleEngine::handle()`] once per delivered notification
///
/// The engine holds no per-invocation state; concurrent calls to `handle` are
/// independent.
pub struct LifecycleEngine {
    /// Instance directory for address lookups
    directory: Box<dyn InstanceDirectory>,

    /// DNS record store for lookups, mutations and status polls
    store: Box<dyn RecordStore>,

    /// Lifecycle controller for the final signal
    controller: Box<dyn LifecycleController>,

    /// Engine configuration
    config: EngineConfig,
}

impl LifecycleEngine {
    /// Create a new lifecycle engine
    ///
    /// # Parameters
    ///
    /// - `directory`: Instance directory implementation
    /// - `store`: Record store implementation
    /// - `controller`: Lifecycle controller implementation
    /// - `config`: Engine configuration
    ///
    /// # Returns
    ///
    /// - `Ok(LifecycleEngine)`: Ready to handle notifications
    /// - `Err(Error::Config)`: The configuration is invalid
    pub fn new(
        directory: Box<dyn InstanceDirectory>,
        store: Box<dyn RecordStore>,
        controller: Box<dyn LifecycleController>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            directory,
            store,
            controller,
            config,
        })
    }

    /// Handle one notification payload
    ///
    /// # Returns
    ///
    /// - `Ok(InvocationOutcome)`: The notification was dealt with
    /// - `Err(Error)`: A failure before submission; safe to redeliver
    pub async fn handle(&self, payload: &[u8]) -> Result<InvocationOutcome> {
        let notification = notification::decode(payload, &self.config.test_event)?;

        if notification.is_test() {
            info!(
                "Received test notification for group {}, nothing to do",
                notification.message.auto_scaling_group_name
            );
            return Ok(InvocationOutcome::Ignored);
        }

        let message = notification.message;
        let mut instruction = notification.instruction;

        info!(
            "Handling {} for instance {} in group {}",
            message.event, message.instance_id, message.auto_scaling_group_name
        );

        let reporter = OutcomeReporter::new(self.controller.as_ref());

        self.render(&message, &mut instruction).await?;

        // Past this point the batch may have been applied; never return Err.
        let driver = PropagationDriver::new(self.store.as_ref(), self.config.propagation.clone());

        match driver.submit(&instruction.hosted_zone_id, &instruction.changes).await {
            Ok(handle) => {
                info!(
                    "Change {} for instance {} is in sync",
                    handle.change_id, message.instance_id
                );
                reporter.report(&message, LifecycleResult::Continue).await;
                Ok(InvocationOutcome::Continued)
            }
            Err(e) => {
                error!(
                    "Change batch for instance {} failed, abandoning: {}",
                    message.instance_id, e
                );
                reporter.report(&message, LifecycleResult::Abandon).await;
                Ok(InvocationOutcome::Abandoned {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Resolve every template in the instruction against the message's instance
    async fn render(&self, message: &LifecycleMessage, instruction: &mut MutationInstruction) -> Result<()> {
        if instruction.hosted_zone_id.trim().is_empty() {
            return Err(Error::decode("Notification metadata is missing HostedZoneID"));
        }

        let instance = resolve_attributes(self.directory.as_ref(), &message.instance_id).await?;

        let ctx = ResolutionContext::new(
            instance,
            instruction.hosted_zone_id.clone(),
            ExistingRecordLookup::new(self.store.as_ref()),
        );

        template::resolve(instruction, &ctx).await
    }
}
