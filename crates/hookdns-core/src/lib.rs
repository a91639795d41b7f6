// # hookdns-core
//
// Core library for lifecycle-hook driven DNS record management.
//
// An autoscaling lifecycle hook pauses an instance launch or termination and
// publishes a notification. This crate turns that notification into a DNS
// change batch, confirms the change has propagated, and releases the hook.
//
// ## Architecture Overview
//
// - **InstanceDirectory**: Trait for looking up instance network attributes
// - **RecordStore**: Trait for reading, mutating and polling DNS record sets
// - **LifecycleController**: Trait for completing a lifecycle action
// - **LifecycleEngine**: Orchestrates one notification end to end
//
// ## Invocation Flow
//
// 1. Decode the notification envelope and its metadata (`notification`)
// 2. Resolve instance addresses (`instance`)
// 3. Render record templates in place (`template`, backed by `lookup`)
// 4. Submit the batch and poll until INSYNC (`propagation`)
// 5. Send CONTINUE or ABANDON (`reporter`)
//
// ## Design Principles
//
// 1. **Stateless**: Nothing survives an invocation
// 2. **Explicit submission boundary**: Failures before the batch is submitted
//    are returned to the transport; failures after it become ABANDON
// 3. **Library-First**: The AWS adapters and the Lambda binary are thin layers
//    over the traits defined here

pub mod config;
pub mod engine;
pub mod error;
pub mod instance;
pub mod lookup;
pub mod notification;
pub mod propagation;
pub mod reporter;
pub mod template;
pub mod traits;

// Re-export core types for convenience
pub use config::{EngineConfig, PropagationConfig};
pub use engine::{InvocationOutcome, LifecycleEngine};
pub use error::{Error, Result};
pub use notification::{LifecycleMessage, MutationInstruction, Notification, RecordChange};
pub use traits::{InstanceDirectory, LifecycleController, RecordStore};
